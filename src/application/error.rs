use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

/// Facade-level error taxonomy. Validation and permission failures are
/// raised before any write reaches the store; NotFound from the persistence
/// boundary propagates unchanged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("resource not found")]
    NotFound,
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error(transparent)]
    Repo(RepoError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<RepoError> for AppError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound => AppError::NotFound,
            RepoError::Duplicate { constraint } => {
                AppError::Validation(format!("duplicate value violates `{constraint}`"))
            }
            other => AppError::Repo(other),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::NotFound { .. } => AppError::NotFound,
            DomainError::Validation { message } => AppError::Validation(message),
            DomainError::Forbidden { message } => AppError::Permission(message),
            DomainError::Invariant { message } => AppError::Unexpected(message),
        }
    }
}

pub fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
