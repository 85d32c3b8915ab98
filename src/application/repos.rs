//! Repository traits describing persistence adapters.
//!
//! The facades consume these as `Arc<dyn Store>`; backends exist for an
//! in-memory map (`infra::memory`, tests and demos) and the portal REST API
//! (`infra::http`). The traits stay at snapshot-CRUD granularity on purpose:
//! uniqueness checks are computed by the facade against a fresh listing
//! immediately before writing, which is race-prone under true concurrent
//! edits but acceptable for a low-concurrency internal tool.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CategoryRecord, PostRecord, SessionRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("transport error: {0}")]
    Transport(String),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

#[async_trait]
pub trait CategoriesStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;
    async fn insert_category(&self, record: CategoryRecord) -> Result<CategoryRecord, RepoError>;
    async fn update_category(&self, record: CategoryRecord) -> Result<CategoryRecord, RepoError>;
    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsStore: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
    async fn insert_post(&self, record: PostRecord) -> Result<PostRecord, RepoError>;
    async fn update_post(&self, record: PostRecord) -> Result<PostRecord, RepoError>;
    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
    async fn insert_user(&self, record: UserRecord) -> Result<UserRecord, RepoError>;
    async fn update_user(&self, record: UserRecord) -> Result<UserRecord, RepoError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Session persistence. Only the in-memory backend implements this — when
/// the portal talks to the REST API, the surrounding application holds the
/// bearer token and the server owns session state.
#[async_trait]
pub trait SessionsStore: Send + Sync {
    async fn insert_session(&self, record: SessionRecord) -> Result<SessionRecord, RepoError>;
    async fn find_session(&self, token: &str) -> Result<Option<SessionRecord>, RepoError>;
    async fn delete_session(&self, token: &str) -> Result<(), RepoError>;
}
