//! Session-based authentication over the user store.
//!
//! Passwords are stored as salted SHA-256 digests and compared in constant
//! time. Session expiry is checked lazily on access — there is no reaper
//! task, an expired session is simply dropped the first time it is seen.

use std::sync::Arc;

use metrics::counter;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{SessionsStore, UsersStore};
use crate::domain::entities::{SessionRecord, UserRecord};

const DIGEST_SCHEME: &str = "sha256";

/// Digest a password under a fresh random salt, producing the
/// `sha256$<salt>$<digest>` form the user store persists.
pub fn digest_password(password: &str) -> String {
    digest_with_salt(password.trim(), Uuid::new_v4().as_bytes())
}

fn digest_with_salt(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    format!("{DIGEST_SCHEME}${}${}", hex::encode(salt), hex::encode(digest))
}

/// Constant-time verification against a stored digest. Malformed stored
/// values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt_hex), Some(digest_hex)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != DIGEST_SCHEME {
        return false;
    }
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.trim().as_bytes());
    let actual = hasher.finalize();
    actual.as_slice().ct_eq(&expected).into()
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersStore>,
    sessions: Arc<dyn SessionsStore>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UsersStore>,
        sessions: Arc<dyn SessionsStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl,
        }
    }

    /// Authenticate and open a session. Email matching is case-insensitive;
    /// the same generic error covers unknown emails and bad passwords.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(SessionRecord, UserRecord), AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::validation("email is required"));
        }

        let users = self.users.list_users().await?;
        let Some(user) = users
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(&email))
        else {
            counter!("tribuna_login_failure_total").increment(1);
            return Err(AppError::auth("invalid credentials"));
        };

        if !verify_password(password, &user.password_digest) {
            counter!("tribuna_login_failure_total").increment(1);
            return Err(AppError::auth("invalid credentials"));
        }
        if !user.is_active {
            return Err(AppError::auth("user is inactive"));
        }

        let session = SessionRecord {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            expires_at: now + self.session_ttl,
        };
        let session = self.sessions.insert_session(session).await?;

        tracing::info!(user = %user.email, role = %user.role, "session opened");
        Ok((session, user))
    }

    /// Resolve the user behind a token, invalidating expired sessions on the
    /// way out.
    pub async fn current_user(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<UserRecord, AppError> {
        let Some(session) = self.sessions.find_session(token).await? else {
            return Err(AppError::auth("session not found"));
        };

        if session.is_expired_at(now) {
            counter!("tribuna_session_expired_total").increment(1);
            self.sessions.delete_session(token).await?;
            return Err(AppError::auth("session expired"));
        }

        let user = self
            .users
            .find_user(session.user_id)
            .await?
            .ok_or_else(|| AppError::auth("user no longer exists"))?;
        if !user.is_active {
            return Err(AppError::auth("user is inactive"));
        }
        Ok(user)
    }

    /// Best-effort logout: a missing or already-removed session is not an
    /// error worth surfacing.
    pub async fn logout(&self, token: &str) {
        if let Err(error) = self.sessions.delete_session(token).await {
            tracing::debug!(%error, "logout cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_verifies_and_rejects() {
        let stored = digest_password("segredo123");
        assert!(verify_password("segredo123", &stored));
        assert!(!verify_password("segredo124", &stored));
    }

    #[test]
    fn digest_trims_surrounding_whitespace() {
        let stored = digest_password("  segredo123  ");
        assert!(verify_password("segredo123", &stored));
    }

    #[test]
    fn salts_differ_between_digests() {
        let a = digest_password("segredo123");
        let b = digest_password("segredo123");
        assert_ne!(a, b);
        assert!(verify_password("segredo123", &a));
        assert!(verify_password("segredo123", &b));
    }

    #[test]
    fn malformed_stored_digests_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "sha256$zz$zz"));
        assert!(!verify_password("x", "plaintext-password"));
        assert!(!verify_password("x", "md5$00$00"));
    }
}
