//! User account management. Admin-only surface.

use std::collections::BTreeSet;
use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::auth::digest_password;
use crate::application::error::{AppError, ensure_non_empty};
use crate::application::pagination::{Page, PageRequest};
use crate::application::repos::UsersStore;
use crate::domain::entities::UserRecord;
use crate::domain::permissions::TJD_CATEGORY_SLUG;
use crate::domain::types::Role;

/// Incoming user fields. On update, `None` password (or a blank one) keeps
/// the stored digest.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub is_active: Option<bool>,
    pub allowed_category_slugs: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UsersStore>) -> Self {
        Self { users }
    }

    /// Listing, newest account first.
    pub async fn list_users(
        &self,
        actor: &UserRecord,
        page: PageRequest,
    ) -> Result<Page<UserRecord>, AppError> {
        ensure_admin(actor)?;
        let mut users = self.users.list_users().await?;
        users.sort_by_key(|user| user.created_at);
        users.reverse();
        Ok(Page::paginate(users, page))
    }

    pub async fn create_user(
        &self,
        actor: &UserRecord,
        draft: UserDraft,
    ) -> Result<UserRecord, AppError> {
        ensure_admin(actor)?;
        ensure_non_empty(&draft.name, "name")?;
        ensure_non_empty(&draft.email, "email")?;

        let password = draft
            .password
            .as_deref()
            .map(str::trim)
            .filter(|password| !password.is_empty())
            .ok_or_else(|| AppError::validation("password is required"))?;

        let email = draft.email.trim().to_lowercase();
        let snapshot = self.users.list_users().await?;
        ensure_unique_email(&snapshot, &email, None)?;

        let allowed_category_slugs =
            sanitize_allowed_categories(draft.role, draft.allowed_category_slugs)?;

        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            email,
            password_digest: digest_password(password),
            role: draft.role,
            is_active: draft.is_active.unwrap_or(true),
            allowed_category_slugs,
            created_at: now,
            updated_at: now,
        };

        Ok(self.users.insert_user(record).await?)
    }

    pub async fn update_user(
        &self,
        actor: &UserRecord,
        id: Uuid,
        draft: UserDraft,
    ) -> Result<UserRecord, AppError> {
        ensure_admin(actor)?;
        ensure_non_empty(&draft.name, "name")?;
        ensure_non_empty(&draft.email, "email")?;

        let snapshot = self.users.list_users().await?;
        let mut record = snapshot
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(AppError::NotFound)?;

        let email = draft.email.trim().to_lowercase();
        ensure_unique_email(&snapshot, &email, Some(id))?;

        record.name = draft.name.trim().to_string();
        record.email = email;
        record.role = draft.role;
        if let Some(is_active) = draft.is_active {
            record.is_active = is_active;
        }

        // Blank password means "keep existing".
        if let Some(password) = draft
            .password
            .as_deref()
            .map(str::trim)
            .filter(|password| !password.is_empty())
        {
            record.password_digest = digest_password(password);
        }

        // Re-sanitize under the (possibly new) role so the stored grants
        // always honor the role invariants.
        let slugs = draft
            .allowed_category_slugs
            .unwrap_or_else(|| record.allowed_category_slugs.clone());
        record.allowed_category_slugs = sanitize_allowed_categories(draft.role, Some(slugs))?;
        record.updated_at = OffsetDateTime::now_utc();

        Ok(self.users.update_user(record).await?)
    }

    pub async fn delete_user(&self, actor: &UserRecord, id: Uuid) -> Result<(), AppError> {
        ensure_admin(actor)?;
        self.users
            .find_user(id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.users.delete_user(id).await?;
        Ok(())
    }
}

fn ensure_admin(actor: &UserRecord) -> Result<(), AppError> {
    if !actor.is_active {
        return Err(AppError::permission("inactive user cannot manage accounts"));
    }
    if actor.role != Role::Admin {
        return Err(AppError::permission(format!(
            "role `{}` may not manage accounts",
            actor.role
        )));
    }
    Ok(())
}

fn ensure_unique_email(
    snapshot: &[UserRecord],
    email: &str,
    own_id: Option<Uuid>,
) -> Result<(), AppError> {
    let taken = snapshot
        .iter()
        .any(|user| Some(user.id) != own_id && user.email.eq_ignore_ascii_case(email));
    if taken {
        return Err(AppError::validation("email already registered"));
    }
    Ok(())
}

/// Stored grants follow the role: full-access roles and readers carry none,
/// TJD is pinned to its fixed category, and editors must name at least one
/// slug (deduplicated and sorted).
fn sanitize_allowed_categories(
    role: Role,
    slugs: Option<Vec<String>>,
) -> Result<Vec<String>, AppError> {
    match role {
        Role::Admin | Role::Secretariat | Role::Reader => Ok(Vec::new()),
        Role::Tjd => Ok(vec![TJD_CATEGORY_SLUG.to_string()]),
        Role::Editor => {
            let unique: BTreeSet<String> = slugs
                .unwrap_or_default()
                .into_iter()
                .map(|slug| slug.trim().to_string())
                .filter(|slug| !slug.is_empty())
                .collect();
            if unique.is_empty() {
                return Err(AppError::validation(
                    "select at least one category for this user",
                ));
            }
            Ok(unique.into_iter().collect())
        }
    }
}
