//! Category catalog management.

use std::collections::HashSet;
use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::{AppError, ensure_non_empty};
use crate::application::repos::{CategoriesStore, PostsStore};
use crate::domain::entities::{CategoryRecord, UserRecord};
use crate::domain::permissions::{filter_categories_by_role, resolve_allowed_category_slugs};
use crate::domain::slug::{derive_slug, ensure_unique_slug};
use crate::domain::types::Role;

/// Incoming category fields; the slug is optional and derived from the name
/// when absent.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub allowed_roles: Option<Vec<Role>>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoriesStore>,
    posts: Arc<dyn PostsStore>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoriesStore>, posts: Arc<dyn PostsStore>) -> Self {
        Self { categories, posts }
    }

    /// Full catalog, sorted by name.
    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, AppError> {
        let mut categories = self.categories.list_categories().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub async fn active_categories(&self) -> Result<Vec<CategoryRecord>, AppError> {
        let mut categories = self.list_categories().await?;
        categories.retain(|category| category.is_active);
        Ok(categories)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, AppError> {
        let categories = self.categories.list_categories().await?;
        Ok(categories.into_iter().find(|category| category.slug == slug))
    }

    /// Categories the given user may act on; gates the category filter and
    /// the create/edit-post selector.
    pub async fn allowed_categories_for(
        &self,
        user: Option<&UserRecord>,
    ) -> Result<Vec<CategoryRecord>, AppError> {
        let categories = self.list_categories().await?;
        let allowed = resolve_allowed_category_slugs(user, &categories);
        Ok(filter_categories_by_role(&categories, &allowed)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn create_category(
        &self,
        actor: &UserRecord,
        draft: CategoryDraft,
    ) -> Result<CategoryRecord, AppError> {
        ensure_can_manage(actor)?;
        ensure_non_empty(&draft.name, "name")?;

        let snapshot = self.categories.list_categories().await?;
        let slug = resolve_slug(&draft, None, &snapshot)?;

        let now = OffsetDateTime::now_utc();
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            slug,
            description: draft.description,
            is_active: draft.is_active.unwrap_or(true),
            allowed_roles: draft.allowed_roles,
            created_at: now,
            updated_at: now,
        };

        Ok(self.categories.insert_category(record).await?)
    }

    pub async fn update_category(
        &self,
        actor: &UserRecord,
        id: Uuid,
        draft: CategoryDraft,
    ) -> Result<CategoryRecord, AppError> {
        ensure_can_manage(actor)?;
        ensure_non_empty(&draft.name, "name")?;

        let snapshot = self.categories.list_categories().await?;
        let mut record = snapshot
            .iter()
            .find(|category| category.id == id)
            .cloned()
            .ok_or(AppError::NotFound)?;

        record.slug = resolve_slug(&draft, Some(id), &snapshot)?;
        record.name = draft.name.trim().to_string();
        record.description = draft.description;
        if let Some(is_active) = draft.is_active {
            record.is_active = is_active;
        }
        if let Some(allowed_roles) = draft.allowed_roles {
            record.allowed_roles = Some(allowed_roles);
        }
        record.updated_at = OffsetDateTime::now_utc();

        Ok(self.categories.update_category(record).await?)
    }

    pub async fn toggle_category(
        &self,
        actor: &UserRecord,
        id: Uuid,
    ) -> Result<CategoryRecord, AppError> {
        ensure_can_manage(actor)?;

        let mut record = self
            .categories
            .find_category(id)
            .await?
            .ok_or(AppError::NotFound)?;
        record.is_active = !record.is_active;
        record.updated_at = OffsetDateTime::now_utc();

        Ok(self.categories.update_category(record).await?)
    }

    /// Remove a category. Posts referencing it are left in place — the
    /// visibility filter already hides them — but the orphaning is logged
    /// so an operator can follow up.
    pub async fn delete_category(&self, actor: &UserRecord, id: Uuid) -> Result<(), AppError> {
        ensure_can_manage(actor)?;

        let record = self
            .categories
            .find_category(id)
            .await?
            .ok_or(AppError::NotFound)?;

        let orphaned = self
            .posts
            .list_posts()
            .await?
            .iter()
            .filter(|post| post.category_id == id)
            .count();
        if orphaned > 0 {
            tracing::warn!(
                category = %record.slug,
                orphaned,
                "deleting category leaves posts without a catalog entry"
            );
        }

        self.categories.delete_category(id).await?;
        Ok(())
    }
}

fn ensure_can_manage(actor: &UserRecord) -> Result<(), AppError> {
    if !actor.is_active {
        return Err(AppError::permission("inactive user cannot manage categories"));
    }
    match actor.role {
        Role::Admin | Role::Secretariat | Role::Editor => Ok(()),
        role => Err(AppError::permission(format!(
            "role `{role}` may not manage categories"
        ))),
    }
}

/// Slug source is the explicit field when present, the name otherwise; the
/// result is made unique against every other category in the snapshot.
fn resolve_slug(
    draft: &CategoryDraft,
    own_id: Option<Uuid>,
    snapshot: &[CategoryRecord],
) -> Result<String, AppError> {
    let source = draft
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .unwrap_or(&draft.name);
    let base = derive_slug(source)
        .map_err(|_| AppError::validation("name does not yield a usable slug"))?;

    let existing: HashSet<String> = snapshot
        .iter()
        .filter(|category| Some(category.id) != own_id)
        .map(|category| category.slug.clone())
        .collect();

    Ok(ensure_unique_slug(&base, &existing))
}
