//! Role-scoped category access rules.
//!
//! The resolver answers "which category slugs may this user act on" from the
//! role alone plus, for editors, the stored grants. It performs no
//! validation — inconsistent stored data comes back as-is — and it is
//! recomputed on every call because the catalog may have changed.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::entities::{CategoryRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::types::Role;

/// Category slug the TJD editorial profile is pinned to. Stored grants for
/// TJD users are overridden by this rule.
pub const TJD_CATEGORY_SLUG: &str = "comunicados-tjd";

pub fn resolve_allowed_category_slugs(
    user: Option<&UserRecord>,
    categories: &[CategoryRecord],
) -> BTreeSet<String> {
    let Some(user) = user else {
        return BTreeSet::new();
    };

    match user.role {
        Role::Admin | Role::Secretariat => categories
            .iter()
            .map(|category| category.slug.clone())
            .collect(),
        Role::Tjd => BTreeSet::from([TJD_CATEGORY_SLUG.to_string()]),
        Role::Editor => user.allowed_category_slugs.iter().cloned().collect(),
        Role::Reader => BTreeSet::new(),
    }
}

pub fn filter_categories_by_role<'a>(
    categories: &'a [CategoryRecord],
    allowed: &BTreeSet<String>,
) -> Vec<&'a CategoryRecord> {
    categories
        .iter()
        .filter(|category| allowed.contains(&category.slug))
        .collect()
}

/// Write-side guard for assigning a post to a category. Admin and
/// Secretariat bypass the slug check entirely; everyone else must name a
/// category whose slug resolves into their allowed set.
pub fn ensure_can_assign_category(
    user: &UserRecord,
    category_id: Uuid,
    categories: &[CategoryRecord],
) -> Result<(), DomainError> {
    if !user.is_active {
        return Err(DomainError::forbidden("inactive user cannot publish"));
    }
    if user.role.has_full_access() {
        return Ok(());
    }

    let allowed = resolve_allowed_category_slugs(Some(user), categories);
    let slug = categories
        .iter()
        .find(|category| category.id == category_id)
        .map(|category| category.slug.as_str());

    match slug {
        Some(slug) if allowed.contains(slug) => Ok(()),
        _ => Err(DomainError::forbidden(format!(
            "role `{}` may not publish in this category",
            user.role
        ))),
    }
}
