//! Bootstrap catalog and accounts for a fresh portal.
//!
//! Mirrors what the league ships on first run: the four standing categories
//! and one account per role. Demo credentials only — operators are expected
//! to rotate them before going live.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::auth::digest_password;
use crate::domain::entities::{CategoryRecord, UserRecord};
use crate::domain::permissions::TJD_CATEGORY_SLUG;
use crate::domain::types::Role;

pub const SEED_PASSWORD: &str = "123456";

pub fn default_categories(now: OffsetDateTime) -> Vec<CategoryRecord> {
    let entries: [(&str, &str, Option<Vec<Role>>); 4] = [
        ("Geral", "geral", None),
        ("Assembleias", "assembleias", None),
        ("Atas", "atas", None),
        ("Comunicados TJD", TJD_CATEGORY_SLUG, Some(vec![Role::Tjd])),
    ];

    entries
        .into_iter()
        .map(|(name, slug, allowed_roles)| CategoryRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            is_active: true,
            allowed_roles,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

pub fn default_users(now: OffsetDateTime) -> Vec<UserRecord> {
    let entries: [(&str, &str, Role, Vec<&str>); 5] = [
        ("Ana Administradora", "admin@liga.local", Role::Admin, vec![]),
        (
            "Sergio Secretaria",
            "secretaria@liga.local",
            Role::Secretariat,
            vec![],
        ),
        ("Teresa TJD", "tjd@liga.local", Role::Tjd, vec![TJD_CATEGORY_SLUG]),
        (
            "Edu Editor",
            "editor@liga.local",
            Role::Editor,
            vec!["geral", "atas"],
        ),
        ("Lia Leitora", "leitora@liga.local", Role::Reader, vec![]),
    ];

    entries
        .into_iter()
        .map(|(name, email, role, slugs)| UserRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_digest: digest_password(SEED_PASSWORD),
            role,
            is_active: true,
            allowed_category_slugs: slugs.into_iter().map(String::from).collect(),
            created_at: now,
            updated_at: now,
        })
        .collect()
}
