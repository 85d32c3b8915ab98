//! DTO ↔ record mapping for the REST boundary.
//!
//! Mapping is tolerant in the read direction: unknown statuses fall back to
//! draft, unknown roles to reader (least privilege), and malformed
//! timestamps to absent — a post that loses its `published_at` this way is
//! simply not visible. Records never round-trip through lossy fields, so
//! the write direction is exact.

use time::OffsetDateTime;
use uuid::Uuid;

use tribuna_api_types::{
    CategoryDto, CategoryPayload, PostDto, PostPayload, UserDto, UserPayload, format_timestamp,
    parse_timestamp,
};

use crate::domain::entities::{CategoryRecord, PostRecord, UserRecord};
use crate::domain::types::{PostStatus, Role};

fn timestamp_or_epoch(value: Option<&str>) -> OffsetDateTime {
    value
        .and_then(parse_timestamp)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub fn category_from_dto(dto: CategoryDto) -> CategoryRecord {
    let allowed_roles = dto.allowed_roles.map(|roles| {
        roles
            .iter()
            .filter_map(|role| Role::normalize(role))
            .collect()
    });
    CategoryRecord {
        id: dto.id,
        name: dto.name,
        slug: dto.slug,
        description: dto.description,
        is_active: dto.is_active,
        allowed_roles,
        created_at: timestamp_or_epoch(dto.created_at.as_deref()),
        updated_at: timestamp_or_epoch(dto.updated_at.as_deref()),
    }
}

pub fn category_to_payload(record: &CategoryRecord) -> CategoryPayload {
    CategoryPayload {
        name: record.name.clone(),
        slug: record.slug.clone(),
        description: record.description.clone(),
        is_active: record.is_active,
        allowed_roles: record
            .allowed_roles
            .as_ref()
            .map(|roles| roles.iter().map(|role| role.as_str().to_string()).collect()),
    }
}

pub fn post_from_dto(dto: PostDto) -> PostRecord {
    let status = dto
        .status
        .as_deref()
        .and_then(PostStatus::normalize)
        .unwrap_or(PostStatus::Draft);
    PostRecord {
        id: dto.id,
        slug: dto.slug,
        title: dto.title,
        excerpt: dto.excerpt,
        cover_url: dto.cover_image_url,
        content_markdown: dto.content_markdown.unwrap_or_default(),
        status,
        category_id: dto.category.as_ref().map(|c| c.id).unwrap_or(Uuid::nil()),
        author_id: dto.author.as_ref().map(|a| a.id).unwrap_or(Uuid::nil()),
        author_name: dto
            .author
            .and_then(|author| author.name)
            .unwrap_or_default(),
        featured: dto.featured,
        published_at: dto.published_at.as_deref().and_then(parse_timestamp),
        created_at: timestamp_or_epoch(dto.created_at.as_deref()),
        updated_at: timestamp_or_epoch(dto.updated_at.as_deref()),
    }
}

pub fn post_to_payload(record: &PostRecord) -> PostPayload {
    PostPayload {
        slug: record.slug.clone(),
        title: record.title.clone(),
        excerpt: record.excerpt.clone(),
        cover_image_url: record.cover_url.clone(),
        content_markdown: record.content_markdown.clone(),
        status: record.status.as_wire().to_string(),
        category_id: record.category_id,
        author_id: record.author_id,
        featured: record.featured,
        published_at: record.published_at.map(format_timestamp),
    }
}

pub fn user_from_dto(dto: UserDto) -> UserRecord {
    let role = dto
        .role
        .as_deref()
        .and_then(Role::normalize)
        .unwrap_or(Role::Reader);
    UserRecord {
        id: dto.id,
        name: dto.name,
        email: dto.email,
        // The API never returns secrets; remote users cannot be verified
        // locally and always authenticate against the server.
        password_digest: String::new(),
        role,
        is_active: dto.is_active,
        allowed_category_slugs: dto.allowed_category_slugs.unwrap_or_default(),
        created_at: timestamp_or_epoch(dto.created_at.as_deref()),
        updated_at: timestamp_or_epoch(dto.updated_at.as_deref()),
    }
}

pub fn user_to_payload(record: &UserRecord) -> UserPayload {
    UserPayload {
        name: record.name.clone(),
        email: record.email.clone(),
        // The digest is the secret the boundary receives; storage-side
        // re-hashing is the server's concern.
        password: (!record.password_digest.is_empty())
            .then(|| record.password_digest.clone()),
        role: record.role.as_str().to_string(),
        is_active: record.is_active,
        allowed_category_slugs: Some(record.allowed_category_slugs.clone()),
    }
}
