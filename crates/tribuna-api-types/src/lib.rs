//! Shared request and response types for the Tribuna portal REST API.
//!
//! The portal core works with typed records; this crate describes the wire
//! shapes the backing API speaks. Field names mirror the server serializers
//! (`cover_image_url`, `content_markdown`, …) and every timestamp travels as
//! an RFC 3339 string. Parsing is deliberately tolerant: a record with a
//! malformed timestamp is still usable, it just loses the field.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use uuid::Uuid;

/// Envelope wrapping a single record, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Envelope wrapping a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub allowed_roles: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Abbreviated category embedded in a post payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRefDto {
    pub id: Uuid,
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Abbreviated author embedded in a post payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRefDto {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub content_markdown: Option<String>,
    pub status: Option<String>,
    pub category: Option<CategoryRefDto>,
    pub author: Option<AuthorRefDto>,
    #[serde(default)]
    pub featured: bool,
    pub published_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub is_active: bool,
    pub allowed_category_slugs: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Write payload for `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub allowed_roles: Option<Vec<String>>,
}

/// Write payload for `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub content_markdown: String,
    pub status: String,
    pub category_id: Uuid,
    pub author_id: Uuid,
    #[serde(default)]
    pub featured: bool,
    pub published_at: Option<String>,
}

/// Write payload for `POST /users` and `PUT /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub allowed_category_slugs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

const NAIVE_DATETIME: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const NAIVE_DATETIME_SHORT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Parse a wire timestamp, tolerating the forms the portal has seen in the
/// wild: full RFC 3339, offset-less server output, and the short
/// `datetime-local` strings browser forms submit. Anything else is `None`.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed);
    }
    for format in [NAIVE_DATETIME, NAIVE_DATETIME_SHORT] {
        if let Ok(parsed) = time::PrimitiveDateTime::parse(trimmed, format) {
            return Some(parsed.assume_utc());
        }
    }
    None
}

/// Format a timestamp the way the API expects it (RFC 3339, UTC offset kept).
pub fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}
