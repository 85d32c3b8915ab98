//! Shared domain enumerations for the portal vocabulary.
//!
//! The backing API speaks uppercase status names (`PUBLISHED`) while the
//! portal UI historically used Portuguese labels (`publicado`); both survive
//! here so the boundary mapping stays lossless. Parsing is lenient about the
//! `PostStatus.`/`UserRole.` enum prefixes older server builds leaked into
//! their JSON.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized {kind} value `{value}`")]
pub struct UnknownVocabulary {
    kind: &'static str,
    value: String,
}

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    /// Wire name as transmitted by the API.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Scheduled => "SCHEDULED",
        }
    }

    /// Portal-local label, as the public site displays it.
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "rascunho",
            Self::Published => "publicado",
            Self::Scheduled => "agendado",
        }
    }

    pub fn all() -> &'static [PostStatus] {
        &[Self::Draft, Self::Published, Self::Scheduled]
    }

    /// Lenient parse accepting wire names, local labels, lowercase wire
    /// names, and `PostStatus.`-prefixed forms.
    pub fn normalize(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let last = trimmed.rsplit('.').next().unwrap_or(trimmed);
        match last.to_ascii_uppercase().as_str() {
            "DRAFT" | "RASCUNHO" => Some(Self::Draft),
            "PUBLISHED" | "PUBLICADO" => Some(Self::Published),
            "SCHEDULED" | "AGENDADO" => Some(Self::Scheduled),
            _ => None,
        }
    }
}

impl Display for PostStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for PostStatus {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| UnknownVocabulary {
            kind: "post status",
            value: s.to_string(),
        })
    }
}

/// Portal role. TJD is a restricted editorial profile pinned to a single
/// category; Reader authenticates but has no back-office access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "secretaria")]
    Secretariat,
    #[serde(rename = "editor")]
    Editor,
    #[serde(rename = "tjd")]
    Tjd,
    #[serde(rename = "leitor")]
    Reader,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Secretariat => "secretaria",
            Self::Editor => "editor",
            Self::Tjd => "tjd",
            Self::Reader => "leitor",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Secretariat => "Secretaria",
            Self::Editor => "Editor",
            Self::Tjd => "TJD",
            Self::Reader => "Leitor",
        }
    }

    pub fn all() -> &'static [Role] {
        &[
            Self::Admin,
            Self::Secretariat,
            Self::Editor,
            Self::Tjd,
            Self::Reader,
        ]
    }

    /// Admin and Secretariat may act on every category.
    pub fn has_full_access(self) -> bool {
        matches!(self, Self::Admin | Self::Secretariat)
    }

    /// Whether the role may enter the back-office at all.
    pub fn has_portal_access(self) -> bool {
        !matches!(self, Self::Reader)
    }

    /// Lenient parse accepting role slugs, any casing, and `UserRole.`
    /// prefixed forms.
    pub fn normalize(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let last = trimmed.rsplit('.').next().unwrap_or(trimmed);
        match last.to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "secretaria" => Some(Self::Secretariat),
            "editor" => Some(Self::Editor),
            "tjd" => Some(Self::Tjd),
            "leitor" => Some(Self::Reader),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s).ok_or_else(|| UnknownVocabulary {
            kind: "role",
            value: s.to_string(),
        })
    }
}
