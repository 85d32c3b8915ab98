//! Deterministic, URL-safe slug generation.
//!
//! The helpers bridge ASCII transliteration (`deunicode`) with the `slug`
//! crate so Portuguese titles like "Notícias da Liga" become
//! `noticias-da-liga`. Uniqueness is resolved against a caller-supplied
//! snapshot; nothing here persists.

use std::collections::HashSet;

use deunicode::deunicode;
use slug::slugify;
use thiserror::Error;

/// Errors that can occur while deriving a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
}

/// Derive a base slug from human-readable text: transliterate to ASCII,
/// drop everything outside `[a-z0-9\s-]`, then lowercase and collapse
/// separator runs into single hyphens.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = deunicode(input);
    let filtered: String = transliterated
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_ascii_whitespace() || *ch == '-')
        .collect();
    let candidate = slugify(&filtered);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// True iff `slug` matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        })
}

/// Return `candidate` if it is free, otherwise suffix `-1`, `-2`, … until a
/// free slug is found. Terminates because `existing` is finite.
pub fn ensure_unique_slug(candidate: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(candidate) {
        return candidate.to_string();
    }

    let mut counter = 1usize;
    loop {
        let suffixed = format!("{candidate}-{counter}");
        if !existing.contains(&suffixed) {
            return suffixed;
        }
        counter += 1;
    }
}
