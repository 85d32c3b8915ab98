//! Post status transitions.
//!
//! The vocabulary is controlled but not a strict state machine: any status
//! is reachable from any other. The engine only settles the timestamp
//! question — Published and Scheduled require a `published_at`, Draft clears
//! it. Whether a scheduled timestamp lies in the future is not enforced
//! here; the visibility filter is what actually gates display, so a
//! "scheduled" post with a past timestamp is simply visible already.

use time::OffsetDateTime;

use crate::domain::entities::PostRecord;
use crate::domain::types::PostStatus;

/// A requested transition, with an optional explicit publication instant.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
    pub status: PostStatus,
    pub published_at: Option<OffsetDateTime>,
}

impl StatusChange {
    pub fn to(status: PostStatus) -> Self {
        Self {
            status,
            published_at: None,
        }
    }

    pub fn at(status: PostStatus, published_at: OffsetDateTime) -> Self {
        Self {
            status,
            published_at: Some(published_at),
        }
    }
}

/// Resolve the `published_at` a transition settles on: the explicit override
/// wins, then the post's current value, then `now`.
pub fn resolve_published_at(
    change: StatusChange,
    current: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    match change.status {
        PostStatus::Published | PostStatus::Scheduled => {
            Some(change.published_at.or(current).unwrap_or(now))
        }
        PostStatus::Draft => None,
    }
}

/// Apply a status change in place. Every transition stamps `updated_at`.
pub fn apply_status(post: &mut PostRecord, change: StatusChange, now: OffsetDateTime) {
    post.published_at = resolve_published_at(change, post.published_at, now);
    post.status = change.status;
    post.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn post(status: PostStatus, published_at: Option<OffsetDateTime>) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            slug: "ata-da-rodada".to_string(),
            title: "Ata da rodada".to_string(),
            excerpt: None,
            cover_url: None,
            content_markdown: "corpo".to_string(),
            status,
            category_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_name: "Secretaria".to_string(),
            featured: false,
            published_at,
            created_at: datetime!(2024-01-01 00:00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00:00 UTC),
        }
    }

    const NOW: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

    #[test]
    fn publishing_without_a_date_defaults_to_now() {
        let mut record = post(PostStatus::Draft, None);
        apply_status(&mut record, StatusChange::to(PostStatus::Published), NOW);
        assert_eq!(record.status, PostStatus::Published);
        assert_eq!(record.published_at, Some(NOW));
        assert_eq!(record.updated_at, NOW);
    }

    #[test]
    fn publishing_keeps_an_existing_date() {
        let original = datetime!(2024-01-15 08:00:00 UTC);
        let mut record = post(PostStatus::Scheduled, Some(original));
        apply_status(&mut record, StatusChange::to(PostStatus::Published), NOW);
        assert_eq!(record.published_at, Some(original));
    }

    #[test]
    fn explicit_override_wins_over_the_current_date() {
        let override_at = datetime!(2030-01-01 00:00:00 UTC);
        let mut record = post(PostStatus::Published, Some(datetime!(2024-01-15 08:00:00 UTC)));
        apply_status(
            &mut record,
            StatusChange::at(PostStatus::Scheduled, override_at),
            NOW,
        );
        assert_eq!(record.status, PostStatus::Scheduled);
        assert_eq!(record.published_at, Some(override_at));
    }

    #[test]
    fn scheduling_accepts_a_past_instant() {
        // Not enforced here: a past "scheduled" timestamp just means the
        // visibility filter already lets the post through.
        let past = datetime!(2020-01-01 00:00:00 UTC);
        let mut record = post(PostStatus::Draft, None);
        apply_status(&mut record, StatusChange::at(PostStatus::Scheduled, past), NOW);
        assert_eq!(record.published_at, Some(past));
    }

    #[test]
    fn reverting_to_draft_clears_published_at() {
        let mut record = post(PostStatus::Published, Some(datetime!(2024-01-15 08:00:00 UTC)));
        apply_status(&mut record, StatusChange::to(PostStatus::Draft), NOW);
        assert_eq!(record.status, PostStatus::Draft);
        assert_eq!(record.published_at, None);
        assert_eq!(record.updated_at, NOW);
    }
}
