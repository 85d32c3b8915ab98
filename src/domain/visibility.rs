//! Read-time visibility rules for the public site.
//!
//! Visibility is a pure function of `(status, published_at, now)`: a
//! scheduled post surfaces the moment its timestamp elapses, with no
//! promotion job in between. The trade-off is deliberate — a post is never
//! shown before its time and is shown immediately after, without a scheduler
//! keeping state in sync.

use time::OffsetDateTime;

use crate::domain::entities::{CategoryRecord, PostRecord};
use crate::domain::types::PostStatus;

pub fn is_post_visible(
    post: &PostRecord,
    categories: &[CategoryRecord],
    now: OffsetDateTime,
) -> bool {
    let Some(category) = categories
        .iter()
        .find(|category| category.id == post.category_id)
    else {
        return false;
    };
    if !category.is_active {
        return false;
    }
    if post.status == PostStatus::Draft {
        return false;
    }
    let Some(published_at) = post.published_at else {
        return false;
    };
    published_at <= now
}

/// Apply [`is_post_visible`] to every post, preserving input order. Callers
/// are responsible for pre-sorting (typically `published_at` descending).
pub fn filter_visible_posts<'a>(
    posts: &'a [PostRecord],
    categories: &[CategoryRecord],
    now: OffsetDateTime,
) -> Vec<&'a PostRecord> {
    posts
        .iter()
        .filter(|post| is_post_visible(post, categories, now))
        .collect()
}
