//! Post repository facade: composes the slug, permission, workflow, and
//! visibility rules before any write reaches the store.

use std::collections::HashSet;
use std::sync::Arc;

use metrics::counter;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::error::{AppError, ensure_non_empty};
use crate::application::pagination::{Page, PageRequest, PostOrder};
use crate::application::repos::{CategoriesStore, PostsStore};
use crate::domain::entities::{CategoryRecord, PostRecord, UserRecord};
use crate::domain::permissions::{ensure_can_assign_category, resolve_allowed_category_slugs};
use crate::domain::slug::{derive_slug, ensure_unique_slug};
use crate::domain::types::PostStatus;
use crate::domain::visibility::{filter_visible_posts, is_post_visible};
use crate::domain::workflow::{StatusChange, apply_status};

/// Create-or-update command for a post. An absent `id` creates; a present
/// one updates in place. The slug is derived from `title` unless given
/// explicitly.
#[derive(Debug, Clone)]
pub struct SavePostCommand {
    pub id: Option<Uuid>,
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: Option<String>,
    pub cover_url: Option<String>,
    pub content_markdown: String,
    pub status: PostStatus,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub featured: bool,
    pub published_at: Option<OffsetDateTime>,
}

/// Admin listing filter; all fields combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct PostQueryFilter {
    pub status: Option<PostStatus>,
    pub category_slug: Option<String>,
    pub author_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsStore>,
    categories: Arc<dyn CategoriesStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostsStore>, categories: Arc<dyn CategoriesStore>) -> Self {
        Self { posts, categories }
    }

    /// Create or update a post. Slug uniqueness is checked against the
    /// latest snapshot immediately before writing (no transaction; the
    /// low-concurrency assumption is documented in the crate root).
    pub async fn save_post(
        &self,
        actor: &UserRecord,
        command: SavePostCommand,
    ) -> Result<PostRecord, AppError> {
        ensure_non_empty(&command.title, "title")?;
        ensure_non_empty(&command.content_markdown, "content_markdown")?;

        let categories = self.categories.list_categories().await?;
        ensure_can_assign_category(actor, command.category_id, &categories)?;

        let snapshot = self.posts.list_posts().await?;
        let slug_source = command
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .unwrap_or(&command.title);
        let base = derive_slug(slug_source)
            .map_err(|_| AppError::validation("title does not yield a usable slug"))?;
        let existing: HashSet<String> = snapshot
            .iter()
            .filter(|post| Some(post.id) != command.id)
            .map(|post| post.slug.clone())
            .collect();
        let slug = ensure_unique_slug(&base, &existing);

        let now = OffsetDateTime::now_utc();
        let change = StatusChange {
            status: command.status,
            published_at: command.published_at,
        };

        let record = match command.id {
            Some(id) => {
                let mut record = snapshot
                    .iter()
                    .find(|post| post.id == id)
                    .cloned()
                    .ok_or(AppError::NotFound)?;
                record.slug = slug;
                record.title = command.title;
                record.excerpt = command.excerpt;
                record.cover_url = command.cover_url;
                record.content_markdown = command.content_markdown;
                record.category_id = command.category_id;
                record.author_id = command.author_id;
                record.author_name = command.author_name;
                record.featured = command.featured;
                apply_status(&mut record, change, now);
                self.posts.update_post(record).await?
            }
            None => {
                let mut record = PostRecord {
                    id: Uuid::new_v4(),
                    slug,
                    title: command.title,
                    excerpt: command.excerpt,
                    cover_url: command.cover_url,
                    content_markdown: command.content_markdown,
                    status: PostStatus::Draft,
                    category_id: command.category_id,
                    author_id: command.author_id,
                    author_name: command.author_name,
                    featured: command.featured,
                    published_at: None,
                    created_at: now,
                    updated_at: now,
                };
                apply_status(&mut record, change, now);
                self.posts.insert_post(record).await?
            }
        };

        if record.status == PostStatus::Published {
            counter!("tribuna_posts_published_total").increment(1);
        }
        tracing::debug!(slug = %record.slug, status = %record.status, "post saved");
        Ok(record)
    }

    pub async fn find_post(&self, id: Uuid) -> Result<PostRecord, AppError> {
        self.posts.find_post(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn delete_post(&self, actor: &UserRecord, id: Uuid) -> Result<(), AppError> {
        let record = self.find_post(id).await?;
        let categories = self.categories.list_categories().await?;
        ensure_can_assign_category(actor, record.category_id, &categories)?;
        self.posts.delete_post(id).await?;
        Ok(())
    }

    /// Apply a status transition to a stored post.
    pub async fn update_post_status(
        &self,
        actor: &UserRecord,
        id: Uuid,
        status: PostStatus,
        published_at: Option<OffsetDateTime>,
    ) -> Result<PostRecord, AppError> {
        let mut record = self.find_post(id).await?;
        let categories = self.categories.list_categories().await?;
        ensure_can_assign_category(actor, record.category_id, &categories)?;

        apply_status(
            &mut record,
            StatusChange {
                status,
                published_at,
            },
            OffsetDateTime::now_utc(),
        );
        let record = self.posts.update_post(record).await?;

        if record.status == PostStatus::Published {
            counter!("tribuna_posts_published_total").increment(1);
        }
        Ok(record)
    }

    /// Publish immediately, keeping an existing publication date when set.
    pub async fn publish_post(
        &self,
        actor: &UserRecord,
        id: Uuid,
    ) -> Result<PostRecord, AppError> {
        self.update_post_status(actor, id, PostStatus::Published, None)
            .await
    }

    /// Schedule for a given instant. A past instant is accepted and simply
    /// means the post is already visible.
    pub async fn schedule_post(
        &self,
        actor: &UserRecord,
        id: Uuid,
        published_at: OffsetDateTime,
    ) -> Result<PostRecord, AppError> {
        self.update_post_status(actor, id, PostStatus::Scheduled, Some(published_at))
            .await
    }

    /// Back-office listing. Restricted roles only see posts in categories
    /// their resolved slug set covers.
    pub async fn list_posts(
        &self,
        actor: &UserRecord,
        filter: &PostQueryFilter,
        order: PostOrder,
        page: PageRequest,
    ) -> Result<Page<PostRecord>, AppError> {
        let categories = self.categories.list_categories().await?;
        let mut posts = self.posts.list_posts().await?;

        if !actor.role.has_full_access() {
            let allowed = resolve_allowed_category_slugs(Some(actor), &categories);
            posts.retain(|post| {
                category_of(&categories, post.category_id)
                    .is_some_and(|category| allowed.contains(&category.slug))
            });
        }

        if let Some(status) = filter.status {
            posts.retain(|post| post.status == status);
        }
        if let Some(slug) = filter.category_slug.as_deref() {
            posts.retain(|post| {
                category_of(&categories, post.category_id)
                    .is_some_and(|category| category.slug == slug)
            });
        }
        if let Some(author_id) = filter.author_id {
            posts.retain(|post| post.author_id == author_id);
        }
        if let Some(term) = filter.search.as_deref() {
            let term = term.to_lowercase();
            posts.retain(|post| {
                let category = category_of(&categories, post.category_id);
                post.title.to_lowercase().contains(&term)
                    || post
                        .excerpt
                        .as_deref()
                        .is_some_and(|excerpt| excerpt.to_lowercase().contains(&term))
                    || category.is_some_and(|category| {
                        category.name.to_lowercase().contains(&term)
                            || category.slug.contains(&term)
                    })
            });
        }

        order.sort(&mut posts);
        Ok(Page::paginate(posts, page))
    }

    /// Public feed: visible posts only, newest publication first.
    pub async fn visible_posts(
        &self,
        category_slug: Option<&str>,
        search: Option<&str>,
        page: PageRequest,
        now: OffsetDateTime,
    ) -> Result<Page<PostRecord>, AppError> {
        let categories = self.categories.list_categories().await?;
        let snapshot = self.posts.list_posts().await?;
        let mut posts: Vec<PostRecord> = filter_visible_posts(&snapshot, &categories, now)
            .into_iter()
            .cloned()
            .collect();

        if let Some(slug) = category_slug {
            let Some(category) = categories.iter().find(|category| category.slug == slug)
            else {
                return Ok(Page::empty(page));
            };
            posts.retain(|post| post.category_id == category.id);
        }
        if let Some(term) = search {
            let term = term.to_lowercase();
            posts.retain(|post| {
                post.title.to_lowercase().contains(&term)
                    || post
                        .excerpt
                        .as_deref()
                        .is_some_and(|excerpt| excerpt.to_lowercase().contains(&term))
            });
        }

        PostOrder::PUBLISHED_DESC.sort(&mut posts);
        Ok(Page::paginate(posts, page))
    }

    /// Resolve a public post by slug; drafts, pending schedules, and posts
    /// in inactive or missing categories all read as not found.
    pub async fn find_public_post(
        &self,
        slug: &str,
        now: OffsetDateTime,
    ) -> Result<PostRecord, AppError> {
        let categories = self.categories.list_categories().await?;
        let snapshot = self.posts.list_posts().await?;
        snapshot
            .into_iter()
            .find(|post| post.slug == slug && is_post_visible(post, &categories, now))
            .ok_or(AppError::NotFound)
    }
}

fn category_of(categories: &[CategoryRecord], id: Uuid) -> Option<&CategoryRecord> {
    categories.iter().find(|category| category.id == id)
}
