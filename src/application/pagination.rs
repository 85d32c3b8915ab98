//! Offset pagination and listing order for the facades.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::entities::PostRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Page numbering starts at 1; zero values are clamped up.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page(self) -> u32 {
        self.page
    }

    pub fn page_size(self) -> u32 {
        self.page_size
    }

    pub fn offset(self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the total the filter matched.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.page_size() as usize)
            .collect();
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            page: request.page(),
            page_size: request.page_size(),
            total: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    CreatedAt,
    PublishedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// Listing order for posts, parsed from `field:direction` expressions like
/// `published_at:desc`. Unknown fields and directions fall back to the
/// defaults rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostOrder {
    pub field: OrderField,
    pub direction: OrderDirection,
}

impl Default for PostOrder {
    fn default() -> Self {
        Self {
            field: OrderField::CreatedAt,
            direction: OrderDirection::Desc,
        }
    }
}

impl PostOrder {
    pub const PUBLISHED_DESC: Self = Self {
        field: OrderField::PublishedAt,
        direction: OrderDirection::Desc,
    };

    pub fn parse(expression: &str) -> Self {
        let (field, direction) = match expression.split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (expression, "desc"),
        };
        let field = match field.trim() {
            "published_at" => OrderField::PublishedAt,
            "title" => OrderField::Title,
            _ => OrderField::CreatedAt,
        };
        let direction = match direction.trim() {
            "asc" => OrderDirection::Asc,
            _ => OrderDirection::Desc,
        };
        Self { field, direction }
    }

    /// Posts without a `published_at` sort as the epoch, so they land at the
    /// tail of a descending feed.
    pub fn sort(self, posts: &mut [PostRecord]) {
        match self.field {
            OrderField::CreatedAt => posts.sort_by_key(|post| post.created_at),
            OrderField::PublishedAt => posts.sort_by_key(|post| {
                post.published_at.unwrap_or(OffsetDateTime::UNIX_EPOCH)
            }),
            OrderField::Title => posts.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        if self.direction == OrderDirection::Desc {
            posts.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_reports_total() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Page::paginate(items, PageRequest::new(2, 10));
        assert_eq!(page.items, (11..=20).collect::<Vec<u32>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn paginate_past_the_end_yields_empty_items() {
        let page = Page::paginate(vec![1, 2, 3], PageRequest::new(5, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn zero_page_values_are_clamped() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn order_expressions_parse_with_fallbacks() {
        assert_eq!(PostOrder::parse("published_at:desc"), PostOrder::PUBLISHED_DESC);
        assert_eq!(
            PostOrder::parse("title:asc"),
            PostOrder {
                field: OrderField::Title,
                direction: OrderDirection::Asc,
            }
        );
        assert_eq!(PostOrder::parse("published_at"), PostOrder::PUBLISHED_DESC);
        assert_eq!(PostOrder::parse("views:desc"), PostOrder::default());
        assert_eq!(PostOrder::parse(""), PostOrder::default());
    }
}
