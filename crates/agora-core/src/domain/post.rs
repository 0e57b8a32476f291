use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CommentWithAuthor, UserProfile};

/// Post entity - represents a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    /// Comment ids in the order they were added.
    pub comment_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            comment_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields present in `patch`; empty values leave the field as is.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if let Some(content) = patch.content.filter(|c| !c.is_empty()) {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }

    pub fn append_comment(&mut self, comment_id: Uuid) {
        self.comment_ids.push(comment_id);
        self.updated_at = Utc::now();
    }
}

/// Partial update of a post.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Title filter and page window for listing posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl PostQuery {
    pub const DEFAULT_LIMIT: u64 = 10;

    pub fn new(page: u64, limit: u64, search: Option<String>) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search,
        }
    }

    /// The search term, or `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PostQuery {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT, None)
    }
}

/// A post with its author resolved.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Option<UserProfile>,
}

/// A post with its author and comments resolved.
#[derive(Debug, Clone)]
pub struct PostThread {
    pub post: Post,
    pub author: Option<UserProfile>,
    pub comments: Vec<CommentWithAuthor>,
}

/// One page of posts matching a [`PostQuery`].
#[derive(Debug, Clone)]
pub struct PostPage {
    /// Number of posts matching the filter, ignoring pagination.
    pub total: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub items: Vec<PostThread>,
}

impl PostPage {
    pub fn total_pages(total: u64, limit: u64) -> u64 {
        total.div_ceil(limit.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_keeps_absent_and_empty_fields() {
        let mut post = Post::new(Uuid::new_v4(), "Original".into(), "Original content".into());
        post.apply(PostPatch {
            title: Some("Renamed".into()),
            content: Some(String::new()),
        });

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.content, "Original content");
    }

    #[test]
    fn query_window() {
        let query = PostQuery::new(3, 10, Some("  ".into()));
        assert_eq!(query.offset(), 20);
        assert_eq!(query.search_term(), None);

        let clamped = PostQuery::new(0, 0, Some(" rust ".into()));
        assert_eq!((clamped.page, clamped.limit), (1, 1));
        assert_eq!(clamped.search_term(), Some("rust"));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PostPage::total_pages(0, 10), 0);
        assert_eq!(PostPage::total_pages(2, 10), 1);
        assert_eq!(PostPage::total_pages(21, 10), 3);
    }
}
