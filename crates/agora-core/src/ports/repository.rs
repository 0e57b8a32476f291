use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Fails with `Constraint` if it clashes with a stored one.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Fetch every user whose id is in `ids`. Unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Count posts whose title contains `search`, case-insensitively.
    /// `None` matches every post.
    async fn count_matching(&self, search: Option<&str>) -> Result<u64, RepoError>;

    /// Posts matching `search` in creation order, skipping `offset` and
    /// returning at most `limit`.
    async fn find_matching(
        &self,
        search: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Write `title`, `content` and `updated_at` of an existing post and
    /// return the stored row. Never inserts; `NotFound` if the post is gone.
    async fn update_content(&self, post: &Post) -> Result<Post, RepoError>;

    /// Atomically append `comment_id` to the post's comment list.
    /// `NotFound` if the post is gone.
    async fn append_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Fetch every comment whose id is in `ids`. Unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Comment>, RepoError>;

    /// Delete all comments of a post, returning how many were removed.
    async fn delete_by_post_id(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
