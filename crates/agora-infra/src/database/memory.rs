//! In-memory repositories.
//!
//! Used when no database is configured, and by tests.
//! Note: Data is lost on process restart.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{Comment, Post, User};
use agora_core::error::RepoError;
use agora_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

use super::mask_email;

/// A row that can be stored in an [`InMemoryRepository`].
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    /// Whether storing `self` next to `other` would break a unique key.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.id != other.id && self.email == other.email
    }
}

impl Record for Post {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Rows kept in insertion order behind an async RwLock.
pub struct InMemoryRepository<T> {
    rows: RwLock<Vec<T>>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    async fn find_all<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl<T: Record> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        Ok(self.rows.read().await.iter().find(|row| row.id() == id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;

        if rows
            .iter()
            .any(|row| row.id() == entity.id() || entity.conflicts_with(row))
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        rows.push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);

        if rows.len() == before {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");
        Ok(self.find_all(|u| u.email == email).await.into_iter().next())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let ids: HashSet<&Uuid> = ids.iter().collect();
        Ok(self.find_all(|u| ids.contains(&u.id)).await)
    }
}

fn title_matches(post: &Post, search: Option<&str>) -> bool {
    search.is_none_or(|term| post.title.to_lowercase().contains(&term.to_lowercase()))
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count_matching(&self, search: Option<&str>) -> Result<u64, RepoError> {
        Ok(self.find_all(|p| title_matches(p, search)).await.len() as u64)
    }

    async fn find_matching(
        &self,
        search: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .find_all(|p| title_matches(p, search))
            .await
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update_content(&self, post: &Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        let stored = rows
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;

        stored.title.clone_from(&post.title);
        stored.content.clone_from(&post.content);
        stored.updated_at = post.updated_at;
        Ok(stored.clone())
    }

    async fn append_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let stored = rows
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RepoError::NotFound)?;

        stored.append_comment(comment_id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Comment>, RepoError> {
        let ids: HashSet<&Uuid> = ids.iter().collect();
        Ok(self.find_all(|c| ids.contains(&c.id)).await)
    }

    async fn delete_by_post_id(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|c| c.post_id != post_id);
        Ok((before - rows.len()) as u64)
    }
}
