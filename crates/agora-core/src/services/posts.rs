//! Post and comment operations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    Actor, Comment, CommentWithAuthor, Notification, Post, PostPage, PostPatch, PostQuery,
    PostThread, PostWithAuthor, UserProfile,
};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::policy::can_modify;
use crate::ports::{CommentRepository, Notifier, PostRepository, UserRepository};

/// Input for [`PostService::create`].
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            notifier,
        }
    }

    pub async fn create(&self, input: NewPost, actor: &Actor) -> DomainResult<Post> {
        let post = self
            .posts
            .insert(Post::new(actor.id, input.title, input.content))
            .await?;

        tracing::info!(post_id = %post.id, author_id = %actor.id, "Post created");
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<PostWithAuthor> {
        let post = self.find_post(id).await?;
        let author = self.users.find_by_id(post.author_id).await?;

        Ok(PostWithAuthor {
            post,
            author: author.map(|u| u.profile()),
        })
    }

    pub async fn update(&self, id: Uuid, patch: PostPatch, actor: &Actor) -> DomainResult<Post> {
        let mut post = self.find_post(id).await?;

        if !can_modify(&post, actor) {
            return Err(DomainError::Forbidden(
                "You are not authorized to update this post".to_string(),
            ));
        }

        post.apply(patch);
        let post = self
            .posts
            .update_content(&post)
            .await
            .map_err(|e| post_error(e, id))?;

        tracing::info!(post_id = %post.id, actor_id = %actor.id, "Post updated");
        Ok(post)
    }

    /// Comments go first, then the post row. A second sweep removes comments
    /// inserted while the delete was in flight.
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> DomainResult<()> {
        let post = self.find_post(id).await?;

        if !can_modify(&post, actor) {
            return Err(DomainError::Forbidden(
                "You are not authorized to delete this post".to_string(),
            ));
        }

        let mut removed = self.comments.delete_by_post_id(post.id).await?;
        self.posts
            .delete(post.id)
            .await
            .map_err(|e| post_error(e, id))?;
        removed += self.comments.delete_by_post_id(post.id).await?;

        tracing::info!(
            post_id = %post.id,
            actor_id = %actor.id,
            comments_removed = removed,
            "Post deleted"
        );
        Ok(())
    }

    pub async fn list(&self, query: &PostQuery) -> DomainResult<PostPage> {
        let search = query.search_term();

        let total = self.posts.count_matching(search).await?;
        let posts = self
            .posts
            .find_matching(search, query.offset(), query.limit)
            .await?;

        let comment_ids: Vec<Uuid> = posts
            .iter()
            .flat_map(|p| p.comment_ids.iter().copied())
            .collect();
        let comments: HashMap<Uuid, Comment> = if comment_ids.is_empty() {
            HashMap::new()
        } else {
            self.comments
                .find_many(&comment_ids)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        let author_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.author_id)
            .chain(comments.values().map(|c| c.author_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let profiles = self.profiles(&author_ids).await?;

        let items = posts
            .into_iter()
            .map(|post| {
                let thread_comments = post
                    .comment_ids
                    .iter()
                    .filter_map(|id| comments.get(id))
                    .map(|comment| CommentWithAuthor {
                        author: profiles.get(&comment.author_id).cloned(),
                        comment: comment.clone(),
                    })
                    .collect();

                PostThread {
                    author: profiles.get(&post.author_id).cloned(),
                    comments: thread_comments,
                    post,
                }
            })
            .collect();

        Ok(PostPage {
            total,
            current_page: query.page,
            total_pages: PostPage::total_pages(total, query.limit),
            items,
        })
    }

    /// Adds a comment and notifies the post author unless they wrote it.
    pub async fn comment(&self, post_id: Uuid, content: String, actor: &Actor) -> DomainResult<Comment> {
        let post = self.find_post(post_id).await?;
        let post_author = post.author_id;

        let comment = self
            .comments
            .insert(Comment::new(post.id, actor.id, content))
            .await
            .map_err(|e| post_error(e, post_id))?;

        if let Err(err) = self.posts.append_comment(post_id, comment.id).await {
            // The post went away between the lookup and the append.
            if let Err(cleanup) = self.comments.delete(comment.id).await {
                if !matches!(cleanup, RepoError::NotFound) {
                    tracing::warn!(comment_id = %comment.id, error = %cleanup, "Failed to drop orphaned comment");
                }
            }
            return Err(post_error(err, post_id));
        }

        tracing::info!(
            post_id = %post_id,
            comment_id = %comment.id,
            author_id = %actor.id,
            "Comment added"
        );

        if post_author != actor.id {
            self.notifier
                .notify(post_author, &Notification::new_comment(actor, &comment))
                .await;
        }

        Ok(comment)
    }

    async fn find_post(&self, id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn profiles(&self, ids: &[Uuid]) -> DomainResult<HashMap<Uuid, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(self
            .users
            .find_many(ids)
            .await?
            .iter()
            .map(|u| (u.id, u.profile()))
            .collect())
    }
}

/// A store-level `NotFound` while touching a post means the post is gone.
fn post_error(err: RepoError, post_id: Uuid) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::not_found("Post", post_id),
        other => other.into(),
    }
}
