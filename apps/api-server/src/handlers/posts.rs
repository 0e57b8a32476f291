//! Post and comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use agora_core::domain::{
    Comment, CommentWithAuthor, Post, PostPatch, PostQuery, PostThread, UserProfile,
};
use agora_core::policy::POST_ROLES;
use agora_core::services::NewPost;
use agora_shared::MessageResponse;
use agora_shared::dto::{
    AuthorView, CommentRequest, CommentResponse, CreatePostRequest, Expandable, ListPostsQuery,
    PostListResponse, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn author_view(profile: UserProfile) -> Expandable<AuthorView> {
    Expandable::Expanded(AuthorView {
        id: profile.id,
        email: profile.email,
    })
}

fn post_response(
    post: Post,
    author: Option<Expandable<AuthorView>>,
    comments: Vec<Expandable<CommentResponse>>,
) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        author,
        comments,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// A post whose references are left as ids.
fn bare_post(post: Post) -> PostResponse {
    let author = Some(Expandable::Id(post.author_id));
    let comments = post.comment_ids.iter().copied().map(Expandable::Id).collect();
    post_response(post, author, comments)
}

fn comment_response(comment: Comment, author: Option<Expandable<AuthorView>>) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post: comment.post_id,
        author,
        content: comment.content,
        created_at: comment.created_at,
    }
}

fn thread_response(thread: PostThread) -> PostResponse {
    let comments = thread
        .comments
        .into_iter()
        .map(|CommentWithAuthor { comment, author }| {
            Expandable::Expanded(comment_response(comment, author.map(author_view)))
        })
        .collect();

    post_response(thread.post, thread.author.map(author_view), comments)
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let identity = identity.require_roles(POST_ROLES)?;
    let req = body.into_inner();
    req.validate()
        .map_err(|e| AppError::validation(&e, "body"))?;

    let post = state
        .posts
        .create(
            NewPost {
                title: req.title,
                content: req.content,
            },
            &identity.0,
        )
        .await?;

    Ok(HttpResponse::Created().json(bare_post(post)))
}

/// GET /api/posts?page&limit&search
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    identity.require_roles(POST_ROLES)?;
    let query = query.into_inner();
    query
        .validate()
        .map_err(|e| AppError::validation(&e, "query"))?;

    let query = PostQuery::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(PostQuery::DEFAULT_LIMIT),
        query.search,
    );

    let page = state
        .posts
        .list(&query)
        .await
        .map_err(|e| AppError::from(e).or_internal("Failed to retrieve posts"))?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        total_posts: page.total,
        current_page: page.current_page,
        total_pages: page.total_pages,
        posts: page.items.into_iter().map(thread_response).collect(),
    }))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_roles(POST_ROLES)?;
    let found = state.posts.get(path.into_inner()).await?;

    let comments = found
        .post
        .comment_ids
        .iter()
        .copied()
        .map(Expandable::Id)
        .collect();
    let author = found.author.map(author_view);

    Ok(HttpResponse::Ok().json(post_response(found.post, author, comments)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let identity = identity.require_roles(POST_ROLES)?;
    let req = body.into_inner();
    req.validate()
        .map_err(|e| AppError::validation(&e, "body"))?;

    let patch = PostPatch {
        title: req.title,
        content: req.content,
    };
    let post = state
        .posts
        .update(path.into_inner(), patch, &identity.0)
        .await?;

    Ok(HttpResponse::Ok().json(bare_post(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let identity = identity.require_roles(POST_ROLES)?;
    state.posts.delete(path.into_inner(), &identity.0).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post removed")))
}

/// POST /api/posts/{id}/comments
pub async fn comment_on_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let identity = identity.require_roles(POST_ROLES)?;
    let req = body.into_inner();
    req.validate()
        .map_err(|e| AppError::validation(&e, "body"))?;

    let comment = state
        .posts
        .comment(path.into_inner(), req.content.trim().to_string(), &identity.0)
        .await
        .map_err(|e| AppError::from(e).or_internal("Failed to add comment"))?;

    let author = Some(Expandable::Id(comment.author_id));
    Ok(HttpResponse::Created().json(comment_response(comment, author)))
}
