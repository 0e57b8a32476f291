use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use agora_core::domain::{Post, Role, User};
use agora_core::error::RepoError;
use agora_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_model(id: Uuid, comment_ids: serde_json::Value) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        content: "Some post content".to_owned(),
        comment_ids,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let comment_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(
            post_id,
            serde_json::json!([comment_id.to_string()]),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.comment_ids, vec![comment_id]);
}

#[tokio::test]
async fn test_malformed_comment_list_reads_as_empty() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, serde_json::json!({"bad": 1}))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();
    assert!(post.comment_ids.is_empty());
}

#[tokio::test]
async fn test_insert_post() {
    let post_id = Uuid::new_v4();
    let model = post_model(post_id, serde_json::json!([]));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = BaseRepository::<Post, Uuid>::insert(&repo, Post::from(model))
        .await
        .unwrap();

    assert_eq!(saved.id, post_id);
}

#[tokio::test]
async fn test_update_content_returns_stored_comment_list() {
    let post_id = Uuid::new_v4();
    let comment_id = Uuid::new_v4();
    let stored = post_model(post_id, serde_json::json!([comment_id.to_string()]));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let mut stale = Post::from(stored);
    stale.comment_ids.clear();

    let updated = repo.update_content(&stale).await.unwrap();
    assert_eq!(updated.comment_ids, vec![comment_id]);
}

#[tokio::test]
async fn test_update_content_of_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = Post::from(post_model(Uuid::new_v4(), serde_json::json!([])));

    assert!(matches!(repo.update_content(&post).await, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_append_comment_to_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post_id = Uuid::new_v4();

    repo.append_comment(post_id, Uuid::new_v4()).await.unwrap();
    assert!(matches!(
        repo.append_comment(post_id, Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_find_user_by_email_with_unknown_role() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            role: "Superuser".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user: User = repo.find_by_email("jane@example.com").await.unwrap().unwrap();
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn test_delete_comments_by_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    assert_eq!(repo.delete_by_post_id(Uuid::new_v4()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}
