//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{
    CommentRepository, Notifier, PasswordService, PostRepository, TokenService, UserRepository,
};
use agora_core::services::{AuthService, PostService};
use agora_infra::{
    Argon2PasswordService, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtTokenService,
};

#[cfg(feature = "postgres")]
use agora_infra::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};

use crate::config::AppConfig;

/// The three stores, behind their ports.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.main.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.main.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the state from configuration, falling back to the in-memory
    /// store when no database is configured or reachable.
    pub async fn new(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        {
            let db = match &config.database {
                Some(db_config) => match DatabaseConnections::init(db_config).await {
                    Ok(connections) => Some(Arc::new(connections)),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                        None
                    }
                },
                None => {
                    tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                    None
                }
            };

            let repos = match &db {
                Some(connections) => Repositories::postgres(connections),
                None => Repositories::in_memory(),
            };

            let mut state = Self::build(repos, tokens, passwords, notifier);
            state.db = db;
            state
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            Self::build(Repositories::in_memory(), tokens, passwords, notifier)
        }
    }

    /// Wire services over the given stores.
    pub fn build(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let auth = AuthService::new(repos.users.clone(), tokens, passwords);
        let posts = PostService::new(repos.posts, repos.comments, repos.users, notifier);

        tracing::info!("Application state initialized");

        Self {
            auth: Arc::new(auth),
            posts: Arc::new(posts),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
