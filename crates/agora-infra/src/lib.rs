//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`:
//! persistence, credentials and realtime delivery.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL persistence via SeaORM
//!
//! The in-memory repositories are always available.

pub mod auth;
pub mod database;
pub mod realtime;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService, PasswordHashConfig};
pub use database::{
    DatabaseConfig, InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository,
};
pub use realtime::{ConnectionRegistry, Delivery, NotificationDispatcher, PushError, PushTransport};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};
