//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod notifier;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenKind, TokenPair, TokenService};
pub use notifier::Notifier;
pub use repository::{BaseRepository, CommentRepository, PostRepository, UserRepository};
