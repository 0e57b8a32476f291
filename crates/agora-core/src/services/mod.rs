//! Application services - orchestrate ports to implement use cases.

mod auth;
mod posts;

pub use auth::{AuthService, Registration, Session, normalize_email};
pub use posts::{NewPost, PostService};
