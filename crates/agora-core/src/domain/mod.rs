//! Domain entities - the core business objects.

mod comment;
mod notification;
mod post;
mod user;

pub use comment::{Comment, CommentWithAuthor};
pub use notification::Notification;
pub use post::{Post, PostPage, PostPatch, PostQuery, PostThread, PostWithAuthor};
pub use user::{Actor, Role, UnknownRole, User, UserProfile};
