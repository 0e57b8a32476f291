use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Actor, Comment};

/// Payload pushed to a post author when someone comments on their post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Email of the commenter.
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new_comment(actor: &Actor, comment: &Comment) -> Self {
        Self {
            author: actor.email.clone(),
            content: comment.content.clone(),
            timestamp: comment.created_at,
        }
    }
}
