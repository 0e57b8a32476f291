//! Notification port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Notification;

/// Best-effort push of a notification to a user.
///
/// Delivery is at most once: when the user has no live connection the
/// notification is dropped, and failures are never reported to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, notification: &Notification);
}
