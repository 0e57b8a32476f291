//! Best-effort delivery of notifications to connected users.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use agora_core::domain::Notification;
use agora_core::ports::Notifier;

use super::registry::ConnectionRegistry;

/// Event name clients listen on.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Errors raised by a transport while pushing a message.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Connection is gone")]
    Disconnected,

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Send failed: {0}")]
    Send(String),
}

/// A transport able to push an event to one live connection.
pub trait PushTransport: Send + Sync {
    type Handle: Clone + PartialEq + Debug + Send + Sync;

    fn push(
        &self,
        handle: &Self::Handle,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<(), PushError>;
}

/// Outcome of a single dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The user has no registered connection.
    NoConnection,
    /// The transport refused the push.
    Failed,
}

/// Looks up a user's live connection and pushes to it.
///
/// Fire-and-forget: nothing is queued or retried.
pub struct NotificationDispatcher<T: PushTransport> {
    registry: Arc<ConnectionRegistry<T::Handle>>,
    transport: T,
}

impl<T: PushTransport> NotificationDispatcher<T> {
    pub fn new(registry: Arc<ConnectionRegistry<T::Handle>>, transport: T) -> Self {
        Self {
            registry,
            transport,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry<T::Handle>> {
        &self.registry
    }

    pub async fn dispatch<P: Serialize + ?Sized>(&self, user_id: Uuid, payload: &P) -> Delivery {
        let Some(handle) = self.registry.lookup(user_id).await else {
            tracing::debug!(user_id = %user_id, "User is not connected, notification dropped");
            return Delivery::NoConnection;
        };

        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Notification payload not serializable");
                return Delivery::Failed;
            }
        };

        match self.transport.push(&handle, NOTIFICATION_EVENT, &payload) {
            Ok(()) => {
                tracing::debug!(user_id = %user_id, handle = ?handle, "Notification sent");
                Delivery::Sent
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, handle = ?handle, error = %e, "Notification push failed");
                Delivery::Failed
            }
        }
    }
}

#[async_trait]
impl<T: PushTransport> Notifier for NotificationDispatcher<T> {
    async fn notify(&self, user_id: Uuid, notification: &Notification) {
        self.dispatch(user_id, notification).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(u32, String, serde_json::Value)>>,
        fail: bool,
    }

    impl PushTransport for RecordingTransport {
        type Handle = u32;

        fn push(&self, handle: &u32, event: &str, payload: &serde_json::Value) -> Result<(), PushError> {
            if self.fail {
                return Err(PushError::Disconnected);
            }
            self.sent
                .lock()
                .unwrap()
                .push((*handle, event.to_string(), payload.clone()));
            Ok(())
        }
    }

    fn notification() -> Notification {
        Notification {
            author: "bob@example.com".to_string(),
            content: "Nice post".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_delivers_to_registered_handle() {
        let registry = Arc::new(ConnectionRegistry::new());
        let user = Uuid::new_v4();
        registry.register(user, 7).await;

        let dispatcher = NotificationDispatcher::new(registry, RecordingTransport::default());
        let delivery = dispatcher.dispatch(user, &notification()).await;

        assert_eq!(delivery, Delivery::Sent);
        let sent = dispatcher.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 7);
        assert_eq!(sent[0].1, NOTIFICATION_EVENT);
        assert_eq!(sent[0].2["author"], "bob@example.com");
    }

    #[tokio::test]
    async fn test_drops_when_not_connected() {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(ConnectionRegistry::new()),
            RecordingTransport::default(),
        );

        let delivery = dispatcher.dispatch(Uuid::new_v4(), &notification()).await;

        assert_eq!(delivery, Delivery::NoConnection);
        assert!(dispatcher.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let registry = Arc::new(ConnectionRegistry::new());
        let user = Uuid::new_v4();
        registry.register(user, 1).await;

        let dispatcher = NotificationDispatcher::new(
            registry,
            RecordingTransport {
                fail: true,
                ..Default::default()
            },
        );

        dispatcher.notify(user, &notification()).await;
        assert_eq!(dispatcher.dispatch(user, &notification()).await, Delivery::Failed);
    }
}
