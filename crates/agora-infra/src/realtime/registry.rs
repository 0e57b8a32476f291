//! Registry of live realtime connections, keyed by user.

use std::collections::HashMap;
use std::fmt::Debug;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Maps each user to the one connection notifications are delivered on.
///
/// A user has at most one entry; registering again replaces it. Every
/// operation runs under a single lock acquisition, so a register and an
/// unregister racing for the same user cannot interleave.
pub struct ConnectionRegistry<H> {
    connections: RwLock<HashMap<Uuid, H>>,
}

impl<H> ConnectionRegistry<H>
where
    H: Clone + PartialEq + Debug + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Bind `handle` as the delivery target for `user_id`, returning the
    /// handle it replaced, if any.
    pub async fn register(&self, user_id: Uuid, handle: H) -> Option<H> {
        let mut connections = self.connections.write().await;
        let previous = connections.insert(user_id, handle.clone());

        match &previous {
            Some(old) if *old != handle => tracing::info!(
                user_id = %user_id,
                previous = ?old,
                handle = ?handle,
                "Connection replaced"
            ),
            _ => tracing::info!(user_id = %user_id, handle = ?handle, "Connection registered"),
        }

        previous
    }

    pub async fn lookup(&self, user_id: Uuid) -> Option<H> {
        self.connections.read().await.get(&user_id).cloned()
    }

    /// Remove the entries currently bound to `handle`, returning their users.
    ///
    /// A handle that has since been replaced by a newer registration matches
    /// no entry, so this is a no-op for it.
    pub async fn unregister(&self, handle: &H) -> Vec<Uuid> {
        let mut connections = self.connections.write().await;

        let mut removed = Vec::new();
        connections.retain(|user_id, h| {
            let matches = h == handle;
            if matches {
                removed.push(*user_id);
            }
            !matches
        });

        for user_id in &removed {
            tracing::info!(user_id = %user_id, handle = ?handle, "Connection removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl<H> Default for ConnectionRegistry<H>
where
    H: Clone + PartialEq + Debug + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
