//! In-process realtime delivery: who is connected, and pushing to them.
//!
//! State lives in this process only; nothing is persisted or shared
//! across instances.

mod dispatcher;
mod registry;

pub use dispatcher::{Delivery, NOTIFICATION_EVENT, NotificationDispatcher, PushError, PushTransport};
pub use registry::ConnectionRegistry;
