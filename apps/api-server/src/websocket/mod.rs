//! Realtime channel over socket.io.
//!
//! Clients `register` their user id after connecting; the server pushes
//! `notification` events to the registered socket.

use std::net::SocketAddr;
use std::sync::Arc;

use engineioxide::service::NotFoundService;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use socketioxide::{
    SocketIo,
    extract::{Data, SocketRef},
    service::SocketIoService,
    socket::Sid,
};
use tokio::net::TcpListener;
use uuid::Uuid;

use agora_infra::{ConnectionRegistry, NotificationDispatcher, PushError, PushTransport};
use agora_shared::dto::NotifyRequest;

/// Pushes events to sockets owned by a [`SocketIo`] server.
#[derive(Clone)]
pub struct SocketIoTransport {
    io: SocketIo,
}

impl SocketIoTransport {
    pub fn new(io: SocketIo) -> Self {
        Self { io }
    }
}

impl PushTransport for SocketIoTransport {
    type Handle = Sid;

    fn push(&self, handle: &Sid, event: &str, payload: &serde_json::Value) -> Result<(), PushError> {
        let socket = self.io.get_socket(*handle).ok_or(PushError::Disconnected)?;

        socket
            .emit(event.to_string(), payload)
            .map_err(|e| PushError::Send(e.to_string()))
    }
}

pub type SocketRegistry = ConnectionRegistry<Sid>;
pub type SocketDispatcher = NotificationDispatcher<SocketIoTransport>;

/// Accepts a user id sent either as a JSON string or as `{ "userId": ... }`.
fn parse_user_id(value: &serde_json::Value) -> Option<Uuid> {
    let raw = match value {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Object(map) => map.get("userId")?.as_str()?,
        _ => return None,
    };
    Uuid::parse_str(raw.trim()).ok()
}

/// Configure socket.io handlers.
pub fn configure_socket_handlers(io: &SocketIo, dispatcher: Arc<SocketDispatcher>) {
    io.ns("/", move |socket: SocketRef| {
        let dispatcher = dispatcher.clone();
        async move {
            tracing::info!(socket_id = %socket.id, "Client connected");

            let on_register = dispatcher.clone();
            socket.on("register", move |socket: SocketRef, Data::<serde_json::Value>(data)| {
                let dispatcher = on_register.clone();
                async move {
                    let Some(user_id) = parse_user_id(&data) else {
                        tracing::warn!(socket_id = %socket.id, payload = %data, "Registration failed: no valid userId");
                        return;
                    };

                    dispatcher.registry().register(user_id, socket.id).await;
                }
            });

            let on_notify = dispatcher.clone();
            socket.on("notify", move |socket: SocketRef, Data::<serde_json::Value>(data)| {
                let dispatcher = on_notify.clone();
                async move {
                    let request: NotifyRequest = match serde_json::from_value(data) {
                        Ok(request) => request,
                        Err(e) => {
                            tracing::warn!(socket_id = %socket.id, error = %e, "Malformed notify payload");
                            return;
                        }
                    };

                    match Uuid::parse_str(request.user_id.trim()) {
                        Ok(user_id) => {
                            dispatcher.dispatch(user_id, &request.message).await;
                        }
                        Err(_) => {
                            tracing::warn!(socket_id = %socket.id, user_id = %request.user_id, "Notify target is not a valid id");
                        }
                    }
                }
            });

            let on_disconnect = dispatcher.clone();
            socket.on_disconnect(move |socket: SocketRef| {
                let dispatcher = on_disconnect.clone();
                async move {
                    let removed = dispatcher.registry().unregister(&socket.id).await;
                    tracing::info!(socket_id = %socket.id, users = ?removed, "Client disconnected");
                }
            });
        }
    });
}

/// Serve the socket.io endpoint on its own listener until the task is dropped.
pub async fn serve(
    io_service: SocketIoService<NotFoundService>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Realtime server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = io_service.clone();

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .with_upgrades()
                .await
            {
                tracing::debug!(%peer, error = %e, "Realtime connection closed with error");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_string_or_object() {
        let id = Uuid::new_v4();

        assert_eq!(parse_user_id(&serde_json::json!(id.to_string())), Some(id));
        assert_eq!(parse_user_id(&serde_json::json!({"userId": id.to_string()})), Some(id));
        assert_eq!(parse_user_id(&serde_json::json!("")), None);
        assert_eq!(parse_user_id(&serde_json::json!(42)), None);
    }
}
