//! # Agora API Server
//!
//! REST API on actix-web plus a socket.io listener for notifications.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use socketioxide::SocketIo;
use tracing_actix_web::TracingLogger;

use agora_infra::NotificationDispatcher;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
mod websocket;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;
use websocket::{SocketIoTransport, SocketRegistry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    // Realtime: one registry for the process, shared by socket handlers and
    // the post service.
    let (io_service, io) = SocketIo::new_svc();
    let registry = Arc::new(SocketRegistry::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        registry,
        SocketIoTransport::new(io.clone()),
    ));
    websocket::configure_socket_handlers(&io, dispatcher.clone());

    let state = AppState::new(&config, dispatcher).await;

    let realtime_addr: SocketAddr = format!("{}:{}", config.host, config.realtime_port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let realtime = tokio::spawn(websocket::serve(io_service, realtime_addr));

    tracing::info!(
        host = %config.host,
        port = config.port,
        realtime_port = config.realtime_port,
        "Starting Agora API Server"
    );

    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    realtime.abort();
    result
}
