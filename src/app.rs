use crate::state;

use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};
use serde::Serialize;
use std::net::SocketAddr;

mod notifications;
mod session;

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

pub fn app(state: state::AppState) -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(notifications::list).delete(notifications::delete_all),
        )
        .route(
            "/api/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/api/notifications/read",
            post(notifications::bulk_mark_read),
        )
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route("/api/notifications/{id}", delete(notifications::delete))
        .route(
            "/api/notifications/{id}/read",
            post(notifications::mark_read),
        )
        .route("/health", get(health))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state,
            session::session_middleware,
        ))
}

/// Serves the reference backend until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: state::AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
