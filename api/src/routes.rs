//! Router setup.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/remove", post(handlers::remove))
        .route("/initialize", post(handlers::initialize))
        .route("/chat", post(handlers::chat))
        .route("/api/session", get(handlers::session))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Answers every request with the startup error.
pub fn halted_router(message: impl Into<String>) -> Router {
    let message: Arc<str> = Arc::from(message.into());
    Router::new().fallback(handlers::halted).with_state(message)
}

pub async fn start_server(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
