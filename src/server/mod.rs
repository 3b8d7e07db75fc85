//! HTTP front end: the upload form and a JSON twin of it.
//!
//! | Route               | Purpose                                   |
//! |---------------------|-------------------------------------------|
//! | `GET /`             | empty form                                |
//! | `POST /`            | button press; page with result or error   |
//! | `POST /api/analyze` | same multipart fields, JSON response      |
//! | `GET /health`       | liveness plus provider/model in use       |
//!
//! The only shared state is an `Arc<InteractionController>`, which is
//! immutable. Each request carries its own résumé and job description.

pub mod handlers;
pub mod page;
pub mod types;

use crate::controller::InteractionController;
use crate::error::AtsError;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Largest accepted request body. Résumés are small; this leaves headroom
/// for scanned PDFs.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Where to listen.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Build the application router.
pub fn router(controller: Arc<InteractionController>) -> Router {
    let app_state = handlers::AppState { controller };

    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/api/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: ServerConfig, controller: Arc<InteractionController>) -> Result<(), AtsError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AtsError::InvalidConfig(format!("bad listen address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AtsError::InvalidConfig(format!("cannot bind {addr}: {e}")))?;

    info!("Serving on http://{}", addr);
    axum::serve(listener, router(controller))
        .await
        .map_err(|e| AtsError::Internal(format!("server error: {e}")))
}
