//! HTTP server for the chatbot

pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Secrets};
use crate::error::{Error, Result};
use state::AppState;

/// Chatbot HTTP server
pub struct StockbotServer {
    config: AppConfig,
    state: AppState,
}

impl StockbotServer {
    /// Create a new server
    pub fn new(config: AppConfig, secrets: Secrets) -> Self {
        let state = AppState::new(config.clone(), secrets);
        Self { config, state }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state);

        tracing::info!("Starting server on http://{}", addr);
        tracing::info!("Chat UI: http://{}/ui/", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_upload_size = state.config().server.max_upload_size;
    let static_dir = ServeDir::new(&state.config().server.static_dir)
        .append_index_html_on_directories(true);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route(
            "/upload",
            post(routes::upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(routes::query::query_chatbot))
        .nest_service("/ui", static_dir)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
