use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::RelayChatUseCase;
use crate::domain::DomainError;

use super::handlers::{chat_handler, health_check, RelayState};

/// Where the relay proxy listens.
#[derive(Debug, Clone)]
pub struct RelayServerConfig {
    pub host: String,
    pub port: u16,
}

impl RelayServerConfig {
    /// Loopback only.
    pub fn local(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    /// All interfaces, for hosted deployments.
    pub fn public(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RelayServerConfig {
    fn default() -> Self {
        Self::local(3000)
    }
}

/// Stateless HTTP relay in front of the inference server.
pub struct RelayServer {
    config: RelayServerConfig,
    use_case: Arc<RelayChatUseCase>,
}

impl RelayServer {
    pub fn new(config: RelayServerConfig, use_case: Arc<RelayChatUseCase>) -> Self {
        Self { config, use_case }
    }

    /// `GET /health` and `POST /chat`, traced per request.
    pub fn router(use_case: Arc<RelayChatUseCase>) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/chat", post(chat_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(RelayState { use_case })
    }

    pub async fn serve(self) -> Result<(), DomainError> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr).await?;
        self.serve_on(listener).await
    }

    /// Serves on an already-bound listener until Ctrl-C.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), DomainError> {
        let local_addr = listener.local_addr()?;
        info!("Chat proxy listening on {}", local_addr);
        if !self.use_case.is_configured() {
            warn!(
                "No upstream configured: /chat will answer 503. Set OLLAMA_URL to your Ollama or tunnel base URL."
            );
        }

        let app = Self::router(self.use_case);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Chat proxy stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
