//! SmallTalks Server - HTTP API server.
//!
//! This crate exposes the smalltalk detector to the conversational pipeline.
//!
//! ## Endpoints
//!
//! - `POST /api/analyze` - Analyse an utterance and return the analysis
//! - `GET /api/intents` - List loaded intents in scan order
//! - `POST /api/reload` - Reload rules and word lists from the source
//! - `GET /api/health` - Liveness check
//!
//! ## Example
//!
//! ```no_run
//! use smalltalks_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::new(ServerConfig::default()).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod error;
mod handlers;
pub mod models;
pub mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use smalltalks_core::SourceProvider;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use error::{ApiError, Result};
pub use handlers::MAX_TEXT_LEN;
pub use state::AppState;

/// Default server port.
pub const DEFAULT_PORT: u16 = 48780;

/// Default server host (localhost only).
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1).
    pub host: String,
    /// Port to bind to (default: 48780).
    pub port: u16,
    /// Where rules and word lists are read from.
    pub source: SourceProvider,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            source: SourceProvider::bundled(),
        }
    }
}

impl ServerConfig {
    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the rule source.
    pub fn with_source(mut self, source: SourceProvider) -> Self {
        self.source = source;
        self
    }
}

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("failed to bind to {0}: {1}")]
    BindError(SocketAddr, std::io::Error),

    /// Rules or word lists could not be loaded at startup.
    #[error("failed to load detector data: {0}")]
    Init(#[from] smalltalks_core::SmallTalksError),

    /// Server runtime error.
    #[error("server error: {0}")]
    Runtime(String),
}

/// Builds the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/intents", get(handlers::get_intents))
        .route("/api/reload", post(handlers::reload))
        .route("/api/health", get(handlers::health))
        .with_state(state)
}

/// The HTTP API server.
pub struct Server {
    router: Router,
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    /// Creates a new server with the given configuration.
    pub fn new(config: ServerConfig) -> std::result::Result<Self, ServerError> {
        let state = AppState::from_source(config.source.clone());
        Self::with_state(config, state)
    }

    /// Creates a server with custom application state.
    pub fn with_state(
        config: ServerConfig,
        state: AppState,
    ) -> std::result::Result<Self, ServerError> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = router(state.clone()).layer(cors);

        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| ServerError::Runtime(format!("invalid address: {}", e)))?;

        Ok(Self {
            router,
            state,
            addr,
        })
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Loads detector data and runs the server until shutdown.
    ///
    /// Loading happens before binding so that a broken source fails fast.
    pub async fn run(self) -> std::result::Result<(), ServerError> {
        self.state.detector.read().await.init().await?;

        info!("Starting SmallTalks API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::BindError(self.addr, e))?;

        axum::serve(listener, self.router)
            .await
            .map_err(|e| ServerError::Runtime(e.to_string()))?;

        Ok(())
    }

    /// Returns the router for testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        router(AppState::bundled())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_greeting() {
        let (status, json) = send(
            create_test_app(),
            post_json("/api/analyze", json!({"text": "hi there"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matches"][0]["intentName"], "greeting");
        assert_eq!(json["matches"][0]["value"], "hi");
        assert_eq!(json["cleanedInput"], "there");
        assert_eq!(json["haveCursedWords"], false);
    }

    #[tokio::test]
    async fn test_analyze_with_config() {
        let (status, json) = send(
            create_test_app(),
            post_json(
                "/api/analyze",
                json!({"text": "damn, thanks", "config": {"informationLevel": "NONE"}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["haveCursedWords"], true);
        assert_eq!(json["matches"][0]["intentName"], "thanks");
        assert!(json["matches"][0].get("value").is_none());
        assert!(json.get("markedInput").is_none());
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversized_text() {
        let text = "a".repeat(MAX_TEXT_LEN + 1);
        let (status, json) = send(
            create_test_app(),
            post_json("/api/analyze", json!({ "text": text })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_analyze_malformed_body_is_json_bad_request() {
        let (status, json) = send(
            create_test_app(),
            post_json("/api/analyze", json!({"config": {"toLower": false}})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "bad_request");
        assert!(json["error"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn test_get_intents_in_scan_order() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/intents")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(create_test_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        let priorities: Vec<i64> = json["intents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["priority"].as_i64().unwrap())
            .collect();
        assert!(!priorities.is_empty());
        assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_reload() {
        let (status, json) = send(create_test_app(), post_json("/api/reload", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert!(json["intents"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_missing_source_is_service_unavailable() {
        let state = AppState::from_source(SourceProvider::local("/nonexistent/smalltalks"));
        let (status, json) = send(
            router(state),
            post_json("/api/analyze", json!({"text": "hello"})),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "source_unavailable");
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(create_test_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::default().with_host("0.0.0.0").with_port(9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.source, SourceProvider::bundled());
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let config = ServerConfig::default().with_host("not a host");
        assert!(matches!(Server::new(config), Err(ServerError::Runtime(_))));
    }
}
