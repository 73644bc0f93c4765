//! HTTP server for Prometheus metrics endpoint.

use crate::metrics::GaugeRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener could not be bound.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// Server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
    /// Path the metrics are served on.
    pub path: String,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 2112).into(),
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsServerConfig {
    /// Creates a config with a custom port and path.
    pub fn new(port: u16, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
            path,
        }
    }
}

/// HTTP server for exposing Prometheus metrics.
pub struct MetricsServer {
    config: MetricsServerConfig,
    registry: Arc<GaugeRegistry>,
}

impl MetricsServer {
    /// Creates a new metrics server reading from a shared registry.
    pub fn new(config: MetricsServerConfig, registry: Arc<GaugeRegistry>) -> Self {
        Self { config, registry }
    }

    /// Builds the router without binding a listener.
    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.config.path, get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(Arc::clone(&self.registry))
    }

    /// Starts the HTTP server.
    ///
    /// This method runs the server until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            path = %self.config.path,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the metrics endpoint.
async fn metrics_handler(State(registry): State<Arc<GaugeRegistry>>) -> impl IntoResponse {
    match registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::MetricKey;

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 2112);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_config_path_normalized() {
        let config = MetricsServerConfig::new(8080, "stats");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.path, "/stats");
    }

    #[tokio::test]
    async fn test_serves_registry_on_configured_path() {
        let registry = Arc::new(GaugeRegistry::new().unwrap());
        registry.update(&MetricKey::new("main", "live"), 9);

        let server = MetricsServer::new(
            MetricsServerConfig::new(0, "/custom"),
            Arc::clone(&registry),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = server.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let body = reqwest::get(format!("http://{addr}/custom"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains(r#"icecast_listeners{server_name="main",stream_url="live"} 9"#));

        let health = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(health.status().as_u16(), 200);

        let missing = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
        assert_eq!(missing.status().as_u16(), 404);
    }
}
