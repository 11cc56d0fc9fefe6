//! HTTP surface of the proxy.
//!
//! ## Endpoints
//!
//! - `POST {route}` (default `/api/search`): `{"query": "...", "user_id"?: "..."}`
//!   in, a bare JSON array of product records out
//! - `GET /health`: liveness probe
//!
//! Only a malformed request body yields a non-200 status. Everything that
//! goes wrong after that is reported as placeholder records.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use pricescout_core::SearchPipeline;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{Instrument, info};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{ProxyError, Result};

/// Path of the liveness probe.
pub const HEALTH_ROUTE: &str = "/health";

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    pipeline: SearchPipeline,
}

/// Inbound search request body.
#[derive(Debug, PartialEq, Eq, Deserialize)]
struct SearchRequest {
    /// Free-text query. Blank is allowed; the pipeline answers it with guidance.
    query: String,
    /// Overrides the configured backend user id for this request.
    #[serde(default)]
    user_id: Option<String>,
}

/// Build the proxy router around `pipeline`, serving search on `route`.
pub fn router(pipeline: SearchPipeline, route: &str) -> Router {
    Router::new()
        .route(route, post(handle_search))
        .route(HEALTH_ROUTE, get(handle_health))
        .with_state(AppState { pipeline })
}

/// The proxy HTTP server running in a background task.
pub struct ProxyServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ProxyServer {
    /// Start the proxy server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(pipeline: SearchPipeline, config: &ServerConfig) -> Result<Self> {
        let app = router(pipeline, &config.route);
        let listener = bind(config).await?;
        let addr = listener
            .local_addr()
            .map_err(|e| ProxyError::Server(format!("failed to get local addr: {e}")))?;

        info!("search proxy listening on http://{addr}{}", config.route);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("search proxy error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve in the foreground until `shutdown` resolves, then drain in-flight
/// requests.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve_until<F>(pipeline: SearchPipeline, config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(pipeline, &config.route);
    let listener = bind(config).await?;
    if let Ok(addr) = listener.local_addr() {
        info!("search proxy listening on http://{addr}{}", config.route);
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ProxyError::Server(format!("search proxy failed: {e}")))
}

async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let bind_addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ProxyError::Server(format!("bind {bind_addr} failed: {e}")))
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /health`
async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `POST {route}`
async fn handle_search(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(reason) => {
            tracing::debug!(%reason, "rejected search request");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": reason}))).into_response();
        }
    };

    let span = tracing::info_span!("search_request", request_id = %Uuid::new_v4());
    let results = state
        .pipeline
        .run(&request.query, request.user_id.as_deref())
        .instrument(span)
        .await;

    (StatusCode::OK, Json(results)).into_response()
}

/// Decode an inbound body. Only the shape is checked here: a JSON object
/// with a string `query` and an optional string `user_id`.
fn parse_request(body: &[u8]) -> std::result::Result<SearchRequest, String> {
    let fields: Map<String, Value> = serde_json::from_slice(body).map_err(|e| {
        if e.is_data() {
            "request body must be a JSON object".to_owned()
        } else {
            format!("request body must be JSON: {e}")
        }
    })?;
    let mut request = SearchRequest::deserialize(Value::Object(fields)).map_err(|e| e.to_string())?;
    request.user_id = request
        .user_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());
    Ok(request)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn parses_query_and_user_id() {
        let request = parse_request(br#"{"query": "iphone 14", "user_id": " u-1 "}"#).unwrap();
        assert_eq!(
            request,
            SearchRequest {
                query: "iphone 14".to_owned(),
                user_id: Some("u-1".to_owned()),
            }
        );
    }

    #[test]
    fn blank_query_is_accepted() {
        let request = parse_request(br#"{"query": "   "}"#).unwrap();
        assert_eq!(request.query, "   ");
        assert!(request.user_id.is_none());
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_request(b"query=iphone").unwrap_err();
        assert!(err.starts_with("request body must be JSON"));
    }

    #[test]
    fn rejects_non_object() {
        let err = parse_request(br#"["iphone"]"#).unwrap_err();
        assert_eq!(err, "request body must be a JSON object");
    }

    #[test]
    fn rejects_missing_query() {
        let err = parse_request(br#"{"q": "iphone", "user_id": "u-1"}"#).unwrap_err();
        assert_eq!(err, "missing field `query`");
    }

    #[test]
    fn rejects_non_string_query() {
        let err = parse_request(br#"{"query": 14}"#).unwrap_err();
        assert!(err.starts_with("invalid type: integer `14`, expected a string"));
    }

    #[test]
    fn blank_or_null_user_id_falls_back() {
        let request = parse_request(br#"{"query": "x", "user_id": null}"#).unwrap();
        assert!(request.user_id.is_none());
        let request = parse_request(br#"{"query": "x", "user_id": ""}"#).unwrap();
        assert!(request.user_id.is_none());
        assert!(parse_request(br#"{"query": "x", "user_id": 7}"#).is_err());
    }
}
