//! HTTP server for the feed aggregator
//!
//! # Routes
//!
//! - `GET /feeds?type={nvd|cisa|github|statistics|owasp}` - single-source
//!   result; without `type` the full aggregate
//! - `POST /feeds` with `{"action": "clearCache"}` - invalidate the cache
//! - `GET /health` - liveness check
//!
//! All responses carry permissive CORS headers; `OPTIONS` short-circuits
//! with an empty 200. The feed endpoints always answer 200 with data (live,
//! cached, or synthetic); only malformed requests get a 4xx and only
//! unexpected internal failures a 500.

use crate::aggregator::FeedAggregator;
use crate::config::FeedConfig;
use crate::feeds::FeedSource;
use crate::{Result, RiskFeedError};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared server state
struct AppState {
    aggregator: FeedAggregator,
}

/// HTTP server for the feed aggregator
pub struct FeedServer {
    state: Arc<AppState>,
}

impl FeedServer {
    /// Create a new feed server from the configuration
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let aggregator = FeedAggregator::new(config)?;
        Ok(Self {
            state: Arc::new(AppState { aggregator }),
        })
    }

    /// Build the router with the recovery and CORS middleware applied
    fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/feeds", get(get_feeds).post(post_feeds))
            .layer(middleware::from_fn(recover_middleware))
            .layer(middleware::from_fn(cors_middleware))
            .with_state(state)
    }

    /// Run the server on the given address
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RiskFeedError::Other(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(addr, "Feed server listening");

        axum::serve(listener, Self::router(self.state))
            .await
            .map_err(RiskFeedError::Io)
    }
}

/// Map handler panics to a well-formed 500 instead of a dropped connection
///
/// The inner service runs on its own task; a panic surfaces as a join error
/// here rather than tearing down the connection.
async fn recover_middleware(request: Request<Body>, next: Next) -> Response {
    match tokio::spawn(next.run(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Request handler panicked");
            ErrorResponse::internal("Internal server error").into_response()
        }
    }
}

/// Permissive CORS for the dashboard UI; OPTIONS short-circuits with 200
async fn cors_middleware(request: Request<Body>, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        apply_cors(&mut response);
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors(&mut response);
    response
}

fn apply_cors(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Query string for `GET /feeds`
#[derive(Debug, Deserialize)]
struct FeedQuery {
    /// Feed source name; omitted means the full aggregate
    #[serde(rename = "type")]
    feed_type: Option<String>,
}

/// Body for `POST /feeds`
#[derive(Debug, Deserialize)]
struct FeedActionRequest {
    action: String,
}

/// Error response for malformed requests and internal failures
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                error: "bad_request".to_string(),
                message: message.into(),
            }),
        )
    }

    fn internal(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self {
                error: "internal_error".to_string(),
                message: message.into(),
            }),
        )
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_feeds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> std::result::Result<Response, (StatusCode, Json<ErrorResponse>)> {
    match query.feed_type.as_deref() {
        None => {
            let result = state.aggregator.aggregate().await;
            Ok(Json(result).into_response())
        }
        Some(name) => {
            let source: FeedSource = name.parse().map_err(|_| {
                ErrorResponse::bad_request(format!(
                    "Unknown feed type '{}'; expected nvd, cisa, github, statistics, or owasp",
                    name
                ))
            })?;

            let result = state.aggregator.get_source(source).await;
            Ok(Json(result).into_response())
        }
    }
}

async fn post_feeds(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedActionRequest>,
) -> std::result::Result<Response, (StatusCode, Json<ErrorResponse>)> {
    match request.action.as_str() {
        "clearCache" => {
            state.aggregator.clear_cache().await;
            tracing::info!("Feed cache cleared by operator request");
            Ok(Json(serde_json::json!({
                "success": true,
                "message": "Cache cleared"
            }))
            .into_response())
        }
        other => Err(ErrorResponse::bad_request(format!(
            "Unsupported action '{}'",
            other
        ))),
    }
}
