//! Axum-based HTTP server for the alarm controller.
//!
//! Provides endpoints for:
//! - GET `/alarm?code=...` - Disarm attempt (always `200 OK`, body `OK`)
//! - GET `/api/status` - Current alarm status
//! - GET `/` - Status page (serves index.html)

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{Config, DEFAULT_ACCESS_CODE};
use crate::shared::AlarmControl;

use super::api::{ApiResponse, DisarmQuery, StatusResponse};

/// Body of every `/alarm` response.
pub const DISARM_RESPONSE_BODY: &str = "OK";

// ============================================================================
// Router State
// ============================================================================

/// State handed to every route handler.
#[derive(Clone)]
pub struct WebState {
    alarm: Arc<dyn AlarmControl>,
    access_code: Arc<str>,
}

impl WebState {
    /// Pair the alarm with the code that disarms it.
    pub fn new(alarm: Arc<dyn AlarmControl>, access_code: &str) -> Self {
        Self {
            alarm,
            access_code: Arc::from(access_code),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /alarm - Disarm attempt
///
/// The response never reveals whether the code matched. When `code` is
/// repeated the first value is used.
async fn disarm(
    State(state): State<WebState>,
    query: Option<Query<DisarmQuery>>,
) -> &'static str {
    let query = query.map(|Query(q)| q).unwrap_or_default();

    match query.code() {
        Some(code) => {
            // Outcome already logged and notified by the shared state
            let _ = state.alarm.disarm(code, &state.access_code);
        }
        None => tracing::debug!("disarm request without code"),
    }
    DISARM_RESPONSE_BODY
}

/// GET /api/status - Returns current alarm status
async fn get_status(State(state): State<WebState>) -> Json<ApiResponse<StatusResponse>> {
    let status = state.alarm.status();
    Json(ApiResponse::ok(StatusResponse::from(&status)))
}

/// GET / - Serve the status page
async fn index() -> impl IntoResponse {
    Html(include_str!("../../www/index.html"))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Code that disarms the alarm
    pub access_code: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cors_permissive: false,
            access_code: DEFAULT_ACCESS_CODE.to_string(),
        }
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Set the disarm code
    pub fn access_code(mut self, code: &str) -> Self {
        self.access_code = code.to_string();
        self
    }

    /// Create from the shared config
    pub fn from_config(config: &Config) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], config.web.port)),
            cors_permissive: config.web.cors_permissive,
            access_code: config.access.code.to_string(),
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<A: AlarmControl + 'static>(alarm: Arc<A>, config: &WebServerConfig) -> Router {
    let state = WebState::new(alarm, &config.access_code);

    let mut router = Router::new()
        .route("/alarm", get(disarm))
        .route("/api/status", get(get_status))
        .route("/", get(index))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server with shared state
///
/// Serves until `shutdown` resolves, then drains in-flight requests.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedAlarmState::new(machine, clock, notifier));
///
/// run_server_with_state(state, web_config, async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// ```
pub async fn run_server_with_state<A, F>(
    alarm: Arc<A>,
    config: WebServerConfig,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    A: AlarmControl + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(alarm, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
