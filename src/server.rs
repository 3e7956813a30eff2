//! JSON HTTP server.
//!
//! Exposes the query, recommendation, status, and seed operations over
//! HTTP. Presentation is left to the client; every endpoint returns JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/search` | `{query, currency?}` → listings and facets |
//! | `POST` | `/recommend` | `{query}` → advisory text and facets |
//! | `GET`  | `/status` | `{connected, product_count, error}` |
//! | `POST` | `/seed` | Insert the sample catalog if the store is empty |
//! | `GET`  | `/history` | Recent searches (`?limit=N`) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `store_unavailable` (503), `internal` (500).
//! Malformed JSON bodies and query strings are reported as `bad_request`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use shop_lens_core::aggregate::QueryError;
use shop_lens_core::models::SearchRecord;

use crate::config::Config;
use crate::context::AppContext;
use crate::history::recent_searches;
use crate::query::{search_listings, SearchResponse};
use crate::recommend::{recommend, RecommendResponse};
use crate::seed::{seed_store, SeedOutcome};
use crate::status::{store_status, StatusResponse};

const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Starts the HTTP server on `[server].bind`.
///
/// Probes the store once, then serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let ctx = Arc::new(AppContext::connect(config).await?);
    let listener = TcpListener::bind(&config.server.bind).await?;
    println!("Shop Lens server listening on http://{}", config.server.bind);
    serve(ctx, listener).await
}

/// Serve the API on an already-bound listener.
pub async fn serve(ctx: Arc<AppContext>, listener: TcpListener) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, connected = ctx.store.is_connected(), "serving");
    }
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

/// Build the router. Exposed so tests can serve it on an ephemeral port.
pub fn router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", post(handle_search))
        .route("/recommend", post(handle_recommend))
        .route("/status", get(handle_status))
        .route("/seed", post(handle_seed))
        .route("/history", get(handle_history))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(ctx)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::bad_request(format!("please enter a search query ({})", e))
    }
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

fn store_error(ctx: &AppContext, err: anyhow::Error) -> AppError {
    if ctx.store.is_connected() {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: format!("{:#}", err),
        }
    } else {
        AppError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "store_unavailable",
            message: format!("{:#}", err),
        }
    }
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    currency: Option<String>,
}

async fn handle_search(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(req) = payload?;
    let response = search_listings(&ctx, &req.query, req.currency.as_deref()).await?;
    Ok(Json(response))
}

// ============ POST /recommend ============

#[derive(Deserialize)]
struct RecommendRequest {
    query: String,
}

async fn handle_recommend(
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let Json(req) = payload?;
    Ok(Json(recommend(&req.query)?))
}

// ============ GET /status ============

async fn handle_status(State(ctx): State<Arc<AppContext>>) -> Json<StatusResponse> {
    Json(store_status(&ctx).await)
}

// ============ POST /seed ============

async fn handle_seed(State(ctx): State<Arc<AppContext>>) -> Result<Json<SeedOutcome>, AppError> {
    seed_store(&ctx.store)
        .await
        .map(Json)
        .map_err(|e| store_error(&ctx, e))
}

// ============ GET /history ============

#[derive(Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct HistoryResponse {
    searches: Vec<SearchRecord>,
}

async fn handle_history(
    State(ctx): State<Arc<AppContext>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let searches = recent_searches(&ctx.store, limit)
        .await
        .map_err(|e| store_error(&ctx, e))?;
    Ok(Json(HistoryResponse { searches }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
