mod analysis;
mod backfill;
mod products;
mod sync;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use basketiq_analysis::{analyze_product, ProductAnalysis};
use basketiq_core::{GroupRule, PriceStore, Product, RetailerFeed, StoreError};
use basketiq_ingest::FeedClient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_api_key_for_writes, ApiKeys, RateBudget, RateLimiter,
    RequestId,
};

/// History points fetched per product for comparison and forecasting.
pub(crate) const HISTORY_WINDOW: usize = 30;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PriceStore>,
    pub group_rules: Arc<Vec<GroupRule>>,
    pub feeds: Arc<Vec<RetailerFeed>>,
    pub feed_client: Arc<FeedClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    tracing::error!(error = %error, "store query failed");
    ApiError::new(request_id, "internal_error", "store query failed")
}

/// Returns the trimmed value of a required query parameter, or a
/// `bad_request` error naming it.
pub(super) fn require_param<'a>(
    request_id: &str,
    name: &str,
    value: Option<&'a str>,
) -> Result<&'a str, ApiError> {
    value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
        ApiError::new(
            request_id,
            "bad_request",
            format!("missing required parameter: {name}"),
        )
    })
}

/// Runs the forecast pipeline for each product over its recent history.
pub(super) async fn analyze_products(
    store: &dyn PriceStore,
    products: &[&Product],
) -> Result<Vec<ProductAnalysis>, StoreError> {
    let mut analyses = Vec::with_capacity(products.len());
    for product in products {
        let history = store.recent_price_history(product.id, HISTORY_WINDOW).await?;
        analyses.push(analyze_product(product, &history));
    }
    Ok(analyses)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Every route except health: keyed writes and per-client budgets.
fn guarded_router(api_keys: ApiKeys, rate_limiter: RateLimiter) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products/compare", get(products::compare_products))
        .route("/api/v1/products/grouped", get(products::grouped_products))
        .route("/api/v1/products/similar", get(products::similar_products))
        .route("/api/v1/predictions", get(analysis::list_predictions))
        .route(
            "/api/v1/recommendations",
            get(analysis::list_recommendations),
        )
        .route("/api/v1/sync", post(sync::trigger_sync))
        .route(
            "/api/v1/price-history/generate",
            post(backfill::generate_price_history),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limiter,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    api_keys,
                    require_api_key_for_writes,
                )),
        )
}

pub fn build_app(state: AppState, api_keys: ApiKeys, rate_limiter: RateLimiter) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(guarded_router(api_keys, rate_limiter))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

/// 120 reads and 6 writes per client per minute.
pub fn default_rate_limiter() -> RateLimiter {
    RateLimiter::new(RateBudget::per_minute(120), RateBudget::per_minute(6))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
