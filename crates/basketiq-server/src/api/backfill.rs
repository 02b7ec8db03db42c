use axum::{
    extract::{Query, State},
    Extension, Json,
};
use basketiq_ingest::{
    backfill_price_history, validate_backfill_limit, BackfillReport, DEFAULT_BACKFILL_DAYS,
    DEFAULT_BACKFILL_LIMIT,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Default, Deserialize)]
pub(super) struct BackfillQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct BackfillSummary {
    message: String,
    limit: usize,
    #[serde(flatten)]
    report: BackfillReport,
}

/// Generates a year of synthetic daily history for up to `limit` products.
pub(super) async fn generate_price_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BackfillQuery>,
) -> Result<Json<ApiResponse<BackfillSummary>>, ApiError> {
    let limit = validate_backfill_limit(query.limit.unwrap_or(DEFAULT_BACKFILL_LIMIT))
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    tracing::info!(limit, "price history generation requested over HTTP");

    let mut rng = StdRng::from_os_rng();
    let report = backfill_price_history(
        state.store.as_ref(),
        limit,
        DEFAULT_BACKFILL_DAYS,
        Utc::now(),
        &mut rng,
    )
    .await
    .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: BackfillSummary {
            message: format!("price history generated for {} products", report.products),
            limit,
            report,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
