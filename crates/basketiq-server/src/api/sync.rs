use axum::{extract::State, Extension, Json};
use basketiq_ingest::{sync_retailers, RetailerSyncStatus, SyncStatus};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SyncSummary {
    message: &'static str,
    succeeded: usize,
    failed: usize,
    results: Vec<RetailerSyncStatus>,
}

impl SyncSummary {
    pub(super) fn from_results(results: Vec<RetailerSyncStatus>) -> Self {
        let failed = results
            .iter()
            .filter(|r| r.status == SyncStatus::Failed)
            .count();
        Self {
            message: "sync completed",
            succeeded: results.len() - failed,
            failed,
            results,
        }
    }
}

/// Runs the retailer sync inline and reports per-retailer status. A failed
/// feed never fails the request.
pub(super) async fn trigger_sync(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SyncSummary>> {
    tracing::info!(feeds = state.feeds.len(), "sync requested over HTTP");

    let results = sync_retailers(state.store.as_ref(), &state.feeds, &state.feed_client).await;

    Json(ApiResponse {
        data: SyncSummary::from_results(results),
        meta: ResponseMeta::new(req_id.0),
    })
}
