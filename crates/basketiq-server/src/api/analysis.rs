use axum::{
    extract::{Query, State},
    Extension, Json,
};
use basketiq_analysis::{best_deals, select_candidates, ProductAnalysis};
use basketiq_core::{Product, ProductFilter};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    analyze_products, map_store_error, require_param, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

const DEFAULT_PER_PAGE: usize = 20;
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
pub(super) struct PageQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecommendationQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PaginatedAnalyses {
    items: Vec<ProductAnalysis>,
    page: usize,
    per_page: usize,
    total: usize,
}

/// Resolves `(page, per_page)`: pages start at 1 and `per_page` is clamped
/// to `1..=100`.
pub(super) fn normalize_paging(page: Option<usize>, per_page: Option<usize>) -> (usize, usize) {
    (
        page.unwrap_or(1).max(1),
        per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
    )
}

pub(super) async fn list_predictions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PaginatedAnalyses>>, ApiError> {
    let (page, per_page) = normalize_paging(query.page, query.per_page);

    let products = state
        .store
        .list_products(&ProductFilter::default())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let total = products.len();
    let offset = (page - 1).saturating_mul(per_page);
    let window: Vec<&Product> = products.iter().skip(offset).take(per_page).collect();

    let items = analyze_products(state.store.as_ref(), &window)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: PaginatedAnalyses {
            items,
            page,
            per_page,
            total,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<ApiResponse<Vec<ProductAnalysis>>>, ApiError> {
    let name = require_param(&req_id.0, "name", query.name.as_deref())?;

    let products = state
        .store
        .list_products(&ProductFilter::default())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let candidates: Vec<&Product> = select_candidates(&products, name)
        .into_iter()
        .map(|(product, _)| product)
        .collect();
    tracing::debug!(
        term = %name,
        candidates = candidates.len(),
        "selected recommendation candidates"
    );

    let analyses = analyze_products(state.store.as_ref(), &candidates)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: best_deals(analyses),
        meta: ResponseMeta::new(req_id.0),
    }))
}
