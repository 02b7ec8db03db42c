use axum::{
    extract::{Query, State},
    Extension, Json,
};
use basketiq_analysis::{group_by_keyword, group_by_specs, ProductGroup};
use basketiq_core::{BaseUnit, Category, Product, ProductFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_store_error, require_param, ApiError, ApiResponse, AppState, ResponseMeta, HISTORY_WINDOW,
};

#[derive(Debug, Serialize)]
pub(super) struct HistoryPoint {
    date: DateTime<Utc>,
    price: f64,
    unit_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ComparedProduct {
    id: i64,
    name: String,
    retailer: String,
    price: f64,
    rating: Option<f64>,
    /// Unit price from the most recent observation.
    unit_price: Option<f64>,
    base_unit: Option<BaseUnit>,
    image_url: Option<String>,
    url: String,
    badge: Option<String>,
    /// Oldest first.
    price_history: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareQuery {
    pub name: Option<String>,
    pub retailer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GroupQuery {
    pub category: Option<String>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SimilarGroup {
    size: usize,
    products: Vec<Product>,
}

pub(super) async fn compare_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<Vec<ComparedProduct>>>, ApiError> {
    let name = require_param(&req_id.0, "name", query.name.as_deref())?;

    let filter = ProductFilter {
        retailer: query
            .retailer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(ToOwned::to_owned),
        name_contains: Some(name.to_string()),
        ..ProductFilter::default()
    };
    let mut products = state
        .store
        .list_products(&filter)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    if products.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "no matching products found",
        ));
    }

    products.sort_by(|a, b| a.current_price.total_cmp(&b.current_price));

    let mut data = Vec::with_capacity(products.len());
    for product in products {
        let history = state
            .store
            .recent_price_history(product.id, HISTORY_WINDOW)
            .await
            .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

        data.push(ComparedProduct {
            id: product.id,
            unit_price: history.last().and_then(|h| h.unit_price),
            price_history: history
                .into_iter()
                .map(|h| HistoryPoint {
                    date: h.valid_from,
                    price: h.price,
                    unit_price: h.unit_price,
                })
                .collect(),
            name: product.name,
            retailer: product.retailer_name,
            price: product.current_price,
            rating: product.rating,
            base_unit: product.base_unit,
            image_url: product.image_url,
            url: product.url,
            badge: product.badges,
        });
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn group_filter(request_id: &str, query: &GroupQuery) -> Result<ProductFilter, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))?;

    Ok(ProductFilter {
        category,
        min_rating: query.min_rating,
        ..ProductFilter::default()
    })
}

pub(super) async fn grouped_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<ApiResponse<Vec<ProductGroup>>>, ApiError> {
    let filter = group_filter(&req_id.0, &query)?;
    let products = state
        .store
        .list_products(&filter)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let data = group_by_keyword(&products, &state.group_rules);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn similar_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<ApiResponse<Vec<SimilarGroup>>>, ApiError> {
    let filter = group_filter(&req_id.0, &query)?;
    let products = state
        .store
        .list_products(&filter)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    let data = group_by_specs(&products)
        .into_iter()
        .map(|group| SimilarGroup {
            size: group.len(),
            products: group.into_iter().cloned().collect(),
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
