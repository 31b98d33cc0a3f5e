//! # Product Routes
//!
//! Catalog lookups for the sale screen and minimal maintenance (create,
//! stock adjustment). The free-sale placeholder is only reachable through
//! its own endpoint, never through search.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mostrador_core::validation::validate_limit;
use mostrador_core::{NewProduct, Product};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::DEFAULT_LIMIT;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}

/// `GET /api/products?q=&limit=`
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let limit = validate_limit(query.limit, DEFAULT_LIMIT)?;
    let products = state.db.products().search(&query.q, limit).await?;
    Ok(Json(products))
}

/// `GET /api/products/free-sale`
pub async fn free_sale(State(state): State<AppState>) -> ApiResult<Json<Product>> {
    let product = state.db.products().free_sale_product().await?;
    Ok(Json(product))
}

/// `GET /api/products/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().insert(&req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `POST /api/products/{id}/stock`
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .adjust_stock(&id, adjustment.delta, Utc::now())
        .await?;
    Ok(Json(product))
}
