//! # HTTP Routes
//!
//! ```text
//! /health                              liveness + database check
//! /api/register/…                      open, close, current shift, history
//! /api/sales/…                         ledger, daily summary, shift sales
//! /api/products/…                      catalog search and maintenance
//! ```
//!
//! Handlers read the clock once (`Utc::now()`) and pass the instant down,
//! so one request sees one "now".

use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;

use crate::state::AppState;

pub mod health;
pub mod products;
pub mod register;
pub mod sales;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;

/// `?limit=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/register/current", get(register::current))
        .route("/api/register/open", post(register::open))
        .route("/api/register/close", post(register::close))
        .route("/api/register/sessions", get(register::sessions))
        .route("/api/register/sessions/{id}", get(register::session))
        .route("/api/sales", get(sales::list).post(sales::create))
        .route("/api/sales/summary", get(sales::summary))
        .route("/api/sales/shift", get(sales::shift))
        .route("/api/sales/{id}", get(sales::get))
        .route("/api/sales/{id}/details", patch(sales::update_details))
        .route("/api/sales/{id}/status", post(sales::change_status))
        .route("/api/products", get(products::search).post(products::create))
        .route("/api/products/free-sale", get(products::free_sale))
        .route("/api/products/{id}", get(products::get))
        .route("/api/products/{id}/stock", post(products::adjust_stock))
        .with_state(state)
}
