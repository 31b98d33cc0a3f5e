//! # Sale Routes
//!
//! The sale ledger plus the two shift views the register screen polls:
//! the payment-method summary and the list of sales in the current window.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use mostrador_core::validation::validate_limit;
use mostrador_core::{
    NewSale, Sale, SaleDetailsPatch, SaleStatus, SaleWithItems, ShiftSummary, ValidationError,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::{LimitQuery, DEFAULT_LIMIT};
use crate::state::AppState;

/// `GET /api/sales` filters. `from`/`to` default to today's local day.
#[derive(Debug, Default, Deserialize)]
pub struct ListSalesQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<SaleStatus>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: SaleStatus,
}

/// `GET /api/sales/summary`
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<ShiftSummary>> {
    let summary = state.reconciler.daily_summary(Utc::now()).await?;
    Ok(Json(summary))
}

/// `GET /api/sales/shift?limit=`
pub async fn shift(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let limit = validate_limit(query.limit, DEFAULT_LIMIT)?;
    let sales = state.reconciler.shift_sales(Utc::now(), limit).await?;
    Ok(Json(sales))
}

/// `GET /api/sales?from=&to=&status=&limit=`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListSalesQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let limit = validate_limit(query.limit, DEFAULT_LIMIT)?;

    let clock = state.clock();
    let (day_start, day_end) = clock.day_bounds(clock.local_date(Utc::now()));
    let from = query.from.unwrap_or(day_start);
    let to = query.to.unwrap_or(day_end);
    if from >= to {
        return Err(ValidationError::InvalidFormat {
            field: "from".to_string(),
            reason: "must be before to".to_string(),
        }
        .into());
    }

    debug!(%from, %to, status = ?query.status, "list sales");
    let sales = state.db.sales().list_between(from, to, query.status, limit).await?;
    Ok(Json(sales))
}

/// `POST /api/sales`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewSale>,
) -> ApiResult<(StatusCode, Json<SaleWithItems>)> {
    let sale = state.db.sales().create(&req, &state.clock(), Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /api/sales/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleWithItems>> {
    state
        .db
        .sales()
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

/// `PATCH /api/sales/{id}/details`
pub async fn update_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<SaleDetailsPatch>,
) -> ApiResult<Json<Sale>> {
    let sale = state.db.sales().update_details(&id, &patch, Utc::now()).await?;
    Ok(Json(sale))
}

/// `POST /api/sales/{id}/status`
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(change): ApiJson<StatusChange>,
) -> ApiResult<Json<Sale>> {
    let sale = state.db.sales().change_status(&id, change.status, Utc::now()).await?;
    Ok(Json(sale))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, send};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn create_product(app: &axum::Router, sku: &str, stock: i64) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/products",
            Some(json!({
                "sku": sku,
                "name": "Café Santo Domingo 500g",
                "priceCents": 10000,
                "initialStock": stock
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    fn sale_body(product_id: &str, quantity: i64, method: &str) -> Value {
        json!({
            "sellerId": "maria",
            "paymentMethod": method,
            "lines": [{ "productId": product_id, "quantity": quantity }]
        })
    }

    #[tokio::test]
    async fn test_create_and_fetch_sale() {
        let (app, _) = app().await;
        let product_id = create_product(&app, "CAFE-500", 5).await;

        let (status, body) =
            send(&app, Method::POST, "/api/sales", Some(sale_body(&product_id, 2, "card"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "paid");
        assert_eq!(body["totalCents"], 23600);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert!(body["invoiceNumber"].as_str().unwrap().starts_with("FACT-"));
        let sale_id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::GET, &format!("/api/sales/{sale_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["quantity"], 2);

        let (status, body) = send(&app, Method::GET, "/api/sales/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["breakdown"]["cardCents"], 23600);
        assert_eq!(body["window"]["source"], "localMidnight");

        let (status, body) = send(&app, Method::GET, "/api/sales/shift", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, "/api/sales?status=paid", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_a_conflict() {
        let (app, _) = app().await;
        let product_id = create_product(&app, "CAFE-500", 1).await;

        let (status, body) =
            send(&app, Method::POST, "/api/sales", Some(sale_body(&product_id, 3, "cash"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");

        let (status, body) = send(&app, Method::GET, "/api/sales", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_change_and_details_patch() {
        let (app, _) = app().await;
        let product_id = create_product(&app, "CAFE-500", 5).await;

        let (_, body) =
            send(&app, Method::POST, "/api/sales", Some(sale_body(&product_id, 1, "cash"))).await;
        let sale_id = body["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/sales/{sale_id}/details"),
            Some(json!({ "customerInfo": "RNC 101-00000-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customerInfo"], "RNC 101-00000-1");
        assert_eq!(body["totalCents"], 11800);

        let uri = format!("/api/sales/{sale_id}/status");
        let (status, body) =
            send(&app, Method::POST, &uri, Some(json!({ "status": "refunded" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "refunded");

        let (status, body) =
            send(&app, Method::POST, &uri, Some(json!({ "status": "paid" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let (status, body) = send(&app, Method::GET, &format!("/api/products/{product_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentStock"], 5);
    }

    #[tokio::test]
    async fn test_oversized_free_sale_price_is_rejected() {
        let (app, _) = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/sales",
            Some(json!({
                "sellerId": "maria",
                "paymentMethod": "cash",
                "lines": [{
                    "productId": mostrador_core::FREE_SALE_PRODUCT_ID,
                    "quantity": 3,
                    "unitPriceCents": i64::MAX / 2
                }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(&app, Method::GET, "/api/sales", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_sale_and_bad_range() {
        let (app, _) = app().await;

        let (status, body) = send(&app, Method::GET, "/api/sales/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/sales?from=2026-10-20T00:00:00Z&to=2026-10-19T00:00:00Z",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/sales?status=lost", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
