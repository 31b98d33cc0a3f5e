//! # Register Routes
//!
//! Open, close and inspect the shared cash drawer. All reconciliation
//! logic lives in [`mostrador_db::ShiftReconciler`]; these handlers only
//! translate HTTP.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mostrador_core::validation::validate_limit;
use mostrador_core::{CashRegisterSession, CloseRegister, CloseReport, OpenRegister, RegisterState};
use tracing::debug;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::{LimitQuery, DEFAULT_LIMIT};
use crate::state::AppState;

/// `GET /api/register/current`
pub async fn current(State(state): State<AppState>) -> ApiResult<Json<RegisterState>> {
    debug!("current register status");
    let status = state.reconciler.current_status(Utc::now()).await?;
    Ok(Json(status))
}

/// `POST /api/register/open`
pub async fn open(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OpenRegister>,
) -> ApiResult<(StatusCode, Json<CashRegisterSession>)> {
    let session = state.reconciler.open_register(&req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /api/register/close`
pub async fn close(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CloseRegister>,
) -> ApiResult<Json<CloseReport>> {
    let report = state.reconciler.close_register(&req, Utc::now()).await?;
    Ok(Json(report))
}

/// `GET /api/register/sessions?limit=`
pub async fn sessions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Json<Vec<CashRegisterSession>>> {
    let limit = validate_limit(query.limit, DEFAULT_LIMIT)?;
    let sessions = state.reconciler.session_history(limit).await?;
    Ok(Json(sessions))
}

/// `GET /api/register/sessions/{id}`
pub async fn session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CashRegisterSession>> {
    let session = state.reconciler.session(&id).await?;
    Ok(Json(session))
}
