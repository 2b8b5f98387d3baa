use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_sales_commission::metrics::deal_preview;
use contracts::domain::a001_sales_commission::{
    DealPreview, EstimateUpdateRequest, SalesCommissionDto, SalesCommissionId,
    SalesCommissionListQuery, SalesCommissionPatch, SalesCommissionView, SaveSplitsRequest,
    SaveSplitsResponse,
};
use serde::Deserialize;

use crate::domain::a001_sales_commission::service::{self, CreateOutcome, UpdateOutcome};
use crate::domain::a001_sales_commission::split_service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, bad_request, parse_id, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/sales_commission
pub async fn list(
    CurrentUser(claims): CurrentUser,
    Query(query): Query<SalesCommissionListQuery>,
) -> ApiResult<Vec<SalesCommissionView>> {
    service::list(get_connection(), query, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("List sales commissions", e))
}

/// GET /api/sales_commission/:id
pub async fn get_by_id(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<SalesCommissionView> {
    let id = parse_id::<SalesCommissionId>(&id)?;
    service::get_by_id(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Get sales commission", e))
}

/// POST /api/sales_commission
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<SalesCommissionDto>,
) -> Result<(StatusCode, Json<CreateOutcome>), ApiError> {
    let outcome = service::create(get_connection(), dto, &claims)
        .await
        .map_err(|e| api_error("Create sales commission", e))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// PATCH /api/sales_commission/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<SalesCommissionPatch>,
) -> ApiResult<UpdateOutcome> {
    let id = parse_id::<SalesCommissionId>(&id)?;
    service::update(get_connection(), id, patch, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update sales commission", e))
}

/// PUT /api/sales_commission/:id/estimate
pub async fn update_estimate(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<EstimateUpdateRequest>,
) -> ApiResult<SalesCommissionView> {
    let id = parse_id::<SalesCommissionId>(&id)?;
    service::update_estimate(get_connection(), id, request, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update estimate", e))
}

/// DELETE /api/sales_commission/:id
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id::<SalesCommissionId>(&id)?;
    service::delete(get_connection(), id, &claims)
        .await
        .map_err(|e| api_error("Delete sales commission", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sales_commission/:id/splits
pub async fn related_splits(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<SalesCommissionView>> {
    let id = parse_id::<SalesCommissionId>(&id)?;
    service::related_splits(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Load split participants", e))
}

/// PUT /api/sales_commission/:id/splits
pub async fn save_splits(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<SaveSplitsRequest>,
) -> ApiResult<SaveSplitsResponse> {
    let id = parse_id::<SalesCommissionId>(&id)?;
    split_service::save_splits(get_connection(), id, request, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Save splits", e))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub initial_estimate: f64,
    pub fee_percentage: f64,
    pub commission_percentage: f64,
    pub split_percentage: Option<f64>,
}

/// GET /api/sales_commission/preview
pub async fn preview(
    CurrentUser(_claims): CurrentUser,
    Query(q): Query<PreviewQuery>,
) -> ApiResult<DealPreview> {
    let values = [q.initial_estimate, q.fee_percentage, q.commission_percentage];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(bad_request("Preview values must be numbers"));
    }
    Ok(Json(deal_preview(
        q.initial_estimate,
        q.fee_percentage,
        q.commission_percentage,
        q.split_percentage.unwrap_or(100.0),
    )))
}
