use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a006_sales_plan::{PlanReviewRequest, SalesPlan, SalesPlanDto, SalesPlanId};
use serde::Deserialize;

use crate::domain::a006_sales_plan::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, parse_id, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

#[derive(Debug, Default, Deserialize)]
pub struct PlanListQuery {
    pub salesperson_id: Option<String>,
    pub status: Option<String>,
}

/// GET /api/sales_plan
pub async fn list(
    CurrentUser(claims): CurrentUser,
    Query(q): Query<PlanListQuery>,
) -> ApiResult<Vec<SalesPlan>> {
    service::list(get_connection(), q.salesperson_id, q.status, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("List sales plans", e))
}

/// GET /api/sales_plan/:id
pub async fn get_by_id(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<SalesPlan> {
    let id = parse_id::<SalesPlanId>(&id)?;
    service::get_by_id(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Get sales plan", e))
}

/// POST /api/sales_plan
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<SalesPlanDto>,
) -> Result<(StatusCode, Json<SalesPlan>), ApiError> {
    let plan = service::create(get_connection(), dto, &claims)
        .await
        .map_err(|e| api_error("Create sales plan", e))?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /api/sales_plan/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<SalesPlanDto>,
) -> ApiResult<SalesPlan> {
    let id = parse_id::<SalesPlanId>(&id)?;
    service::update(get_connection(), id, dto, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update sales plan", e))
}

/// POST /api/sales_plan/:id/submit
pub async fn submit(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<SalesPlan> {
    let id = parse_id::<SalesPlanId>(&id)?;
    service::submit(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Submit sales plan", e))
}

/// POST /api/sales_plan/:id/approve
pub async fn approve(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(review): Json<PlanReviewRequest>,
) -> ApiResult<SalesPlan> {
    let id = parse_id::<SalesPlanId>(&id)?;
    service::approve(get_connection(), id, review, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Approve sales plan", e))
}

/// POST /api/sales_plan/:id/reject
pub async fn reject(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(review): Json<PlanReviewRequest>,
) -> ApiResult<SalesPlan> {
    let id = parse_id::<SalesPlanId>(&id)?;
    service::reject(get_connection(), id, review, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Reject sales plan", e))
}

/// DELETE /api/sales_plan/:id
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id::<SalesPlanId>(&id)?;
    service::delete(get_connection(), id, &claims)
        .await
        .map_err(|e| api_error("Delete sales plan", e))?;
    Ok(StatusCode::NO_CONTENT)
}
