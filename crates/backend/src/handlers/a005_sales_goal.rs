use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a005_sales_goal::{GoalProgress, SalesGoal, SalesGoalDto, SalesGoalId};
use serde::Deserialize;

use crate::domain::a005_sales_goal::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, parse_id, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

#[derive(Debug, Default, Deserialize)]
pub struct GoalListQuery {
    pub salesperson_id: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub salesperson_id: String,
    pub year: i32,
}

/// GET /api/sales_goal
pub async fn list(
    CurrentUser(claims): CurrentUser,
    Query(q): Query<GoalListQuery>,
) -> ApiResult<Vec<SalesGoal>> {
    service::list(get_connection(), q.salesperson_id, q.year, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("List sales goals", e))
}

/// GET /api/sales_goal/:id
pub async fn get_by_id(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<SalesGoal> {
    let id = parse_id::<SalesGoalId>(&id)?;
    service::get_by_id(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Get sales goal", e))
}

/// POST /api/sales_goal (создает или обновляет цель на год)
pub async fn upsert(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<SalesGoalDto>,
) -> ApiResult<SalesGoal> {
    service::upsert(get_connection(), dto, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Save sales goal", e))
}

/// DELETE /api/sales_goal/:id
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id::<SalesGoalId>(&id)?;
    service::delete(get_connection(), id, &claims)
        .await
        .map_err(|e| api_error("Delete sales goal", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sales_goal/progress?salesperson_id=..&year=..
pub async fn progress(
    CurrentUser(claims): CurrentUser,
    Query(q): Query<ProgressQuery>,
) -> ApiResult<GoalProgress> {
    let salesperson_id = parse_id::<SalespersonId>(&q.salesperson_id)?;
    service::goal_progress(get_connection(), salesperson_id, q.year, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Goal progress", e))
}
