use axum::{
    extract::{Path, Query},
    Json,
};
use contracts::domain::a003_salesperson::{Salesperson, SalespersonDto, SalespersonId};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a003_salesperson::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/salesperson
pub async fn list(
    CurrentUser(_claims): CurrentUser,
    Query(q): Query<ListQuery>,
) -> ApiResult<Vec<Salesperson>> {
    service::list(get_connection(), q.include_inactive)
        .await
        .map(Json)
        .map_err(|e| api_error("List salespeople", e))
}

/// GET /api/salesperson/:id
pub async fn get_by_id(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Salesperson> {
    let id = parse_id::<SalespersonId>(&id)?;
    service::get_by_id(get_connection(), id)
        .await
        .map(Json)
        .map_err(|e| api_error("Get salesperson", e))
}

/// GET /api/salesperson/:id/team
pub async fn team(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<Salesperson>> {
    let id = parse_id::<SalespersonId>(&id)?;
    service::team_of(get_connection(), id)
        .await
        .map(Json)
        .map_err(|e| api_error("List team", e))
}

/// POST /api/salesperson
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<SalespersonDto>,
) -> ApiResult<serde_json::Value> {
    let id = service::create(get_connection(), dto, &claims)
        .await
        .map_err(|e| api_error("Create salesperson", e))?;
    Ok(Json(json!({ "id": id })))
}

/// PUT /api/salesperson/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<SalespersonDto>,
) -> ApiResult<Salesperson> {
    let id = parse_id::<SalespersonId>(&id)?;
    service::update(get_connection(), id, dto, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update salesperson", e))
}

/// POST /api/salesperson/:id/deactivate
pub async fn deactivate(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Salesperson> {
    let id = parse_id::<SalespersonId>(&id)?;
    service::deactivate(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Deactivate salesperson", e))
}

/// POST /api/salesperson/:id/reactivate
pub async fn reactivate(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Salesperson> {
    let id = parse_id::<SalespersonId>(&id)?;
    service::reactivate(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Reactivate salesperson", e))
}
