use axum::{
    extract::{Path, Query},
    Json,
};
use contracts::domain::a004_adjuster::{Adjuster, AdjusterDto, AdjusterId};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a004_adjuster::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, parse_id, ApiResult};
use crate::system::auth::extractor::CurrentUser;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/adjuster
pub async fn list(
    CurrentUser(_claims): CurrentUser,
    Query(q): Query<ListQuery>,
) -> ApiResult<Vec<Adjuster>> {
    service::list(get_connection(), q.include_inactive)
        .await
        .map(Json)
        .map_err(|e| api_error("List adjusters", e))
}

/// GET /api/adjuster/:id
pub async fn get_by_id(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Adjuster> {
    let id = parse_id::<AdjusterId>(&id)?;
    service::get_by_id(get_connection(), id)
        .await
        .map(Json)
        .map_err(|e| api_error("Get adjuster", e))
}

/// POST /api/adjuster
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<AdjusterDto>,
) -> ApiResult<serde_json::Value> {
    let id = service::create(get_connection(), dto, &claims)
        .await
        .map_err(|e| api_error("Create adjuster", e))?;
    Ok(Json(json!({ "id": id })))
}

/// PUT /api/adjuster/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<AdjusterDto>,
) -> ApiResult<Adjuster> {
    let id = parse_id::<AdjusterId>(&id)?;
    service::update(get_connection(), id, dto, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update adjuster", e))
}

/// POST /api/adjuster/:id/deactivate
pub async fn deactivate(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Adjuster> {
    let id = parse_id::<AdjusterId>(&id)?;
    service::deactivate(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Deactivate adjuster", e))
}

/// POST /api/adjuster/:id/reactivate
pub async fn reactivate(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Adjuster> {
    let id = parse_id::<AdjusterId>(&id)?;
    service::reactivate(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Reactivate adjuster", e))
}
