use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a007_claim::{Claim, ClaimDto, ClaimId, ClaimListQuery};

use crate::domain::a007_claim::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, parse_id, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/claim
pub async fn list(
    CurrentUser(claims): CurrentUser,
    Query(query): Query<ClaimListQuery>,
) -> ApiResult<Vec<Claim>> {
    service::list(get_connection(), query, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("List claims", e))
}

/// GET /api/claim/:id
pub async fn get_by_id(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Claim> {
    let id = parse_id::<ClaimId>(&id)?;
    service::get_by_id(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Get claim", e))
}

/// POST /api/claim
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<ClaimDto>,
) -> Result<(StatusCode, Json<Claim>), ApiError> {
    let claim = service::create(get_connection(), dto, &claims)
        .await
        .map_err(|e| api_error("Create claim", e))?;
    Ok((StatusCode::CREATED, Json(claim)))
}

/// PUT /api/claim/:id
pub async fn update(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<ClaimDto>,
) -> ApiResult<Claim> {
    let id = parse_id::<ClaimId>(&id)?;
    service::update(get_connection(), id, dto, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update claim", e))
}

/// DELETE /api/claim/:id
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id::<ClaimId>(&id)?;
    service::delete(get_connection(), id, &claims)
        .await
        .map_err(|e| api_error("Delete claim", e))?;
    Ok(StatusCode::NO_CONTENT)
}
