use axum::{
    extract::{Json, Path},
    http::StatusCode,
};
use contracts::system::users::{ChangePasswordDto, CreateUserDto, UpdateUserDto, User};

use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;
use crate::system::users::service;

/// List all users (director only)
pub async fn list(CurrentUser(_claims): CurrentUser) -> ApiResult<Vec<User>> {
    service::list_all(get_connection())
        .await
        .map(Json)
        .map_err(|e| api_error("List users", e))
}

/// Get user by ID (director only)
pub async fn get_by_id(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<User>, StatusCode> {
    let user = service::get_by_id(get_connection(), &id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user))
}

/// Create user (director only)
pub async fn create(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<CreateUserDto>,
) -> ApiResult<serde_json::Value> {
    let user_id = service::create(get_connection(), dto, Some(claims.sub))
        .await
        .map_err(|e| api_error("Create user", e))?;

    Ok(Json(serde_json::json!({ "id": user_id })))
}

/// Update user (director only)
pub async fn update(
    CurrentUser(_claims): CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<UpdateUserDto>,
) -> Result<StatusCode, ApiError> {
    dto.id = id;

    service::update(get_connection(), dto)
        .await
        .map_err(|e| api_error("Update user", e))?;

    Ok(StatusCode::OK)
}

/// Delete user (director only)
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    if id == claims.sub {
        return Err(StatusCode::CONFLICT);
    }

    let deleted = service::delete(get_connection(), &id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if deleted {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Change password (own, or anyone's for a director)
pub async fn change_password(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(mut dto): Json<ChangePasswordDto>,
) -> Result<StatusCode, ApiError> {
    dto.user_id = id;

    service::change_password(get_connection(), dto, &claims)
        .await
        .map_err(|e| api_error("Change password", e))?;

    Ok(StatusCode::OK)
}
