use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_sales_commission::{SalesCommissionId, SalesCommissionView};
use contracts::domain::a002_commission_check::{
    CommissionCheck, CommissionCheckDto, CommissionCheckId,
};

use crate::domain::a002_commission_check::service::{self, CheckOutcome};
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, parse_id, ApiError, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/sales_commission/:id/checks
pub async fn list_for_commission(
    CurrentUser(claims): CurrentUser,
    Path(commission_id): Path<String>,
) -> ApiResult<Vec<CommissionCheck>> {
    let commission_id = parse_id::<SalesCommissionId>(&commission_id)?;
    service::list_for_commission(get_connection(), commission_id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("List checks", e))
}

/// POST /api/sales_commission/:id/checks
pub async fn record_check(
    CurrentUser(claims): CurrentUser,
    Path(commission_id): Path<String>,
    Json(dto): Json<CommissionCheckDto>,
) -> Result<(StatusCode, Json<CheckOutcome>), ApiError> {
    let commission_id = parse_id::<SalesCommissionId>(&commission_id)?;
    let outcome = service::record_check(get_connection(), commission_id, dto, &claims)
        .await
        .map_err(|e| api_error("Record check", e))?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// PUT /api/commission_check/:id
pub async fn update_check(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<CommissionCheckDto>,
) -> ApiResult<CheckOutcome> {
    let id = parse_id::<CommissionCheckId>(&id)?;
    service::update_check(get_connection(), id, dto, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Update check", e))
}

/// DELETE /api/commission_check/:id
pub async fn delete_check(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<SalesCommissionView> {
    let id = parse_id::<CommissionCheckId>(&id)?;
    service::delete_check(get_connection(), id, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Delete check", e))
}
