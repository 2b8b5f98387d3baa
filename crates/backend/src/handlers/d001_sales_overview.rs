use axum::{extract::Query, Json};
use contracts::dashboards::d001_sales_overview::{SalesOverviewRequest, SalesOverviewResponse};

use crate::dashboards::d001_sales_overview::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, ApiResult};
use crate::system::auth::extractor::CurrentUser;

/// GET /api/d001/sales_overview?year=2024&salesperson_id=..
pub async fn get_sales_overview(
    CurrentUser(claims): CurrentUser,
    Query(request): Query<SalesOverviewRequest>,
) -> ApiResult<SalesOverviewResponse> {
    service::get_sales_overview(get_connection(), request, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Sales overview", e))
}
