use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    system::api::routes::configure_system_routes().merge(business_routes())
}

/// Бизнес-роуты: все требуют аутентификации
fn business_routes() -> Router {
    Router::new()
        // ========================================
        // A001 SALES COMMISSION
        // ========================================
        .route(
            "/api/sales_commission",
            get(handlers::a001_sales_commission::list).post(handlers::a001_sales_commission::create),
        )
        .route(
            "/api/sales_commission/preview",
            get(handlers::a001_sales_commission::preview),
        )
        .route(
            "/api/sales_commission/:id",
            get(handlers::a001_sales_commission::get_by_id)
                .patch(handlers::a001_sales_commission::update)
                .delete(handlers::a001_sales_commission::delete),
        )
        .route(
            "/api/sales_commission/:id/estimate",
            put(handlers::a001_sales_commission::update_estimate),
        )
        .route(
            "/api/sales_commission/:id/splits",
            get(handlers::a001_sales_commission::related_splits)
                .put(handlers::a001_sales_commission::save_splits),
        )
        // A002 Commission checks
        .route(
            "/api/sales_commission/:id/checks",
            get(handlers::a002_commission_check::list_for_commission)
                .post(handlers::a002_commission_check::record_check),
        )
        .route(
            "/api/commission_check/:id",
            put(handlers::a002_commission_check::update_check)
                .delete(handlers::a002_commission_check::delete_check),
        )
        // ========================================
        // A003 SALESPERSON / A004 ADJUSTER
        // ========================================
        .route(
            "/api/salesperson",
            get(handlers::a003_salesperson::list).post(handlers::a003_salesperson::create),
        )
        .route(
            "/api/salesperson/:id",
            get(handlers::a003_salesperson::get_by_id).put(handlers::a003_salesperson::update),
        )
        .route(
            "/api/salesperson/:id/team",
            get(handlers::a003_salesperson::team),
        )
        .route(
            "/api/salesperson/:id/deactivate",
            post(handlers::a003_salesperson::deactivate),
        )
        .route(
            "/api/salesperson/:id/reactivate",
            post(handlers::a003_salesperson::reactivate),
        )
        .route(
            "/api/adjuster",
            get(handlers::a004_adjuster::list).post(handlers::a004_adjuster::create),
        )
        .route(
            "/api/adjuster/:id",
            get(handlers::a004_adjuster::get_by_id).put(handlers::a004_adjuster::update),
        )
        .route(
            "/api/adjuster/:id/deactivate",
            post(handlers::a004_adjuster::deactivate),
        )
        .route(
            "/api/adjuster/:id/reactivate",
            post(handlers::a004_adjuster::reactivate),
        )
        // ========================================
        // A005 GOALS / A006 PLANS
        // ========================================
        .route(
            "/api/sales_goal",
            get(handlers::a005_sales_goal::list).post(handlers::a005_sales_goal::upsert),
        )
        .route(
            "/api/sales_goal/progress",
            get(handlers::a005_sales_goal::progress),
        )
        .route(
            "/api/sales_goal/:id",
            get(handlers::a005_sales_goal::get_by_id).delete(handlers::a005_sales_goal::delete),
        )
        .route(
            "/api/sales_plan",
            get(handlers::a006_sales_plan::list).post(handlers::a006_sales_plan::create),
        )
        .route(
            "/api/sales_plan/:id",
            get(handlers::a006_sales_plan::get_by_id)
                .put(handlers::a006_sales_plan::update)
                .delete(handlers::a006_sales_plan::delete),
        )
        .route(
            "/api/sales_plan/:id/submit",
            post(handlers::a006_sales_plan::submit),
        )
        .route(
            "/api/sales_plan/:id/approve",
            post(handlers::a006_sales_plan::approve),
        )
        .route(
            "/api/sales_plan/:id/reject",
            post(handlers::a006_sales_plan::reject),
        )
        // ========================================
        // A007 CLAIMS
        // ========================================
        .route(
            "/api/claim",
            get(handlers::a007_claim::list).post(handlers::a007_claim::create),
        )
        .route(
            "/api/claim/:id",
            get(handlers::a007_claim::get_by_id)
                .put(handlers::a007_claim::update)
                .delete(handlers::a007_claim::delete),
        )
        // ========================================
        // DASHBOARDS / USECASES
        // ========================================
        .route(
            "/api/d001/sales_overview",
            get(handlers::d001_sales_overview::get_sales_overview),
        )
        .route(
            "/api/u001/import",
            post(handlers::u001_import_commissions::import_rows),
        )
        .route(
            "/api/u001/import/csv",
            post(handlers::u001_import_commissions::import_csv),
        )
        .route_layer(middleware::from_fn(
            system::auth::middleware::require_auth,
        ))
}
