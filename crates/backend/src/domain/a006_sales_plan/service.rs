use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a006_sales_plan::{PlanReviewRequest, SalesPlan, SalesPlanDto, SalesPlanId};
use contracts::domain::common::AggregateRoot;
use contracts::enums::ApprovalStatus;
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::domain::a001_sales_commission::service::ensure_salesperson_exists;
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::access;

async fn load(db: &DatabaseConnection, id: SalesPlanId) -> anyhow::Result<SalesPlan> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Sales plan"))
}

async fn save(db: &DatabaseConnection, plan: &mut SalesPlan) -> anyhow::Result<()> {
    plan.before_write();
    repository::update(db, plan).await
}

pub async fn create(
    db: &DatabaseConnection,
    dto: SalesPlanDto,
    actor: &TokenClaims,
) -> anyhow::Result<SalesPlan> {
    let requested = parse_optional_id::<SalespersonId>(&dto.salesperson_id)?;
    let owner = access::resolve_owner(actor, requested)?;
    ensure_salesperson_exists(db, owner).await?;

    let mut plan = SalesPlan::new_for_insert(owner, &dto);
    plan.validate().map_err(ServiceError::validation)?;
    plan.before_write();
    repository::insert(db, &plan).await?;

    tracing::info!("Created sales plan {} for {} ({})", plan.id, owner, plan.plan_year);
    Ok(plan)
}

/// Редактирование черновика или отклоненного плана
pub async fn update(
    db: &DatabaseConnection,
    id: SalesPlanId,
    dto: SalesPlanDto,
    actor: &TokenClaims,
) -> anyhow::Result<SalesPlan> {
    let mut plan = load(db, id).await?;
    access::ensure_owner(actor, plan.salesperson_id)?;

    plan.update(&dto).map_err(ServiceError::conflict)?;
    plan.validate().map_err(ServiceError::validation)?;
    save(db, &mut plan).await?;
    Ok(plan)
}

pub async fn submit(
    db: &DatabaseConnection,
    id: SalesPlanId,
    actor: &TokenClaims,
) -> anyhow::Result<SalesPlan> {
    let mut plan = load(db, id).await?;
    access::ensure_owner(actor, plan.salesperson_id)?;

    plan.submit().map_err(ServiceError::conflict)?;
    save(db, &mut plan).await?;

    tracing::info!("Sales plan {} submitted by {}", plan.id, actor.username);
    Ok(plan)
}

pub async fn approve(
    db: &DatabaseConnection,
    id: SalesPlanId,
    review: PlanReviewRequest,
    actor: &TokenClaims,
) -> anyhow::Result<SalesPlan> {
    access::ensure_director(actor, "approve sales plans")?;
    let mut plan = load(db, id).await?;

    plan.approve(&actor.username, review.comment)
        .map_err(ServiceError::conflict)?;
    save(db, &mut plan).await?;

    tracing::info!("Sales plan {} approved by {}", plan.id, actor.username);
    Ok(plan)
}

pub async fn reject(
    db: &DatabaseConnection,
    id: SalesPlanId,
    review: PlanReviewRequest,
    actor: &TokenClaims,
) -> anyhow::Result<SalesPlan> {
    access::ensure_director(actor, "reject sales plans")?;
    let mut plan = load(db, id).await?;

    plan.reject(&actor.username, review.comment)
        .map_err(ServiceError::conflict)?;
    save(db, &mut plan).await?;

    tracing::info!("Sales plan {} rejected by {}", plan.id, actor.username);
    Ok(plan)
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    id: SalesPlanId,
    actor: &TokenClaims,
) -> anyhow::Result<SalesPlan> {
    let plan = load(db, id).await?;
    access::ensure_owner(actor, plan.salesperson_id)?;
    Ok(plan)
}

pub async fn list(
    db: &DatabaseConnection,
    salesperson_id: Option<String>,
    status: Option<String>,
    actor: &TokenClaims,
) -> anyhow::Result<Vec<SalesPlan>> {
    let requested = parse_optional_id::<SalespersonId>(&salesperson_id)?;
    let scope = access::scope_salesperson(actor, requested)?;
    let status = match status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => Some(ApprovalStatus::from_code(code).ok_or_else(|| {
            ServiceError::validation(format!("Unknown approval status '{}'", code))
        })?),
        None => None,
    };
    repository::list(db, scope, status).await
}

/// Менеджер удаляет только неотправленные планы, директор любые
pub async fn delete(
    db: &DatabaseConnection,
    id: SalesPlanId,
    actor: &TokenClaims,
) -> anyhow::Result<()> {
    let plan = load(db, id).await?;
    access::ensure_owner(actor, plan.salesperson_id)?;
    if !actor.is_director() && !plan.approval_status.is_editable() {
        return Err(ServiceError::conflict(format!(
            "Plan cannot be deleted while {}",
            plan.approval_status
        )));
    }

    repository::delete(db, id).await?;
    tracing::info!("Deleted sales plan {}", id);
    Ok(())
}
