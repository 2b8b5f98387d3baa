use contracts::domain::a003_salesperson::{Salesperson, SalespersonDto, SalespersonId};
use contracts::domain::common::AggregateRoot;
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::access;

/// Руководитель должен существовать, быть активным и не совпадать с самим продавцом
async fn resolve_manager(
    db: &DatabaseConnection,
    raw: &Option<String>,
    self_id: Option<SalespersonId>,
) -> anyhow::Result<Option<SalespersonId>> {
    let Some(manager_id) = parse_optional_id::<SalespersonId>(raw)? else {
        return Ok(None);
    };
    if Some(manager_id) == self_id {
        return Err(ServiceError::validation(
            "A salesperson cannot be their own manager",
        ));
    }
    match repository::get_by_id(db, manager_id).await? {
        Some(manager) if manager.is_active => Ok(Some(manager_id)),
        Some(_) => Err(ServiceError::validation("Manager is inactive")),
        None => Err(ServiceError::validation("Manager does not exist")),
    }
}

/// Создание продавца (только директор)
pub async fn create(
    db: &DatabaseConnection,
    dto: SalespersonDto,
    actor: &TokenClaims,
) -> anyhow::Result<SalespersonId> {
    access::ensure_director(actor, "manage salespeople")?;

    let manager_id = resolve_manager(db, &dto.manager_id, None).await?;
    let mut aggregate = Salesperson::new_for_insert(dto.name, dto.email, dto.role, manager_id);
    aggregate.validate().map_err(ServiceError::validation)?;
    aggregate.before_write();

    let id = repository::insert(db, &aggregate).await?;
    tracing::info!("Created salesperson {} ({})", aggregate.name, id);
    Ok(id)
}

/// Обновление продавца (только директор)
pub async fn update(
    db: &DatabaseConnection,
    id: SalespersonId,
    dto: SalespersonDto,
    actor: &TokenClaims,
) -> anyhow::Result<Salesperson> {
    access::ensure_director(actor, "manage salespeople")?;

    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Salesperson"))?;
    let manager_id = resolve_manager(db, &dto.manager_id, Some(id)).await?;

    aggregate.update(&dto, manager_id);
    aggregate.validate().map_err(ServiceError::validation)?;
    aggregate.before_write();
    repository::update(db, &aggregate).await?;
    Ok(aggregate)
}

async fn set_active(
    db: &DatabaseConnection,
    id: SalespersonId,
    is_active: bool,
    actor: &TokenClaims,
) -> anyhow::Result<Salesperson> {
    access::ensure_director(actor, "manage salespeople")?;

    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Salesperson"))?;
    aggregate.is_active = is_active;
    aggregate.before_write();
    repository::update(db, &aggregate).await?;

    tracing::info!(
        "Salesperson {} is now {}",
        aggregate.name,
        if is_active { "active" } else { "inactive" }
    );
    Ok(aggregate)
}

/// Мягкое удаление
pub async fn deactivate(
    db: &DatabaseConnection,
    id: SalespersonId,
    actor: &TokenClaims,
) -> anyhow::Result<Salesperson> {
    set_active(db, id, false, actor).await
}

pub async fn reactivate(
    db: &DatabaseConnection,
    id: SalespersonId,
    actor: &TokenClaims,
) -> anyhow::Result<Salesperson> {
    set_active(db, id, true, actor).await
}

pub async fn get_by_id(db: &DatabaseConnection, id: SalespersonId) -> anyhow::Result<Salesperson> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Salesperson"))
}

pub async fn list(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> anyhow::Result<Vec<Salesperson>> {
    repository::list(db, include_inactive).await
}

/// Команда руководителя
pub async fn team_of(
    db: &DatabaseConnection,
    manager_id: SalespersonId,
) -> anyhow::Result<Vec<Salesperson>> {
    repository::list_by_manager(db, manager_id).await
}
