use contracts::domain::a004_adjuster::{Adjuster, AdjusterDto, AdjusterId};
use contracts::domain::common::AggregateRoot;
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::ServiceError;
use crate::system::auth::access;

pub async fn create(
    db: &DatabaseConnection,
    dto: AdjusterDto,
    actor: &TokenClaims,
) -> anyhow::Result<AdjusterId> {
    access::ensure_director(actor, "manage adjusters")?;

    let mut aggregate = Adjuster::new_for_insert(dto.name, dto.office);
    aggregate.validate().map_err(ServiceError::validation)?;
    aggregate.before_write();
    repository::insert(db, &aggregate).await
}

pub async fn update(
    db: &DatabaseConnection,
    id: AdjusterId,
    dto: AdjusterDto,
    actor: &TokenClaims,
) -> anyhow::Result<Adjuster> {
    access::ensure_director(actor, "manage adjusters")?;

    let mut aggregate = get_by_id(db, id).await?;
    aggregate.update(&dto);
    aggregate.validate().map_err(ServiceError::validation)?;
    aggregate.before_write();
    repository::update(db, &aggregate).await?;
    Ok(aggregate)
}

async fn set_active(
    db: &DatabaseConnection,
    id: AdjusterId,
    is_active: bool,
    actor: &TokenClaims,
) -> anyhow::Result<Adjuster> {
    access::ensure_director(actor, "manage adjusters")?;

    let mut aggregate = get_by_id(db, id).await?;
    aggregate.is_active = is_active;
    aggregate.before_write();
    repository::update(db, &aggregate).await?;
    Ok(aggregate)
}

/// Удаление только мягкое
pub async fn deactivate(
    db: &DatabaseConnection,
    id: AdjusterId,
    actor: &TokenClaims,
) -> anyhow::Result<Adjuster> {
    set_active(db, id, false, actor).await
}

pub async fn reactivate(
    db: &DatabaseConnection,
    id: AdjusterId,
    actor: &TokenClaims,
) -> anyhow::Result<Adjuster> {
    set_active(db, id, true, actor).await
}

pub async fn get_by_id(db: &DatabaseConnection, id: AdjusterId) -> anyhow::Result<Adjuster> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Adjuster"))
}

pub async fn list(db: &DatabaseConnection, include_inactive: bool) -> anyhow::Result<Vec<Adjuster>> {
    repository::list(db, include_inactive).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, test_db};

    fn dto(name: &str) -> AdjusterDto {
        AdjusterDto {
            id: None,
            name: name.to_string(),
            office: Some("Tampa".to_string()),
        }
    }

    #[tokio::test]
    async fn deactivate_and_reactivate() {
        let db = test_db().await;
        let zed = create(&db, dto("Zed Ortiz"), &director()).await.unwrap();
        create(&db, dto("Ada Park"), &director()).await.unwrap();

        let names: Vec<String> = list(&db, false)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Ada Park", "Zed Ortiz"]);

        deactivate(&db, zed, &director()).await.unwrap();
        assert_eq!(list(&db, false).await.unwrap().len(), 1);
        assert_eq!(list(&db, true).await.unwrap().len(), 2);

        reactivate(&db, zed, &director()).await.unwrap();
        assert_eq!(list(&db, false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn name_is_required() {
        let db = test_db().await;
        let err = create(&db, dto("  "), &director()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }
}
