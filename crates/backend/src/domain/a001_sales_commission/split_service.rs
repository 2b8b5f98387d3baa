//! Сохранение разделения сделки между продавцами.
//!
//! Основная запись получает новую долю P₀, существующие участники обновляются,
//! новые вставляются копией основной записи, а исчезнувшие из диалога
//! удаляются вместе со своими чеками. Все изменения идут одной транзакцией и
//! только после проверки итоговой группы клиента.

use std::collections::HashMap;

use contracts::domain::a001_sales_commission::splits::{plan_split_changes, validate_split_total};
use contracts::domain::a001_sales_commission::{
    SalesCommission, SalesCommissionId, SaveSplitsRequest, SaveSplitsResponse, SplitParticipant,
};
use contracts::domain::common::AggregateRoot;
use contracts::system::auth::TokenClaims;
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::repository;
use super::service::{ensure_salesperson_exists, load};
use crate::domain::a002_commission_check;
use crate::shared::error::ServiceError;
use crate::system::auth::access;

pub async fn save_splits(
    db: &DatabaseConnection,
    id: SalesCommissionId,
    request: SaveSplitsRequest,
    actor: &TokenClaims,
) -> anyhow::Result<SaveSplitsResponse> {
    let mut primary = load(db, id).await?;
    access::ensure_owner(actor, primary.salesperson_id)?;

    let participants = request
        .participants
        .iter()
        .map(SplitParticipant::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::from)?;
    if participants.iter().any(|p| p.id == Some(primary.id)) {
        return Err(ServiceError::validation(
            "The primary record cannot be listed as a split participant",
        ));
    }

    let related: HashMap<SalesCommissionId, SalesCommission> =
        repository::find_by_client(db, &primary.client_name)
            .await?
            .into_iter()
            .filter(|r| r.id != primary.id)
            .map(|r| (r.id, r))
            .collect();
    let previous: Vec<SalesCommissionId> = related.keys().copied().collect();

    let plan = plan_split_changes(request.primary_split_percentage, &previous, &participants)
        .map_err(ServiceError::from)?;

    for update in &plan.updates {
        if !related.contains_key(&update.id) {
            return Err(ServiceError::validation(format!(
                "Record {} is not part of the '{}' deal",
                update.id, primary.client_name
            )));
        }
        if let Some(salesperson_id) = update.salesperson_id {
            ensure_salesperson_exists(db, salesperson_id).await?;
        }
    }
    for insert in &plan.inserts {
        ensure_salesperson_exists(db, insert.salesperson_id).await?;
    }

    // Итоговая группа клиента после применения плана
    let mut final_group: Vec<(&str, f64)> =
        vec![(primary.client_name.as_str(), request.primary_split_percentage)];
    for row in related.values() {
        if plan.deletes.contains(&row.id) {
            continue;
        }
        let pct = plan
            .updates
            .iter()
            .find(|u| u.id == row.id)
            .map(|u| u.split_percentage)
            .unwrap_or(row.split_percentage);
        final_group.push((row.client_name.as_str(), pct));
    }
    for insert in &plan.inserts {
        final_group.push((primary.client_name.as_str(), insert.split_percentage));
    }
    let warnings: Vec<String> = validate_split_total(final_group)
        .map_err(ServiceError::from)?
        .iter()
        .map(ToString::to_string)
        .collect();

    let txn = db.begin().await?;

    primary.split_percentage = request.primary_split_percentage;
    primary.before_write();
    repository::update(&txn, &primary).await?;

    for update in &plan.updates {
        if let Some(existing) = related.get(&update.id) {
            let mut row = existing.clone();
            row.split_percentage = update.split_percentage;
            if let Some(salesperson_id) = update.salesperson_id {
                row.salesperson_id = salesperson_id;
            }
            row.before_write();
            repository::update(&txn, &row).await?;
        }
    }

    for insert in &plan.inserts {
        let mut row = primary.split_copy(insert.salesperson_id, insert.split_percentage);
        row.before_write();
        repository::insert(&txn, &row).await?;
    }

    for delete_id in &plan.deletes {
        a002_commission_check::repository::delete_by_commission(&txn, *delete_id).await?;
        repository::delete(&txn, *delete_id).await?;
    }

    txn.commit().await?;

    tracing::info!(
        "Saved splits for '{}': {} updated, {} inserted, {} deleted",
        primary.client_name,
        plan.updates.len(),
        plan.inserts.len(),
        plan.deletes.len()
    );

    Ok(SaveSplitsResponse {
        updated: plan.updates.len(),
        inserted: plan.inserts.len(),
        deleted: plan.deletes.len(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_sales_commission::service;
    use crate::shared::data::test_support::{director, rep, seed_commission, seed_salesperson, test_db};
    use contracts::domain::a001_sales_commission::SplitParticipantDto;
    use contracts::domain::a003_salesperson::SalespersonId;
    use contracts::domain::common::AggregateId;
    use contracts::enums::SalesRole;

    fn existing(id: SalesCommissionId, pct: f64) -> SplitParticipantDto {
        SplitParticipantDto {
            id: Some(id.as_string()),
            salesperson_id: None,
            split_percentage: pct,
        }
    }

    fn newcomer(salesperson_id: SalespersonId, pct: f64) -> SplitParticipantDto {
        SplitParticipantDto {
            id: None,
            salesperson_id: Some(salesperson_id.as_string()),
            split_percentage: pct,
        }
    }

    #[tokio::test]
    async fn invalid_total_leaves_data_untouched() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let b = seed_salesperson(&db, "Ben", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Ocean Club", 50.0).await;
        let other = seed_commission(&db, b.id, "Ocean Club", 50.0).await;

        let request = SaveSplitsRequest {
            primary_split_percentage: 60.0,
            participants: vec![existing(other.id, 80.0)],
        };
        let err = save_splits(&db, primary.id, request, &director())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Split percentages must total 100% (currently 140%)"
        );

        let reloaded = service::get_by_id(&db, primary.id, &director()).await.unwrap();
        assert_eq!(reloaded.record.split_percentage, 50.0);
        let reloaded = service::get_by_id(&db, other.id, &director()).await.unwrap();
        assert_eq!(reloaded.record.split_percentage, 50.0);
    }

    #[tokio::test]
    async fn three_way_split_updates_inserts_and_deletes() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let b = seed_salesperson(&db, "Ben", SalesRole::SalesRep).await;
        let c = seed_salesperson(&db, "Cal", SalesRole::SalesRep).await;
        let d = seed_salesperson(&db, "Dee", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Marina Bay", 40.0).await;
        let keep = seed_commission(&db, b.id, "Marina Bay", 30.0).await;
        let dropped = seed_commission(&db, c.id, "Marina Bay", 30.0).await;

        let request = SaveSplitsRequest {
            primary_split_percentage: 50.0,
            participants: vec![existing(keep.id, 25.0), newcomer(d.id, 25.0)],
        };
        let response = save_splits(&db, primary.id, request, &director())
            .await
            .unwrap();
        assert_eq!(
            response,
            SaveSplitsResponse {
                updated: 1,
                inserted: 1,
                deleted: 1,
                warnings: vec![],
            }
        );

        let related = service::related_splits(&db, primary.id, &director())
            .await
            .unwrap();
        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|r| r.record.id != dropped.id));
        let inserted = related
            .iter()
            .find(|r| r.record.salesperson_id == d.id)
            .unwrap();
        assert_eq!(inserted.record.split_percentage, 25.0);
        assert_eq!(inserted.record.insurance_checks_ytd, 0.0);
        assert_eq!(inserted.record.initial_estimate, primary.initial_estimate);

        let primary = service::get_by_id(&db, primary.id, &director()).await.unwrap();
        assert_eq!(primary.record.split_percentage, 50.0);
    }

    #[tokio::test]
    async fn empty_participants_remove_all_related() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let b = seed_salesperson(&db, "Ben", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Sunset Palms", 50.0).await;
        seed_commission(&db, b.id, "Sunset Palms", 50.0).await;

        let request = SaveSplitsRequest {
            primary_split_percentage: 100.0,
            participants: vec![],
        };
        let response = save_splits(&db, primary.id, request, &rep(a.id))
            .await
            .unwrap();
        assert_eq!(response.deleted, 1);
        assert!(response.warnings.is_empty());
        assert!(service::related_splits(&db, primary.id, &director())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn foreign_record_is_rejected() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Coral Gables", 50.0).await;
        let stranger = seed_commission(&db, a.id, "Elsewhere", 100.0).await;

        let request = SaveSplitsRequest {
            primary_split_percentage: 50.0,
            participants: vec![existing(stranger.id, 50.0)],
        };
        let err = save_splits(&db, primary.id, request, &director())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn existing_row_can_be_reassigned() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let b = seed_salesperson(&db, "Ben", SalesRole::SalesRep).await;
        let c = seed_salesperson(&db, "Cal", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Bay Harbor", 60.0).await;
        let other = seed_commission(&db, b.id, "Bay Harbor", 40.0).await;

        let mut moved = existing(other.id, 40.0);
        moved.salesperson_id = Some(c.id.as_string());
        let request = SaveSplitsRequest {
            primary_split_percentage: 60.0,
            participants: vec![moved],
        };
        let response = save_splits(&db, primary.id, request, &director())
            .await
            .unwrap();
        assert_eq!(response.updated, 1);
        assert_eq!(response.inserted, 0);

        let reloaded = service::get_by_id(&db, other.id, &director()).await.unwrap();
        assert_eq!(reloaded.record.salesperson_id, c.id);
        assert_eq!(reloaded.record.split_percentage, 40.0);
    }

    #[tokio::test]
    async fn reassigning_to_unknown_salesperson_is_rejected() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let b = seed_salesperson(&db, "Ben", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Bay Harbor", 60.0).await;
        let other = seed_commission(&db, b.id, "Bay Harbor", 40.0).await;

        let mut moved = existing(other.id, 40.0);
        moved.salesperson_id = Some(SalespersonId::new_v4().as_string());
        let request = SaveSplitsRequest {
            primary_split_percentage: 60.0,
            participants: vec![moved],
        };
        let err = save_splits(&db, primary.id, request, &director())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));

        let reloaded = service::get_by_id(&db, other.id, &director()).await.unwrap();
        assert_eq!(reloaded.record.salesperson_id, b.id);
    }

    #[tokio::test]
    async fn rep_cannot_edit_someone_elses_split() {
        let db = test_db().await;
        let a = seed_salesperson(&db, "Ann", SalesRole::SalesRep).await;
        let b = seed_salesperson(&db, "Ben", SalesRole::SalesRep).await;
        let primary = seed_commission(&db, a.id, "Key West Inn", 100.0).await;

        let request = SaveSplitsRequest {
            primary_split_percentage: 100.0,
            participants: vec![],
        };
        let err = save_splits(&db, primary.id, request, &rep(b.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Forbidden(_))
        ));
    }
}
