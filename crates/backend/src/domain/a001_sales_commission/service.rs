use contracts::domain::a001_sales_commission::splits::{
    client_key, plan_split_changes, validate_split_total,
};
use contracts::domain::a001_sales_commission::{
    EstimateUpdateRequest, SalesCommission, SalesCommissionDto, SalesCommissionId,
    SalesCommissionListQuery, SalesCommissionPatch, SalesCommissionView, SplitParticipant,
};
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::common::AggregateRoot;
use contracts::system::auth::TokenClaims;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;

use super::repository::{self, ListFilter};
use crate::domain::{a002_commission_check, a003_salesperson};
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::access;

/// Результат добавления сделки
#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    pub id: SalesCommissionId,
    /// Записи участников разделения, созданные вместе со сделкой
    pub participant_ids: Vec<SalesCommissionId>,
    pub warnings: Vec<String>,
}

/// Результат частичного обновления
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub commission: SalesCommissionView,
    pub warnings: Vec<String>,
}

pub(crate) async fn ensure_salesperson_exists(
    db: &DatabaseConnection,
    id: SalespersonId,
) -> anyhow::Result<()> {
    match a003_salesperson::repository::get_by_id(db, id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::validation(format!(
            "Salesperson {} does not exist",
            id
        ))),
    }
}

pub(crate) async fn load(
    db: &DatabaseConnection,
    id: SalesCommissionId,
) -> anyhow::Result<SalesCommission> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Sales commission"))
}

/// Проверка группы клиента: существующие записи (кроме `replaced`) плюс новые
async fn validate_client_group(
    db: &DatabaseConnection,
    client_name: &str,
    replaced: &[SalesCommissionId],
    new_rows: &[&SalesCommission],
) -> anyhow::Result<Vec<String>> {
    let existing = repository::find_by_client(db, client_name).await?;
    let rows = existing
        .iter()
        .filter(|r| !replaced.contains(&r.id))
        .chain(new_rows.iter().copied())
        .map(|r| (r.client_name.as_str(), r.split_percentage));

    let warnings = validate_split_total(rows).map_err(ServiceError::from)?;
    Ok(warnings.iter().map(ToString::to_string).collect())
}

/// Добавление сделки, вместе с участниками разделения, в одной транзакции
pub async fn create(
    db: &DatabaseConnection,
    dto: SalesCommissionDto,
    actor: &TokenClaims,
) -> anyhow::Result<CreateOutcome> {
    let requested = parse_optional_id::<SalespersonId>(&dto.salesperson_id)?;
    let owner = access::resolve_owner(actor, requested)?;
    ensure_salesperson_exists(db, owner).await?;

    let mut record = SalesCommission::new_for_insert(&dto, owner);
    record.validate().map_err(ServiceError::validation)?;

    let participants = dto
        .split_participants
        .iter()
        .map(SplitParticipant::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::from)?;
    if participants.iter().any(|p| p.id.is_some()) {
        return Err(ServiceError::validation(
            "Participants of a new deal cannot reference existing records",
        ));
    }
    let plan = plan_split_changes(record.split_percentage, &[], &participants)
        .map_err(ServiceError::from)?;

    let mut split_rows = Vec::with_capacity(plan.inserts.len());
    for insert in &plan.inserts {
        ensure_salesperson_exists(db, insert.salesperson_id).await?;
        split_rows.push(record.split_copy(insert.salesperson_id, insert.split_percentage));
    }

    let new_rows: Vec<&SalesCommission> = std::iter::once(&record).chain(split_rows.iter()).collect();
    let warnings = validate_client_group(db, &record.client_name, &[], &new_rows).await?;

    record.before_write();
    let txn = db.begin().await?;
    repository::insert(&txn, &record).await?;
    for row in split_rows.iter_mut() {
        row.before_write();
        repository::insert(&txn, row).await?;
    }
    txn.commit().await?;

    tracing::info!(
        "Created sales commission {} for '{}' ({} split participants)",
        record.id,
        record.client_name,
        split_rows.len()
    );

    Ok(CreateOutcome {
        id: record.id,
        participant_ids: split_rows.iter().map(|r| r.id).collect(),
        warnings,
    })
}

/// Частичное обновление записи.
///
/// При смене клиента проверяются обе группы: новая (с этой записью) и
/// прежняя (без нее).
pub async fn update(
    db: &DatabaseConnection,
    id: SalesCommissionId,
    patch: SalesCommissionPatch,
    actor: &TokenClaims,
) -> anyhow::Result<UpdateOutcome> {
    let mut record = load(db, id).await?;
    access::ensure_owner(actor, record.salesperson_id)?;

    let previous_client = record.client_name.clone();
    record.apply_patch(&patch);
    record.validate().map_err(ServiceError::validation)?;

    let mut warnings = Vec::new();
    if client_key(&record.client_name) != client_key(&previous_client) {
        warnings.extend(validate_client_group(db, &record.client_name, &[record.id], &[&record]).await?);
        warnings.extend(validate_client_group(db, &previous_client, &[record.id], &[]).await?);
    }

    record.before_write();
    repository::update(db, &record).await?;
    Ok(UpdateOutcome {
        commission: record.into(),
        warnings,
    })
}

/// Диалог пересмотра оценки
pub async fn update_estimate(
    db: &DatabaseConnection,
    id: SalesCommissionId,
    request: EstimateUpdateRequest,
    actor: &TokenClaims,
) -> anyhow::Result<SalesCommissionView> {
    if !request.revised_estimate.is_finite() || request.revised_estimate < 0.0 {
        return Err(ServiceError::validation(
            "Revised estimate must be a non-negative amount",
        ));
    }

    let mut record = load(db, id).await?;
    access::ensure_owner(actor, record.salesperson_id)?;

    record.revise_estimate(request.revised_estimate);
    record.before_write();
    repository::update(db, &record).await?;

    tracing::info!(
        "Revised estimate of {} to {} (old remainder {}, new remainder {})",
        record.id,
        request.revised_estimate,
        record.old_remainder,
        record.new_remainder
    );
    Ok(record.into())
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    id: SalesCommissionId,
    actor: &TokenClaims,
) -> anyhow::Result<SalesCommissionView> {
    let record = load(db, id).await?;
    access::ensure_owner(actor, record.salesperson_id)?;
    Ok(record.into())
}

pub async fn list(
    db: &DatabaseConnection,
    query: SalesCommissionListQuery,
    actor: &TokenClaims,
) -> anyhow::Result<Vec<SalesCommissionView>> {
    let requested = parse_optional_id::<SalespersonId>(&query.salesperson_id)?;
    let filter = ListFilter {
        salesperson_id: access::scope_salesperson(actor, requested)?,
        year: query.year,
        status: query.status,
        client: query.client,
    };
    let items = repository::list(db, &filter).await?;
    Ok(items.into_iter().map(Into::into).collect())
}

/// Другие записи того же клиента (доли других продавцов)
pub async fn related_splits(
    db: &DatabaseConnection,
    id: SalesCommissionId,
    actor: &TokenClaims,
) -> anyhow::Result<Vec<SalesCommissionView>> {
    let record = load(db, id).await?;
    access::ensure_owner(actor, record.salesperson_id)?;

    let related = repository::find_by_client(db, &record.client_name).await?;
    Ok(related
        .into_iter()
        .filter(|r| r.id != record.id)
        .map(Into::into)
        .collect())
}

/// Удаление записи вместе с ее чеками
pub async fn delete(
    db: &DatabaseConnection,
    id: SalesCommissionId,
    actor: &TokenClaims,
) -> anyhow::Result<()> {
    let record = load(db, id).await?;
    access::ensure_owner(actor, record.salesperson_id)?;

    let txn = db.begin().await?;
    let checks = a002_commission_check::repository::delete_by_commission(&txn, id).await?;
    repository::delete(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(
        "Deleted sales commission {} ('{}') and {} checks",
        id,
        record.client_name,
        checks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, rep, seed_commission, seed_salesperson, test_db};
    use contracts::domain::a001_sales_commission::SplitParticipantDto;
    use contracts::domain::common::AggregateId;
    use contracts::enums::{CommissionStatus, SalesRole};

    fn deal(client: &str, salesperson_id: SalespersonId) -> SalesCommissionDto {
        SalesCommissionDto {
            client_name: client.to_string(),
            salesperson_id: Some(salesperson_id.as_string()),
            year: 2024,
            initial_estimate: 200000.0,
            fee_percentage: 7.0,
            commission_percentage: 8.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_defaults_revised_and_split() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;

        let outcome = create(&db, deal("Palm Court", dana.id), &director())
            .await
            .unwrap();
        assert!(outcome.warnings.is_empty());

        let view = get_by_id(&db, outcome.id, &director()).await.unwrap();
        assert_eq!(view.record.revised_estimate, Some(200000.0));
        assert_eq!(view.record.split_percentage, 100.0);
        assert_eq!(view.record.new_remainder, 200000.0);
        assert_eq!(view.record.status, CommissionStatus::Open);
        assert!((view.figures.projected_total_commission - 1120.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn create_with_participants_in_one_go() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;

        let mut dto = deal("Harbor Point", dana.id);
        dto.split_percentage = Some(60.0);
        dto.split_participants = vec![SplitParticipantDto {
            id: None,
            salesperson_id: Some(eli.id.as_string()),
            split_percentage: 40.0,
        }];

        let outcome = create(&db, dto, &director()).await.unwrap();
        assert_eq!(outcome.participant_ids.len(), 1);

        let related = related_splits(&db, outcome.id, &director()).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].record.salesperson_id, eli.id);
        assert_eq!(related[0].record.split_percentage, 40.0);
    }

    #[tokio::test]
    async fn create_rejects_bad_participant_total() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;

        let mut dto = deal("Harbor Point", dana.id);
        dto.split_percentage = Some(60.0);
        dto.split_participants = vec![SplitParticipantDto {
            id: None,
            salesperson_id: Some(eli.id.as_string()),
            split_percentage: 30.0,
        }];

        let err = create(&db, dto, &director()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Split percentages must total 100% (currently 90%)"
        );
        assert!(list(&db, Default::default(), &director()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_client_group_overflow() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        seed_commission(&db, dana.id, "Seaside Villas", 100.0).await;

        let err = create(&db, deal("seaside villas ", dana.id), &director())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn client_groups_match_non_ascii_names_case_insensitively() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        seed_commission(&db, dana.id, "ÉCOLE DU NORD", 100.0).await;

        let found = repository::find_by_client(&db, "  école du nord").await.unwrap();
        assert_eq!(found.len(), 1);

        let err = create(&db, deal("école du nord", dana.id), &director())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn moving_a_row_out_of_a_group_keeps_the_group_valid() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;
        let fay = seed_salesperson(&db, "Fay", SalesRole::SalesRep).await;
        seed_commission(&db, dana.id, "Trio", 50.0).await;
        seed_commission(&db, eli.id, "Trio", 25.0).await;
        let moved = seed_commission(&db, fay.id, "Trio", 25.0).await;

        let patch = SalesCommissionPatch {
            client_name: Some("Elsewhere".into()),
            ..Default::default()
        };
        let err = update(&db, moved.id, patch, &director()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));

        let trio = repository::find_by_client(&db, "Trio").await.unwrap();
        assert_eq!(trio.len(), 3);
        let view = get_by_id(&db, moved.id, &director()).await.unwrap();
        assert_eq!(view.record.client_name, "Trio");
    }

    #[tokio::test]
    async fn moving_a_row_reports_warnings_for_the_remaining_owner() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;
        seed_commission(&db, dana.id, "Duo", 60.0).await;
        let moved = seed_commission(&db, eli.id, "Duo", 40.0).await;

        let patch = SalesCommissionPatch {
            client_name: Some("Solo Estate".into()),
            ..Default::default()
        };
        let outcome = update(&db, moved.id, patch, &director()).await.unwrap();
        assert_eq!(outcome.commission.record.client_name, "Solo Estate");
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[tokio::test]
    async fn single_owner_not_hundred_is_a_warning() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let mut dto = deal("Lone Oak", dana.id);
        dto.split_percentage = Some(50.0);

        let outcome = create(&db, dto, &director()).await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn estimate_update_tracks_remainders() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let record = seed_commission(&db, dana.id, "Bayfront", 100.0).await;

        let view = update_estimate(
            &db,
            record.id,
            EstimateUpdateRequest {
                revised_estimate: 150000.0,
            },
            &rep(dana.id),
        )
        .await
        .unwrap();
        assert_eq!(view.record.old_remainder, 100000.0);
        assert_eq!(view.record.new_remainder, 150000.0);
        assert!((view.record.percent_change - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn reps_only_see_their_own_deals() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;
        seed_commission(&db, dana.id, "Client A", 100.0).await;
        let other = seed_commission(&db, eli.id, "Client B", 100.0).await;

        let mine = list(&db, Default::default(), &rep(dana.id)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].record.client_name, "Client A");

        let err = get_by_id(&db, other.id, &rep(dana.id)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Forbidden(_))
        ));

        let err = create(&db, deal("Client C", eli.id), &rep(dana.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_client_and_year() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        seed_commission(&db, dana.id, "Coral Towers", 100.0).await;
        seed_commission(&db, dana.id, "Pine Ridge", 100.0).await;

        let query = SalesCommissionListQuery {
            client: Some("coral".into()),
            year: Some(2024),
            ..Default::default()
        };
        let found = list(&db, query, &director()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.client_name, "Coral Towers");
    }

    #[tokio::test]
    async fn patch_rederives_figures() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let record = seed_commission(&db, dana.id, "Gulf Breeze", 100.0).await;

        let patch = SalesCommissionPatch {
            revised_estimate: Some(80000.0),
            status: Some(CommissionStatus::Closed),
            ..Default::default()
        };
        let outcome = update(&db, record.id, patch, &director()).await.unwrap();
        assert!(outcome.warnings.is_empty());
        let view = outcome.commission;
        assert_eq!(view.record.status, CommissionStatus::Closed);
        assert!((view.record.percent_change + 20.0).abs() < 1e-9);
        assert_eq!(view.record.new_remainder, 80000.0);
        assert_eq!(view.record.metadata.version, record.metadata.version + 1);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let record = seed_commission(&db, dana.id, "Gone Soon", 100.0).await;

        delete(&db, record.id, &director()).await.unwrap();
        let err = get_by_id(&db, record.id, &director()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound(_))
        ));
    }
}
