use contracts::domain::a001_sales_commission::metrics::format_currency;
use contracts::domain::a001_sales_commission::{SalesCommissionId, SalesCommissionView};
use contracts::domain::a002_commission_check::{
    CommissionCheck, CommissionCheckDto, CommissionCheckId,
};
use contracts::domain::common::AggregateRoot;
use contracts::system::auth::TokenClaims;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;

use super::repository;
use crate::domain::a001_sales_commission;
use crate::shared::error::ServiceError;
use crate::system::auth::access;

/// Чек и обновленная родительская запись
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub check: CommissionCheck,
    pub commission: SalesCommissionView,
}

async fn load(db: &DatabaseConnection, id: CommissionCheckId) -> anyhow::Result<CommissionCheck> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Commission check"))
}

pub async fn list_for_commission(
    db: &DatabaseConnection,
    commission_id: SalesCommissionId,
    actor: &TokenClaims,
) -> anyhow::Result<Vec<CommissionCheck>> {
    let parent = a001_sales_commission::service::load(db, commission_id).await?;
    access::ensure_owner(actor, parent.salesperson_id)?;
    repository::list_by_commission(db, commission_id).await
}

/// Ввод полученного чека: комиссия считается по текущим процентам записи,
/// сумма и комиссия добавляются к агрегатам родителя
pub async fn record_check(
    db: &DatabaseConnection,
    commission_id: SalesCommissionId,
    dto: CommissionCheckDto,
    actor: &TokenClaims,
) -> anyhow::Result<CheckOutcome> {
    let mut parent = a001_sales_commission::service::load(db, commission_id).await?;
    access::ensure_owner(actor, parent.salesperson_id)?;

    let mut check = CommissionCheck::record(&parent, &dto);
    check.validate().map_err(ServiceError::validation)?;

    let delta = check.delta();
    parent.apply_check_delta(delta.amount, delta.commission);
    parent.before_write();
    check.before_write();

    let txn = db.begin().await?;
    repository::insert(&txn, &check).await?;
    a001_sales_commission::repository::update(&txn, &parent).await?;
    txn.commit().await?;

    tracing::info!(
        "Recorded check {} on {}: amount {}, commission {}",
        check.id,
        parent.id,
        format_currency(check.check_amount),
        format_currency(check.commission_earned)
    );

    Ok(CheckOutcome {
        check,
        commission: parent.into(),
    })
}

/// Исправление чека: к родителю применяется только разница
pub async fn update_check(
    db: &DatabaseConnection,
    id: CommissionCheckId,
    dto: CommissionCheckDto,
    actor: &TokenClaims,
) -> anyhow::Result<CheckOutcome> {
    let mut check = load(db, id).await?;
    let mut parent = a001_sales_commission::service::load(db, check.sales_commission_id).await?;
    access::ensure_owner(actor, parent.salesperson_id)?;

    let delta = check.apply_edit(&parent, &dto);
    check.validate().map_err(ServiceError::validation)?;

    parent.apply_check_delta(delta.amount, delta.commission);
    parent.before_write();
    check.before_write();

    let txn = db.begin().await?;
    repository::update(&txn, &check).await?;
    a001_sales_commission::repository::update(&txn, &parent).await?;
    txn.commit().await?;

    Ok(CheckOutcome {
        check,
        commission: parent.into(),
    })
}

/// Удаление чека с откатом его вклада в родителя
pub async fn delete_check(
    db: &DatabaseConnection,
    id: CommissionCheckId,
    actor: &TokenClaims,
) -> anyhow::Result<SalesCommissionView> {
    let check = load(db, id).await?;
    let mut parent = a001_sales_commission::service::load(db, check.sales_commission_id).await?;
    access::ensure_owner(actor, parent.salesperson_id)?;

    let delta = check.delta().reversed();
    parent.apply_check_delta(delta.amount, delta.commission);
    parent.before_write();

    let txn = db.begin().await?;
    repository::delete(&txn, id).await?;
    a001_sales_commission::repository::update(&txn, &parent).await?;
    txn.commit().await?;

    tracing::info!("Deleted check {} from {}", id, parent.id);
    Ok(parent.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, rep, seed_commission, seed_salesperson, test_db};
    use chrono::NaiveDate;
    use contracts::enums::SalesRole;

    fn check(amount: f64) -> CommissionCheckDto {
        CommissionCheckDto {
            check_amount: amount,
            received_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            deposited_date: None,
            check_number: Some("4411".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn recording_a_check_updates_parent() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        // 100000 estimate, fee 10%, commission 10%, split 50%
        let parent = seed_commission(&db, dana.id, "Bayside", 50.0).await;

        let outcome = record_check(&db, parent.id, check(40000.0), &rep(dana.id))
            .await
            .unwrap();
        assert_eq!(outcome.check.commission_earned, 200.0);
        assert_eq!(outcome.commission.record.insurance_checks_ytd, 40000.0);
        assert_eq!(outcome.commission.record.commissions_paid, 200.0);
        assert_eq!(outcome.commission.record.new_remainder, 60000.0);
        assert!((outcome.commission.figures.collection_progress - 40.0).abs() < 1e-9);

        let listed = list_for_commission(&db, parent.id, &director()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].check_number.as_deref(), Some("4411"));
    }

    #[tokio::test]
    async fn editing_applies_only_the_difference() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let parent = seed_commission(&db, dana.id, "Bayside", 100.0).await;

        let first = record_check(&db, parent.id, check(10000.0), &director())
            .await
            .unwrap();
        record_check(&db, parent.id, check(5000.0), &director())
            .await
            .unwrap();

        let outcome = update_check(&db, first.check.id, check(20000.0), &director())
            .await
            .unwrap();
        assert_eq!(outcome.commission.record.insurance_checks_ytd, 25000.0);
        assert!((outcome.commission.record.commissions_paid - 250.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn deleting_reverses_contribution() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let parent = seed_commission(&db, dana.id, "Bayside", 100.0).await;

        let outcome = record_check(&db, parent.id, check(30000.0), &director())
            .await
            .unwrap();
        let view = delete_check(&db, outcome.check.id, &director()).await.unwrap();
        assert_eq!(view.record.insurance_checks_ytd, 0.0);
        assert_eq!(view.record.commissions_paid, 0.0);
        assert_eq!(view.record.new_remainder, 100000.0);
        assert!(list_for_commission(&db, parent.id, &director())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn rejects_zero_amount_and_foreign_records() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;
        let parent = seed_commission(&db, dana.id, "Bayside", 100.0).await;

        let err = record_check(&db, parent.id, check(0.0), &director())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));

        let err = record_check(&db, parent.id, check(100.0), &rep(eli.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Forbidden(_))
        ));
    }
}
