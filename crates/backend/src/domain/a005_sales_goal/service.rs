use contracts::domain::a001_sales_commission::SalesCommission;
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a005_sales_goal::{GoalProgress, SalesGoal, SalesGoalDto, SalesGoalId};
use contracts::domain::common::AggregateRoot;
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::domain::a001_sales_commission::{self, repository::ListFilter};
use crate::domain::a001_sales_commission::service::ensure_salesperson_exists;
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::access;

/// Фактические показатели продавца за год: сумма пересмотренных оценок,
/// количество сделок и заработанная комиссия
pub fn actuals(records: &[SalesCommission]) -> (f64, i32, f64) {
    records.iter().fold((0.0, 0, 0.0), |(revenue, deals, commission), r| {
        (
            revenue + r.revised(),
            deals + 1,
            commission + r.figures().commission_earned,
        )
    })
}

/// Создать или обновить цель продавца на год
pub async fn upsert(
    db: &DatabaseConnection,
    dto: SalesGoalDto,
    actor: &TokenClaims,
) -> anyhow::Result<SalesGoal> {
    let requested = parse_optional_id::<SalespersonId>(&dto.salesperson_id)?;
    let owner = access::resolve_owner(actor, requested)?;
    ensure_salesperson_exists(db, owner).await?;

    match repository::find(db, owner, dto.year).await? {
        Some(mut goal) => {
            goal.update(&dto);
            goal.validate().map_err(ServiceError::validation)?;
            goal.before_write();
            repository::update(db, &goal).await?;
            tracing::info!("Updated sales goal {} ({}, {})", goal.id, owner, goal.year);
            Ok(goal)
        }
        None => {
            let mut goal = SalesGoal::new_for_insert(owner, &dto);
            goal.validate().map_err(ServiceError::validation)?;
            goal.before_write();
            repository::insert(db, &goal).await?;
            tracing::info!("Created sales goal {} ({}, {})", goal.id, owner, goal.year);
            Ok(goal)
        }
    }
}

pub async fn get_by_id(
    db: &DatabaseConnection,
    id: SalesGoalId,
    actor: &TokenClaims,
) -> anyhow::Result<SalesGoal> {
    let goal = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Sales goal"))?;
    access::ensure_owner(actor, goal.salesperson_id)?;
    Ok(goal)
}

pub async fn list(
    db: &DatabaseConnection,
    salesperson_id: Option<String>,
    year: Option<i32>,
    actor: &TokenClaims,
) -> anyhow::Result<Vec<SalesGoal>> {
    let requested = parse_optional_id::<SalespersonId>(&salesperson_id)?;
    let scope = access::scope_salesperson(actor, requested)?;
    repository::list(db, scope, year).await
}

pub async fn delete(
    db: &DatabaseConnection,
    id: SalesGoalId,
    actor: &TokenClaims,
) -> anyhow::Result<()> {
    let goal = get_by_id(db, id, actor).await?;
    repository::delete(db, goal.id).await?;
    tracing::info!("Deleted sales goal {}", id);
    Ok(())
}

/// Выполнение цели продавца за год
pub async fn goal_progress(
    db: &DatabaseConnection,
    salesperson_id: SalespersonId,
    year: i32,
    actor: &TokenClaims,
) -> anyhow::Result<GoalProgress> {
    access::ensure_owner(actor, salesperson_id)?;

    let goal = repository::find(db, salesperson_id, year)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Sales goal for {}", year)))?;

    let filter = ListFilter {
        salesperson_id: Some(salesperson_id),
        year: Some(year),
        ..Default::default()
    };
    let records = a001_sales_commission::repository::list(db, &filter).await?;
    let (revenue, deals, commission) = actuals(&records);

    Ok(GoalProgress::new(goal, revenue, deals, commission))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, rep, seed_commission, seed_salesperson, test_db};
    use contracts::domain::common::AggregateId;
    use contracts::enums::SalesRole;

    fn goal_dto(salesperson_id: SalespersonId, revenue: f64) -> SalesGoalDto {
        SalesGoalDto {
            salesperson_id: Some(salesperson_id.as_string()),
            year: 2024,
            target_revenue: revenue,
            target_deals: 4,
            target_commission: 1000.0,
            notes: None,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_one_goal_per_year() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;

        let first = upsert(&db, goal_dto(dana.id, 400000.0), &director())
            .await
            .unwrap();
        let second = upsert(&db, goal_dto(dana.id, 500000.0), &rep(dana.id))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.target_revenue, 500000.0);

        let goals = list(&db, None, Some(2024), &director()).await.unwrap();
        assert_eq!(goals.len(), 1);
    }

    #[tokio::test]
    async fn progress_compares_targets_with_actuals() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        upsert(&db, goal_dto(dana.id, 400000.0), &director())
            .await
            .unwrap();
        seed_commission(&db, dana.id, "Alpha", 100.0).await;
        seed_commission(&db, dana.id, "Beta", 100.0).await;

        let progress = goal_progress(&db, dana.id, 2024, &rep(dana.id))
            .await
            .unwrap();
        assert_eq!(progress.actual_revenue, 200000.0);
        assert_eq!(progress.actual_deals, 2);
        assert_eq!(progress.revenue_attainment, 50.0);
        assert_eq!(progress.deals_attainment, 50.0);
        assert_eq!(progress.actual_commission, 0.0);
    }

    #[tokio::test]
    async fn reps_cannot_set_goals_for_others() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;
        let eli = seed_salesperson(&db, "Eli", SalesRole::SalesRep).await;

        let err = upsert(&db, goal_dto(eli.id, 1.0), &rep(dana.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Forbidden(_))
        ));
    }
}
