use serde::{Deserialize, Serialize};

use crate::domain::a003_salesperson::aggregate::SalespersonId;
use crate::domain::common::{AggregateRoot, EntityMetadata};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор цели продаж
    SalesGoalId
);

/// Годовая цель продавца. Одна на пару (продавец, год).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesGoal {
    pub id: SalesGoalId,
    pub salesperson_id: SalespersonId,
    pub year: i32,
    pub target_revenue: f64,
    pub target_deals: i32,
    pub target_commission: f64,
    pub notes: Option<String>,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl SalesGoal {
    pub fn new_for_insert(salesperson_id: SalespersonId, dto: &SalesGoalDto) -> Self {
        Self {
            id: SalesGoalId::new_v4(),
            salesperson_id,
            year: dto.year,
            target_revenue: dto.target_revenue,
            target_deals: dto.target_deals,
            target_commission: dto.target_commission,
            notes: dto.notes.clone(),
            metadata: EntityMetadata::new(),
        }
    }

    pub fn update(&mut self, dto: &SalesGoalDto) {
        self.target_revenue = dto.target_revenue;
        self.target_deals = dto.target_deals;
        self.target_commission = dto.target_commission;
        self.notes = dto.notes.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(2000..=2100).contains(&self.year) {
            return Err(format!("Year {} is out of range", self.year));
        }
        if self.target_revenue < 0.0 || self.target_commission < 0.0 || self.target_deals < 0 {
            return Err("Targets cannot be negative".into());
        }
        Ok(())
    }
}

impl AggregateRoot for SalesGoal {
    type Id = SalesGoalId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a005"
    }

    fn collection_name() -> &'static str {
        "sales_goal"
    }

    fn element_name() -> &'static str {
        "Sales goal"
    }

    fn list_name() -> &'static str {
        "Sales goals"
    }
}

/// DTO цели (upsert по продавцу и году)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesGoalDto {
    pub salesperson_id: Option<String>,
    pub year: i32,
    pub target_revenue: f64,
    pub target_deals: i32,
    pub target_commission: f64,
    pub notes: Option<String>,
}

/// Выполнение цели за год
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal: SalesGoal,
    pub actual_revenue: f64,
    pub actual_deals: i32,
    pub actual_commission: f64,
    pub revenue_attainment: f64,
    pub deals_attainment: f64,
    pub commission_attainment: f64,
}

impl GoalProgress {
    pub fn new(goal: SalesGoal, actual_revenue: f64, actual_deals: i32, actual_commission: f64) -> Self {
        let revenue_attainment = attainment(actual_revenue, goal.target_revenue);
        let deals_attainment = attainment(actual_deals as f64, goal.target_deals as f64);
        let commission_attainment = attainment(actual_commission, goal.target_commission);
        Self {
            goal,
            actual_revenue,
            actual_deals,
            actual_commission,
            revenue_attainment,
            deals_attainment,
            commission_attainment,
        }
    }
}

/// Процент выполнения; 0 при нулевой цели. Сверху не ограничен.
pub fn attainment(actual: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    actual / target * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attainment_percentages() {
        let dto = SalesGoalDto {
            year: 2025,
            target_revenue: 1_000_000.0,
            target_deals: 20,
            target_commission: 5600.0,
            ..Default::default()
        };
        let goal = SalesGoal::new_for_insert(SalespersonId::new_v4(), &dto);
        let progress = GoalProgress::new(goal, 1_250_000.0, 10, 2800.0);
        assert_eq!(progress.revenue_attainment, 125.0);
        assert_eq!(progress.deals_attainment, 50.0);
        assert_eq!(progress.commission_attainment, 50.0);
        assert_eq!(attainment(10.0, 0.0), 0.0);
    }
}
