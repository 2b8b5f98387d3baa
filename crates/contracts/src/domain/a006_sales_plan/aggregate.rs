use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a003_salesperson::aggregate::SalespersonId;
use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::enums::ApprovalStatus;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор плана продаж
    SalesPlanId
);

/// План продаж на год с согласованием у директора
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPlan {
    pub id: SalesPlanId,
    pub salesperson_id: SalespersonId,
    pub plan_year: i32,
    pub target_revenue: f64,
    pub target_deals: i32,
    pub target_commission: f64,
    pub strategy_notes: Option<String>,

    pub approval_status: ApprovalStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub review_comment: Option<String>,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl SalesPlan {
    pub fn new_for_insert(salesperson_id: SalespersonId, dto: &SalesPlanDto) -> Self {
        Self {
            id: SalesPlanId::new_v4(),
            salesperson_id,
            plan_year: dto.plan_year,
            target_revenue: dto.target_revenue,
            target_deals: dto.target_deals,
            target_commission: dto.target_commission,
            strategy_notes: dto.strategy_notes.clone(),
            approval_status: ApprovalStatus::Draft,
            submitted_at: None,
            approved_at: None,
            approved_by: None,
            review_comment: None,
            metadata: EntityMetadata::new(),
        }
    }

    /// Редактирование разрешено только в draft/rejected
    pub fn update(&mut self, dto: &SalesPlanDto) -> Result<(), String> {
        if !self.approval_status.is_editable() {
            return Err(format!(
                "Plan cannot be edited while {}",
                self.approval_status
            ));
        }
        self.plan_year = dto.plan_year;
        self.target_revenue = dto.target_revenue;
        self.target_deals = dto.target_deals;
        self.target_commission = dto.target_commission;
        self.strategy_notes = dto.strategy_notes.clone();
        Ok(())
    }

    fn transition(&mut self, next: ApprovalStatus) -> Result<(), String> {
        if !self.approval_status.can_transition_to(next) {
            return Err(format!(
                "Cannot move plan from {} to {}",
                self.approval_status, next
            ));
        }
        self.approval_status = next;
        Ok(())
    }

    pub fn submit(&mut self) -> Result<(), String> {
        self.transition(ApprovalStatus::Submitted)?;
        self.submitted_at = Some(Utc::now());
        self.approved_at = None;
        self.approved_by = None;
        Ok(())
    }

    pub fn approve(&mut self, approved_by: &str, comment: Option<String>) -> Result<(), String> {
        self.transition(ApprovalStatus::Approved)?;
        self.approved_at = Some(Utc::now());
        self.approved_by = Some(approved_by.to_string());
        self.review_comment = comment;
        Ok(())
    }

    pub fn reject(&mut self, rejected_by: &str, comment: Option<String>) -> Result<(), String> {
        self.transition(ApprovalStatus::Rejected)?;
        self.approved_at = None;
        self.approved_by = Some(rejected_by.to_string());
        self.review_comment = comment;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(2000..=2100).contains(&self.plan_year) {
            return Err(format!("Plan year {} is out of range", self.plan_year));
        }
        if self.target_revenue < 0.0 || self.target_commission < 0.0 || self.target_deals < 0 {
            return Err("Targets cannot be negative".into());
        }
        Ok(())
    }
}

impl AggregateRoot for SalesPlan {
    type Id = SalesPlanId;

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
        "a006"
    }

    fn collection_name() -> &'static str {
        "sales_plan"
    }

    fn element_name() -> &'static str {
        "Sales plan"
    }

    fn list_name() -> &'static str {
        "Sales plans"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesPlanDto {
    pub id: Option<String>,
    pub salesperson_id: Option<String>,
    pub plan_year: i32,
    pub target_revenue: f64,
    pub target_deals: i32,
    pub target_commission: f64,
    pub strategy_notes: Option<String>,
}

/// Решение директора по плану
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanReviewRequest {
    pub comment: Option<String>,
}
