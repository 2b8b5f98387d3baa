use serde::{Deserialize, Serialize};

use crate::domain::a001_sales_commission::metrics::CommissionFigures;
use crate::domain::a001_sales_commission::SalesCommission;
use crate::domain::a005_sales_goal::aggregate::attainment;

/// Request for the sales overview dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOverviewRequest {
    pub year: i32,
    /// Restrict to one salesperson (reps are always restricted to themselves)
    pub salesperson_id: Option<String>,
}

/// Response for the sales overview dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOverviewResponse {
    pub year: i32,
    /// One row per salesperson with deals in the year, ordered by name
    pub rows: Vec<SalespersonSummary>,
    /// Team totals row (salesperson_id = None)
    pub totals: SalespersonSummary,
}

/// Aggregated figures of one salesperson (or the whole team)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalespersonSummary {
    pub salesperson_id: Option<String>,
    pub salesperson_name: String,
    pub deal_count: i32,
    pub total_initial_estimate: f64,
    pub total_revised_estimate: f64,
    pub checks_received: f64,
    pub fee_earned: f64,
    pub commission_earned: f64,
    pub commissions_paid: f64,
    pub commission_owed: f64,
    pub pending_commission: f64,
    /// Mean of per-deal collection progress, percent
    pub average_collection_progress: f64,
    /// Goal attainment, filled when a goal exists for the year
    pub revenue_attainment: Option<f64>,
    pub deals_attainment: Option<f64>,
    pub commission_attainment: Option<f64>,
}

impl SalespersonSummary {
    pub fn new(salesperson_id: Option<String>, salesperson_name: impl Into<String>) -> Self {
        Self {
            salesperson_id,
            salesperson_name: salesperson_name.into(),
            ..Default::default()
        }
    }

    /// Add one deal to the summary
    pub fn add(&mut self, record: &SalesCommission) {
        let figures = CommissionFigures::from_record(record);
        let previous = self.deal_count as f64;

        self.deal_count += 1;
        self.total_initial_estimate += record.initial_estimate;
        self.total_revised_estimate += record.revised();
        self.checks_received += record.insurance_checks_ytd;
        self.fee_earned += figures.fee_earned_so_far;
        self.commission_earned += figures.commission_earned;
        self.commissions_paid += record.commissions_paid;
        self.commission_owed += figures.commission_owed;
        self.pending_commission += figures.pending_commission;
        self.average_collection_progress = (self.average_collection_progress * previous
            + figures.collection_progress)
            / self.deal_count as f64;
    }

    /// Merge another summary into this one (used for the totals row)
    pub fn merge(&mut self, other: &SalespersonSummary) {
        let total = self.deal_count + other.deal_count;
        if total > 0 {
            self.average_collection_progress = (self.average_collection_progress
                * self.deal_count as f64
                + other.average_collection_progress * other.deal_count as f64)
                / total as f64;
        }
        self.deal_count = total;
        self.total_initial_estimate += other.total_initial_estimate;
        self.total_revised_estimate += other.total_revised_estimate;
        self.checks_received += other.checks_received;
        self.fee_earned += other.fee_earned;
        self.commission_earned += other.commission_earned;
        self.commissions_paid += other.commissions_paid;
        self.commission_owed += other.commission_owed;
        self.pending_commission += other.pending_commission;
    }

    pub fn apply_goal(&mut self, target_revenue: f64, target_deals: i32, target_commission: f64) {
        self.revenue_attainment = Some(attainment(self.total_revised_estimate, target_revenue));
        self.deals_attainment = Some(attainment(self.deal_count as f64, target_deals as f64));
        self.commission_attainment = Some(attainment(self.commission_earned, target_commission));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_sales_commission::SalesCommissionDto;
    use crate::domain::a003_salesperson::SalespersonId;

    fn deal(initial: f64, checks: f64) -> SalesCommission {
        let dto = SalesCommissionDto {
            client_name: "Client".into(),
            year: 2025,
            initial_estimate: initial,
            insurance_checks_ytd: Some(checks),
            fee_percentage: 10.0,
            commission_percentage: 10.0,
            ..Default::default()
        };
        SalesCommission::new_for_insert(&dto, SalespersonId::new_v4())
    }

    #[test]
    fn summary_accumulates_deals() {
        let mut summary = SalespersonSummary::new(None, "Dana");
        summary.add(&deal(100000.0, 50000.0));
        summary.add(&deal(100000.0, 100000.0));

        assert_eq!(summary.deal_count, 2);
        assert_eq!(summary.total_initial_estimate, 200000.0);
        assert!((summary.commission_earned - 1500.0).abs() < 1e-6);
        assert!((summary.average_collection_progress - 75.0).abs() < 1e-9);
    }

    #[test]
    fn totals_merge_weights_progress_by_deal_count() {
        let mut a = SalespersonSummary::new(None, "A");
        a.add(&deal(100000.0, 100000.0));
        let mut b = SalespersonSummary::new(None, "B");
        b.add(&deal(100000.0, 0.0));
        b.add(&deal(100000.0, 0.0));

        let mut totals = SalespersonSummary::new(None, "Total");
        totals.merge(&a);
        totals.merge(&b);
        assert_eq!(totals.deal_count, 3);
        assert!((totals.average_collection_progress - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn goal_attainment() {
        let mut summary = SalespersonSummary::new(None, "Dana");
        summary.add(&deal(100000.0, 0.0));
        summary.apply_goal(400000.0, 4, 0.0);
        assert_eq!(summary.revenue_attainment, Some(25.0));
        assert_eq!(summary.deals_attainment, Some(25.0));
        assert_eq!(summary.commission_attainment, Some(0.0));
    }
}
