use std::collections::HashMap;

use anyhow::Result;
use contracts::dashboards::d001_sales_overview::{
    SalesOverviewRequest, SalesOverviewResponse, SalespersonSummary,
};
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::common::AggregateId;
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use crate::domain::a001_sales_commission::repository::ListFilter;
use crate::domain::{a001_sales_commission, a003_salesperson, a005_sales_goal};
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::access;

/// Сводка продаж за год по продавцам и по команде
pub async fn get_sales_overview(
    db: &DatabaseConnection,
    request: SalesOverviewRequest,
    actor: &TokenClaims,
) -> Result<SalesOverviewResponse> {
    if !(2000..=2100).contains(&request.year) {
        return Err(ServiceError::validation(format!(
            "Year {} is out of range",
            request.year
        )));
    }

    let requested = parse_optional_id::<SalespersonId>(&request.salesperson_id)?;
    let scope = access::scope_salesperson(actor, requested)?;

    let filter = ListFilter {
        salesperson_id: scope,
        year: Some(request.year),
        ..Default::default()
    };
    let records = a001_sales_commission::repository::list(db, &filter).await?;

    let names: HashMap<SalespersonId, String> = a003_salesperson::repository::list(db, true)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let summary_for = |id: SalespersonId| {
        let name = names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        SalespersonSummary::new(Some(id.as_string()), name)
    };

    // Группировка сделок по продавцу
    let mut by_salesperson: HashMap<SalespersonId, SalespersonSummary> = HashMap::new();
    for record in &records {
        by_salesperson
            .entry(record.salesperson_id)
            .or_insert_with(|| summary_for(record.salesperson_id))
            .add(record);
    }

    // Цели года; продавец с целью, но без сделок, получает строку с нулями
    let goals = a005_sales_goal::repository::list(db, scope, Some(request.year)).await?;
    let mut team_targets = (0.0, 0, 0.0);
    for goal in &goals {
        team_targets.0 += goal.target_revenue;
        team_targets.1 += goal.target_deals;
        team_targets.2 += goal.target_commission;
        by_salesperson
            .entry(goal.salesperson_id)
            .or_insert_with(|| summary_for(goal.salesperson_id))
            .apply_goal(goal.target_revenue, goal.target_deals, goal.target_commission);
    }

    let mut rows: Vec<SalespersonSummary> = by_salesperson.into_values().collect();
    rows.sort_by(|a, b| {
        a.salesperson_name
            .to_lowercase()
            .cmp(&b.salesperson_name.to_lowercase())
    });

    let mut totals = SalespersonSummary::new(None, "Team total");
    for row in &rows {
        totals.merge(row);
    }
    if !goals.is_empty() {
        totals.apply_goal(team_targets.0, team_targets.1, team_targets.2);
    }

    Ok(SalesOverviewResponse {
        year: request.year,
        rows,
        totals,
    })
}
