use chrono::Utc;
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a006_sales_plan::{SalesPlan, SalesPlanId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::ApprovalStatus;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a006_sales_plan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub salesperson_id: String,
    pub plan_year: i32,
    pub target_revenue: f64,
    pub target_deals: i32,
    pub target_commission: f64,
    pub strategy_notes: Option<String>,
    pub approval_status: String,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approved_by: Option<String>,
    pub review_comment: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SalesPlan {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        SalesPlan {
            id: SalesPlanId::from_string(&m.id).unwrap_or_else(|_| SalesPlanId::new_v4()),
            salesperson_id: SalespersonId::from_string(&m.salesperson_id)
                .unwrap_or_else(|_| SalespersonId::new_v4()),
            plan_year: m.plan_year,
            target_revenue: m.target_revenue,
            target_deals: m.target_deals,
            target_commission: m.target_commission,
            strategy_notes: m.strategy_notes,
            approval_status: ApprovalStatus::from_code(&m.approval_status).unwrap_or_default(),
            submitted_at: m.submitted_at,
            approved_at: m.approved_at,
            approved_by: m.approved_by,
            review_comment: m.review_comment,
            metadata,
        }
    }
}

fn to_active(aggregate: &SalesPlan) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        salesperson_id: Set(aggregate.salesperson_id.as_string()),
        plan_year: Set(aggregate.plan_year),
        target_revenue: Set(aggregate.target_revenue),
        target_deals: Set(aggregate.target_deals),
        target_commission: Set(aggregate.target_commission),
        strategy_notes: Set(aggregate.strategy_notes.clone()),
        approval_status: Set(aggregate.approval_status.as_str().to_string()),
        submitted_at: Set(aggregate.submitted_at),
        approved_at: Set(aggregate.approved_at),
        approved_by: Set(aggregate.approved_by.clone()),
        review_comment: Set(aggregate.review_comment.clone()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    salesperson_id: Option<SalespersonId>,
    status: Option<ApprovalStatus>,
) -> anyhow::Result<Vec<SalesPlan>> {
    let mut query = Entity::find();
    if let Some(salesperson_id) = salesperson_id {
        query = query.filter(Column::SalespersonId.eq(salesperson_id.as_string()));
    }
    if let Some(status) = status {
        query = query.filter(Column::ApprovalStatus.eq(status.as_str()));
    }
    let items = query
        .order_by_desc(Column::PlanYear)
        .order_by_desc(Column::UpdatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: SalesPlanId,
) -> anyhow::Result<Option<SalesPlan>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &SalesPlan) -> anyhow::Result<SalesPlanId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &SalesPlan) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: SalesPlanId) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}
