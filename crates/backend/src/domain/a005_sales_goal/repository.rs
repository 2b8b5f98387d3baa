use chrono::Utc;
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a005_sales_goal::{SalesGoal, SalesGoalId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_sales_goal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub salesperson_id: String,
    pub year: i32,
    pub target_revenue: f64,
    pub target_deals: i32,
    pub target_commission: f64,
    pub notes: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SalesGoal {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        SalesGoal {
            id: SalesGoalId::from_string(&m.id).unwrap_or_else(|_| SalesGoalId::new_v4()),
            salesperson_id: SalespersonId::from_string(&m.salesperson_id)
                .unwrap_or_else(|_| SalespersonId::new_v4()),
            year: m.year,
            target_revenue: m.target_revenue,
            target_deals: m.target_deals,
            target_commission: m.target_commission,
            notes: m.notes,
            metadata,
        }
    }
}

fn to_active(aggregate: &SalesGoal) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        salesperson_id: Set(aggregate.salesperson_id.as_string()),
        year: Set(aggregate.year),
        target_revenue: Set(aggregate.target_revenue),
        target_deals: Set(aggregate.target_deals),
        target_commission: Set(aggregate.target_commission),
        notes: Set(aggregate.notes.clone()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    salesperson_id: Option<SalespersonId>,
    year: Option<i32>,
) -> anyhow::Result<Vec<SalesGoal>> {
    let mut query = Entity::find();
    if let Some(salesperson_id) = salesperson_id {
        query = query.filter(Column::SalespersonId.eq(salesperson_id.as_string()));
    }
    if let Some(year) = year {
        query = query.filter(Column::Year.eq(year));
    }
    let items = query
        .order_by_desc(Column::Year)
        .order_by_asc(Column::SalespersonId)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: SalesGoalId,
) -> anyhow::Result<Option<SalesGoal>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

/// Цель продавца на год
pub async fn find<C: ConnectionTrait>(
    db: &C,
    salesperson_id: SalespersonId,
    year: i32,
) -> anyhow::Result<Option<SalesGoal>> {
    let result = Entity::find()
        .filter(Column::SalespersonId.eq(salesperson_id.as_string()))
        .filter(Column::Year.eq(year))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &SalesGoal) -> anyhow::Result<SalesGoalId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &SalesGoal) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: SalesGoalId) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}
