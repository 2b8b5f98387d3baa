use chrono::Utc;
use contracts::domain::a001_sales_commission::SalesCommissionId;
use contracts::domain::a002_commission_check::{CommissionCheck, CommissionCheckId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_commission_check")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sales_commission_id: String,
    pub check_amount: f64,
    pub received_date: chrono::NaiveDate,
    pub deposited_date: Option<chrono::NaiveDate>,
    pub check_number: Option<String>,
    pub notes: Option<String>,
    pub commission_earned: f64,
    pub fee_percentage_used: f64,
    pub commission_percentage_used: f64,
    pub split_percentage_used: f64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CommissionCheck {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        CommissionCheck {
            id: CommissionCheckId::from_string(&m.id)
                .unwrap_or_else(|_| CommissionCheckId::new_v4()),
            sales_commission_id: SalesCommissionId::from_string(&m.sales_commission_id)
                .unwrap_or_else(|_| SalesCommissionId::new_v4()),
            check_amount: m.check_amount,
            received_date: m.received_date,
            deposited_date: m.deposited_date,
            check_number: m.check_number,
            notes: m.notes,
            commission_earned: m.commission_earned,
            fee_percentage_used: m.fee_percentage_used,
            commission_percentage_used: m.commission_percentage_used,
            split_percentage_used: m.split_percentage_used,
            metadata,
        }
    }
}

fn to_active(aggregate: &CommissionCheck) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        sales_commission_id: Set(aggregate.sales_commission_id.as_string()),
        check_amount: Set(aggregate.check_amount),
        received_date: Set(aggregate.received_date),
        deposited_date: Set(aggregate.deposited_date),
        check_number: Set(aggregate.check_number.clone()),
        notes: Set(aggregate.notes.clone()),
        commission_earned: Set(aggregate.commission_earned),
        fee_percentage_used: Set(aggregate.fee_percentage_used),
        commission_percentage_used: Set(aggregate.commission_percentage_used),
        split_percentage_used: Set(aggregate.split_percentage_used),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

/// Чеки записи, новые сверху
pub async fn list_by_commission<C: ConnectionTrait>(
    db: &C,
    commission_id: SalesCommissionId,
) -> anyhow::Result<Vec<CommissionCheck>> {
    let items = Entity::find()
        .filter(Column::SalesCommissionId.eq(commission_id.as_string()))
        .order_by_desc(Column::ReceivedDate)
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: CommissionCheckId,
) -> anyhow::Result<Option<CommissionCheck>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    aggregate: &CommissionCheck,
) -> anyhow::Result<CommissionCheckId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &CommissionCheck) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: CommissionCheckId) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Удалить все чеки записи, возвращает количество удаленных
pub async fn delete_by_commission<C: ConnectionTrait>(
    db: &C,
    commission_id: SalesCommissionId,
) -> anyhow::Result<u64> {
    let result = Entity::delete_many()
        .filter(Column::SalesCommissionId.eq(commission_id.as_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
