use chrono::Utc;
use contracts::domain::a001_sales_commission::splits::client_key;
use contracts::domain::a001_sales_commission::{SalesCommission, SalesCommissionId};
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::CommissionStatus;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_sales_commission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_name: String,
    pub client_key: String,
    pub adjuster: Option<String>,
    pub office: Option<String>,
    pub salesperson_id: String,
    pub date_signed: Option<chrono::NaiveDate>,
    pub year: i32,
    pub initial_estimate: f64,
    pub revised_estimate: Option<f64>,
    pub percent_change: f64,
    pub insurance_checks_ytd: f64,
    pub old_remainder: f64,
    pub new_remainder: f64,
    pub fee_percentage: f64,
    pub commission_percentage: f64,
    pub split_percentage: f64,
    pub commissions_paid: f64,
    pub status: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SalesCommission {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        SalesCommission {
            id: SalesCommissionId::from_string(&m.id)
                .unwrap_or_else(|_| SalesCommissionId::new_v4()),
            client_name: m.client_name,
            adjuster: m.adjuster,
            office: m.office,
            salesperson_id: SalespersonId::from_string(&m.salesperson_id)
                .unwrap_or_else(|_| SalespersonId::new_v4()),
            date_signed: m.date_signed,
            year: m.year,
            initial_estimate: m.initial_estimate,
            revised_estimate: m.revised_estimate,
            percent_change: m.percent_change,
            insurance_checks_ytd: m.insurance_checks_ytd,
            old_remainder: m.old_remainder,
            new_remainder: m.new_remainder,
            fee_percentage: m.fee_percentage,
            commission_percentage: m.commission_percentage,
            split_percentage: m.split_percentage,
            commissions_paid: m.commissions_paid,
            status: CommissionStatus::from_code(&m.status).unwrap_or_default(),
            metadata,
        }
    }
}

fn to_active(aggregate: &SalesCommission) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        client_name: Set(aggregate.client_name.clone()),
        client_key: Set(client_key(&aggregate.client_name)),
        adjuster: Set(aggregate.adjuster.clone()),
        office: Set(aggregate.office.clone()),
        salesperson_id: Set(aggregate.salesperson_id.as_string()),
        date_signed: Set(aggregate.date_signed),
        year: Set(aggregate.year),
        initial_estimate: Set(aggregate.initial_estimate),
        revised_estimate: Set(aggregate.revised_estimate),
        percent_change: Set(aggregate.percent_change),
        insurance_checks_ytd: Set(aggregate.insurance_checks_ytd),
        old_remainder: Set(aggregate.old_remainder),
        new_remainder: Set(aggregate.new_remainder),
        fee_percentage: Set(aggregate.fee_percentage),
        commission_percentage: Set(aggregate.commission_percentage),
        split_percentage: Set(aggregate.split_percentage),
        commissions_paid: Set(aggregate.commissions_paid),
        status: Set(aggregate.status.as_str().to_string()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

/// Фильтр списка сделок после разбора параметров запроса
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub salesperson_id: Option<SalespersonId>,
    pub year: Option<i32>,
    pub status: Option<CommissionStatus>,
    pub client: Option<String>,
}

pub async fn list<C: ConnectionTrait>(db: &C, filter: &ListFilter) -> anyhow::Result<Vec<SalesCommission>> {
    let mut query = Entity::find();
    if let Some(salesperson_id) = filter.salesperson_id {
        query = query.filter(Column::SalespersonId.eq(salesperson_id.as_string()));
    }
    if let Some(year) = filter.year {
        query = query.filter(Column::Year.eq(year));
    }
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status.as_str()));
    }
    if let Some(client) = filter.client.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        query = query.filter(Column::ClientName.contains(client));
    }

    let items = query
        .order_by_desc(Column::DateSigned)
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Все записи клиента (по нормализованному ключу, без учета регистра)
pub async fn find_by_client<C: ConnectionTrait>(
    db: &C,
    client_name: &str,
) -> anyhow::Result<Vec<SalesCommission>> {
    let items = Entity::find()
        .filter(Column::ClientKey.eq(client_key(client_name)))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: SalesCommissionId,
) -> anyhow::Result<Option<SalesCommission>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    aggregate: &SalesCommission,
) -> anyhow::Result<SalesCommissionId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &SalesCommission) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: SalesCommissionId) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}
