use chrono::Utc;
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::a004_adjuster::AdjusterId;
use contracts::domain::a007_claim::{Claim, ClaimId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::ClaimStatus;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a007_claim")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub claim_number: String,
    pub client_name: String,
    pub adjuster_id: Option<String>,
    pub salesperson_id: Option<String>,
    pub loss_date: Option<chrono::NaiveDate>,
    pub loss_type: Option<String>,
    pub status: String,
    pub estimated_amount: f64,
    pub notes: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Claim {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        Claim {
            id: ClaimId::from_string(&m.id).unwrap_or_else(|_| ClaimId::new_v4()),
            claim_number: m.claim_number,
            client_name: m.client_name,
            adjuster_id: m
                .adjuster_id
                .as_deref()
                .and_then(|v| AdjusterId::from_string(v).ok()),
            salesperson_id: m
                .salesperson_id
                .as_deref()
                .and_then(|v| SalespersonId::from_string(v).ok()),
            loss_date: m.loss_date,
            loss_type: m.loss_type,
            status: ClaimStatus::from_code(&m.status).unwrap_or_default(),
            estimated_amount: m.estimated_amount,
            notes: m.notes,
            metadata,
        }
    }
}

fn to_active(aggregate: &Claim) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        claim_number: Set(aggregate.claim_number.clone()),
        client_name: Set(aggregate.client_name.clone()),
        adjuster_id: Set(aggregate.adjuster_id.map(|id| id.as_string())),
        salesperson_id: Set(aggregate.salesperson_id.map(|id| id.as_string())),
        loss_date: Set(aggregate.loss_date),
        loss_type: Set(aggregate.loss_type.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        estimated_amount: Set(aggregate.estimated_amount),
        notes: Set(aggregate.notes.clone()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    status: Option<ClaimStatus>,
    salesperson_id: Option<SalespersonId>,
) -> anyhow::Result<Vec<Claim>> {
    let mut query = Entity::find();
    if let Some(status) = status {
        query = query.filter(Column::Status.eq(status.as_str()));
    }
    if let Some(salesperson_id) = salesperson_id {
        query = query.filter(Column::SalespersonId.eq(salesperson_id.as_string()));
    }
    let items = query
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: ClaimId) -> anyhow::Result<Option<Claim>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn find_by_number<C: ConnectionTrait>(
    db: &C,
    claim_number: &str,
) -> anyhow::Result<Option<Claim>> {
    let result = Entity::find()
        .filter(Column::ClaimNumber.eq(claim_number))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &Claim) -> anyhow::Result<ClaimId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &Claim) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: ClaimId) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}
