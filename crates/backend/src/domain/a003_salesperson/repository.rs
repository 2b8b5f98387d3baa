use chrono::Utc;
use contracts::domain::a003_salesperson::{Salesperson, SalespersonId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::enums::SalesRole;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_salesperson")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub manager_id: Option<String>,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Salesperson {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let id = SalespersonId::from_string(&m.id).unwrap_or_else(|_| SalespersonId::new_v4());

        Salesperson {
            id,
            name: m.name,
            email: m.email,
            role: SalesRole::from_code(&m.role).unwrap_or(SalesRole::SalesRep),
            manager_id: m
                .manager_id
                .as_deref()
                .and_then(|v| SalespersonId::from_string(v).ok()),
            is_active: m.is_active,
            metadata,
        }
    }
}

fn to_active(aggregate: &Salesperson) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        name: Set(aggregate.name.clone()),
        email: Set(aggregate.email.clone()),
        role: Set(aggregate.role.as_str().to_string()),
        manager_id: Set(aggregate.manager_id.map(|id| id.as_string())),
        is_active: Set(aggregate.is_active),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

pub async fn list<C: ConnectionTrait>(db: &C, include_inactive: bool) -> anyhow::Result<Vec<Salesperson>> {
    let mut query = Entity::find();
    if !include_inactive {
        query = query.filter(Column::IsActive.eq(true));
    }
    let items = query
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Активные подчиненные руководителя
pub async fn list_by_manager<C: ConnectionTrait>(
    db: &C,
    manager_id: SalespersonId,
) -> anyhow::Result<Vec<Salesperson>> {
    let items = Entity::find()
        .filter(Column::ManagerId.eq(manager_id.as_string()))
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: SalespersonId,
) -> anyhow::Result<Option<Salesperson>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &Salesperson) -> anyhow::Result<SalespersonId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &Salesperson) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}
