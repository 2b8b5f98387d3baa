use chrono::Utc;
use contracts::domain::a004_adjuster::{Adjuster, AdjusterId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_adjuster")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub office: Option<String>,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Adjuster {
    fn from(m: Model) -> Self {
        Adjuster {
            id: AdjusterId::from_string(&m.id).unwrap_or_else(|_| AdjusterId::new_v4()),
            name: m.name,
            office: m.office,
            is_active: m.is_active,
            metadata: EntityMetadata {
                created_at: m.created_at.unwrap_or_else(Utc::now),
                updated_at: m.updated_at.unwrap_or_else(Utc::now),
                version: m.version,
            },
        }
    }
}

fn to_active(aggregate: &Adjuster) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        name: Set(aggregate.name.clone()),
        office: Set(aggregate.office.clone()),
        is_active: Set(aggregate.is_active),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

pub async fn list<C: ConnectionTrait>(db: &C, include_inactive: bool) -> anyhow::Result<Vec<Adjuster>> {
    let mut query = Entity::find();
    if !include_inactive {
        query = query.filter(Column::IsActive.eq(true));
    }
    Ok(query
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: AdjusterId) -> anyhow::Result<Option<Adjuster>> {
    let result = Entity::find_by_id(id.as_string()).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, aggregate: &Adjuster) -> anyhow::Result<AdjusterId> {
    to_active(aggregate).insert(db).await?;
    Ok(aggregate.id)
}

pub async fn update<C: ConnectionTrait>(db: &C, aggregate: &Adjuster) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = ActiveValue::NotSet;
    active.update(db).await?;
    Ok(())
}
