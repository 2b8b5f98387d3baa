use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, EntityMetadata};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор аджастера
    AdjusterId
);

/// Аджастер (оценщик страховых убытков)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjuster {
    pub id: AdjusterId,
    pub name: String,
    pub office: Option<String>,
    /// Удаление только мягкое
    pub is_active: bool,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Adjuster {
    pub fn new_for_insert(name: String, office: Option<String>) -> Self {
        Self {
            id: AdjusterId::new_v4(),
            name: name.trim().to_string(),
            office: office.map(|o| o.trim().to_string()).filter(|o| !o.is_empty()),
            is_active: true,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn update(&mut self, dto: &AdjusterDto) {
        self.name = dto.name.trim().to_string();
        self.office = dto
            .office
            .as_ref()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Adjuster name is required".into());
        }
        Ok(())
    }
}

impl AggregateRoot for Adjuster {
    type Id = AdjusterId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "adjuster"
    }

    fn element_name() -> &'static str {
        "Adjuster"
    }

    fn list_name() -> &'static str {
        "Adjusters"
    }
}

/// DTO для создания/обновления аджастера
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdjusterDto {
    pub id: Option<String>,
    pub name: String,
    pub office: Option<String>,
}
