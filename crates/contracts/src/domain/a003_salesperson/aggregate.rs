use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::enums::SalesRole;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор продавца
    SalespersonId
);

/// Продавец (директор или менеджер по продажам)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salesperson {
    pub id: SalespersonId,
    pub name: String,
    pub email: Option<String>,
    pub role: SalesRole,
    /// Руководитель (ссылка на другого продавца)
    pub manager_id: Option<SalespersonId>,
    /// Мягкое удаление: запись никогда не удаляется физически
    pub is_active: bool,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Salesperson {
    /// Создать нового продавца для вставки в БД
    pub fn new_for_insert(
        name: String,
        email: Option<String>,
        role: SalesRole,
        manager_id: Option<SalespersonId>,
    ) -> Self {
        Self {
            id: SalespersonId::new_v4(),
            name: name.trim().to_string(),
            email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            role,
            manager_id,
            is_active: true,
            metadata: EntityMetadata::new(),
        }
    }

    /// Обновить данные из DTO (менеджер уже разобран вызывающей стороной)
    pub fn update(&mut self, dto: &SalespersonDto, manager_id: Option<SalespersonId>) {
        self.name = dto.name.trim().to_string();
        self.email = dto
            .email
            .as_ref()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        self.role = dto.role;
        self.manager_id = manager_id;
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Salesperson name is required".into());
        }
        if let Some(ref email) = self.email {
            if !email.contains('@') {
                return Err("Invalid email format".into());
            }
        }
        if self.manager_id == Some(self.id) {
            return Err("A salesperson cannot be their own manager".into());
        }
        Ok(())
    }
}

impl AggregateRoot for Salesperson {
    type Id = SalespersonId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "salesperson"
    }

    fn element_name() -> &'static str {
        "Salesperson"
    }

    fn list_name() -> &'static str {
        "Salespeople"
    }
}

/// DTO для создания/обновления продавца
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalespersonDto {
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub role: SalesRole,
    pub manager_id: Option<String>,
}
