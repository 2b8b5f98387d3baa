use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a003_salesperson::aggregate::SalespersonId;
use crate::domain::a004_adjuster::aggregate::AdjusterId;
use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::enums::ClaimStatus;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор страхового случая
    ClaimId
);

/// Страховой случай клиента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    /// Номер дела, уникальный
    pub claim_number: String,
    pub client_name: String,
    pub adjuster_id: Option<AdjusterId>,
    pub salesperson_id: Option<SalespersonId>,
    pub loss_date: Option<NaiveDate>,
    pub loss_type: Option<String>,
    pub status: ClaimStatus,
    pub estimated_amount: f64,
    pub notes: Option<String>,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Claim {
    pub fn new_for_insert(
        dto: &ClaimDto,
        adjuster_id: Option<AdjusterId>,
        salesperson_id: Option<SalespersonId>,
    ) -> Self {
        let mut claim = Self {
            id: ClaimId::new_v4(),
            claim_number: String::new(),
            client_name: String::new(),
            adjuster_id: None,
            salesperson_id: None,
            loss_date: None,
            loss_type: None,
            status: ClaimStatus::Open,
            estimated_amount: 0.0,
            notes: None,
            metadata: EntityMetadata::new(),
        };
        claim.update(dto, adjuster_id, salesperson_id);
        claim
    }

    pub fn update(
        &mut self,
        dto: &ClaimDto,
        adjuster_id: Option<AdjusterId>,
        salesperson_id: Option<SalespersonId>,
    ) {
        self.claim_number = dto.claim_number.trim().to_string();
        self.client_name = dto.client_name.trim().to_string();
        self.adjuster_id = adjuster_id;
        self.salesperson_id = salesperson_id;
        self.loss_date = dto.loss_date;
        self.loss_type = clean(&dto.loss_type);
        self.status = dto.status.unwrap_or(self.status);
        self.estimated_amount = dto.estimated_amount.unwrap_or(0.0);
        self.notes = clean(&dto.notes);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.claim_number.is_empty() {
            return Err("Claim number is required".into());
        }
        if self.client_name.is_empty() {
            return Err("Client name is required".into());
        }
        if !self.estimated_amount.is_finite() || self.estimated_amount < 0.0 {
            return Err("Estimated amount cannot be negative".into());
        }
        Ok(())
    }
}

impl AggregateRoot for Claim {
    type Id = ClaimId;

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
        "a007"
    }

    fn collection_name() -> &'static str {
        "claim"
    }

    fn element_name() -> &'static str {
        "Claim"
    }

    fn list_name() -> &'static str {
        "Claims"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClaimDto {
    pub id: Option<String>,
    pub claim_number: String,
    pub client_name: String,
    pub adjuster_id: Option<String>,
    pub salesperson_id: Option<String>,
    pub loss_date: Option<NaiveDate>,
    pub loss_type: Option<String>,
    pub status: Option<ClaimStatus>,
    pub estimated_amount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClaimListQuery {
    pub status: Option<String>,
    pub salesperson_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_trims_and_defaults() {
        let dto = ClaimDto {
            claim_number: " CLM-2024-0042 ".into(),
            client_name: "Harbor Point HOA".into(),
            loss_type: Some("  ".into()),
            ..Default::default()
        };
        let claim = Claim::new_for_insert(&dto, None, None);
        assert_eq!(claim.claim_number, "CLM-2024-0042");
        assert_eq!(claim.status, ClaimStatus::Open);
        assert_eq!(claim.loss_type, None);
        assert!(claim.validate().is_ok());
    }

    #[test]
    fn update_keeps_status_when_absent() {
        let dto = ClaimDto {
            claim_number: "CLM-1".into(),
            client_name: "Client".into(),
            status: Some(ClaimStatus::Settled),
            ..Default::default()
        };
        let mut claim = Claim::new_for_insert(&dto, None, None);
        let dto = ClaimDto {
            status: None,
            ..dto
        };
        claim.update(&dto, None, None);
        assert_eq!(claim.status, ClaimStatus::Settled);
    }

    #[test]
    fn requires_claim_number() {
        let claim = Claim::new_for_insert(&ClaimDto::default(), None, None);
        assert!(claim.validate().is_err());
    }
}
