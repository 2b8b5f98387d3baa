use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::{self, CommissionFigures, DEFAULT_SPLIT_PERCENTAGE};
use crate::domain::a003_salesperson::aggregate::SalespersonId;
use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::enums::CommissionStatus;

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор записи о комиссии
    SalesCommissionId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Доля одного продавца в сделке с клиентом.
///
/// Если сделка разделена между несколькими продавцами, у каждого своя запись с
/// тем же `client_name`, и их `split_percentage` в сумме дают 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesCommission {
    pub id: SalesCommissionId,
    pub client_name: String,
    pub adjuster: Option<String>,
    pub office: Option<String>,
    pub salesperson_id: SalespersonId,
    pub date_signed: Option<NaiveDate>,
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

    pub status: CommissionStatus,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl SalesCommission {
    /// Создать новую запись для вставки в БД
    pub fn new_for_insert(dto: &SalesCommissionDto, salesperson_id: SalespersonId) -> Self {
        let mut record = Self {
            id: SalesCommissionId::new_v4(),
            client_name: dto.client_name.trim().to_string(),
            adjuster: normalize(&dto.adjuster),
            office: normalize(&dto.office),
            salesperson_id,
            date_signed: dto.date_signed,
            year: dto.year,
            initial_estimate: dto.initial_estimate,
            revised_estimate: dto.revised_estimate.or(Some(dto.initial_estimate)),
            percent_change: 0.0,
            insurance_checks_ytd: dto.insurance_checks_ytd.unwrap_or(0.0),
            old_remainder: 0.0,
            new_remainder: 0.0,
            fee_percentage: dto.fee_percentage,
            commission_percentage: dto.commission_percentage,
            split_percentage: dto.split_percentage.unwrap_or(DEFAULT_SPLIT_PERCENTAGE),
            commissions_paid: dto.commissions_paid.unwrap_or(0.0),
            status: dto.status.unwrap_or_default(),
            metadata: EntityMetadata::new(),
        };
        record.refresh_derived();
        record.old_remainder = record.new_remainder;
        record
    }

    /// Копия общих полей сделки для нового участника разделения
    pub fn split_copy(&self, salesperson_id: SalespersonId, split_percentage: f64) -> Self {
        Self {
            id: SalesCommissionId::new_v4(),
            client_name: self.client_name.clone(),
            adjuster: self.adjuster.clone(),
            office: self.office.clone(),
            salesperson_id,
            date_signed: self.date_signed,
            year: self.year,
            initial_estimate: self.initial_estimate,
            revised_estimate: self.revised_estimate,
            percent_change: self.percent_change,
            insurance_checks_ytd: 0.0,
            old_remainder: self.old_remainder,
            new_remainder: self.revised(),
            fee_percentage: self.fee_percentage,
            commission_percentage: self.commission_percentage,
            split_percentage,
            commissions_paid: 0.0,
            status: self.status,
            metadata: EntityMetadata::new(),
        }
    }

    /// Пересмотренная оценка (если не задана, то исходная)
    pub fn revised(&self) -> f64 {
        self.revised_estimate.unwrap_or(self.initial_estimate)
    }

    /// Пересчитать хранимые производные поля
    pub fn refresh_derived(&mut self) {
        self.percent_change = metrics::percent_change(self.initial_estimate, self.revised());
        self.new_remainder = metrics::remainder(self.revised(), self.insurance_checks_ytd);
    }

    /// Пересмотр оценки: старый остаток сохраняется, новый пересчитывается
    pub fn revise_estimate(&mut self, revised_estimate: f64) {
        self.old_remainder = metrics::remainder(self.revised(), self.insurance_checks_ytd);
        self.revised_estimate = Some(revised_estimate);
        self.refresh_derived();
    }

    /// Учесть изменение по чекам (положительное при добавлении, отрицательное при удалении)
    pub fn apply_check_delta(&mut self, amount_delta: f64, commission_delta: f64) {
        self.insurance_checks_ytd = (self.insurance_checks_ytd + amount_delta).max(0.0);
        self.commissions_paid = (self.commissions_paid + commission_delta).max(0.0);
        self.refresh_derived();
    }

    /// Частичное обновление из диалога редактирования
    pub fn apply_patch(&mut self, patch: &SalesCommissionPatch) {
        if let Some(ref client_name) = patch.client_name {
            self.client_name = client_name.trim().to_string();
        }
        if let Some(ref adjuster) = patch.adjuster {
            self.adjuster = normalize(&Some(adjuster.clone()));
        }
        if let Some(ref office) = patch.office {
            self.office = normalize(&Some(office.clone()));
        }
        if let Some(date_signed) = patch.date_signed {
            self.date_signed = Some(date_signed);
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(initial_estimate) = patch.initial_estimate {
            self.initial_estimate = initial_estimate;
        }
        if let Some(revised_estimate) = patch.revised_estimate {
            self.revised_estimate = Some(revised_estimate);
        }
        if let Some(checks) = patch.insurance_checks_ytd {
            self.insurance_checks_ytd = checks;
        }
        if let Some(fee) = patch.fee_percentage {
            self.fee_percentage = fee;
        }
        if let Some(commission) = patch.commission_percentage {
            self.commission_percentage = commission;
        }
        if let Some(paid) = patch.commissions_paid {
            self.commissions_paid = paid;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.refresh_derived();
    }

    /// Производные показатели для отображения
    pub fn figures(&self) -> CommissionFigures {
        CommissionFigures::from_record(self)
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.client_name.trim().is_empty() {
            return Err("Client name is required".into());
        }
        if !(2000..=2100).contains(&self.year) {
            return Err(format!("Year {} is out of range", self.year));
        }
        for (label, value) in [
            ("Fee percentage", self.fee_percentage),
            ("Commission percentage", self.commission_percentage),
            ("Split percentage", self.split_percentage),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("{} must be between 0 and 100", label));
            }
        }
        Ok(())
    }
}

fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AggregateRoot for SalesCommission {
    type Id = SalesCommissionId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "sales_commission"
    }

    fn element_name() -> &'static str {
        "Sales commission"
    }

    fn list_name() -> &'static str {
        "Sales commissions"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO формы добавления сделки
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesCommissionDto {
    pub client_name: String,
    pub adjuster: Option<String>,
    pub office: Option<String>,
    /// Если не задан, берется продавец текущего пользователя
    pub salesperson_id: Option<String>,
    pub date_signed: Option<NaiveDate>,
    pub year: i32,
    pub initial_estimate: f64,
    pub revised_estimate: Option<f64>,
    pub insurance_checks_ytd: Option<f64>,
    pub fee_percentage: f64,
    pub commission_percentage: f64,
    pub split_percentage: Option<f64>,
    pub commissions_paid: Option<f64>,
    pub status: Option<CommissionStatus>,
    /// Участники разделения, создаваемые вместе со сделкой
    #[serde(default)]
    pub split_participants: Vec<SplitParticipantDto>,
}

/// Частичное обновление записи
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesCommissionPatch {
    pub client_name: Option<String>,
    pub adjuster: Option<String>,
    pub office: Option<String>,
    pub date_signed: Option<NaiveDate>,
    pub year: Option<i32>,
    pub initial_estimate: Option<f64>,
    pub revised_estimate: Option<f64>,
    pub insurance_checks_ytd: Option<f64>,
    pub fee_percentage: Option<f64>,
    pub commission_percentage: Option<f64>,
    pub commissions_paid: Option<f64>,
    pub status: Option<CommissionStatus>,
}

/// Диалог пересмотра оценки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateUpdateRequest {
    pub revised_estimate: f64,
}

/// Участник разделения из диалога редактирования
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SplitParticipantDto {
    /// Существующая запись; `None` для нового участника
    pub id: Option<String>,
    pub salesperson_id: Option<String>,
    pub split_percentage: f64,
}

/// Сохранение разделения сделки
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SaveSplitsRequest {
    /// Доля основного продавца (P₀)
    pub primary_split_percentage: f64,
    #[serde(default)]
    pub participants: Vec<SplitParticipantDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SaveSplitsResponse {
    pub updated: usize,
    pub inserted: usize,
    pub deleted: usize,
    /// Предупреждения валидатора (например, единственный владелец не на 100%)
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Фильтр списка сделок
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SalesCommissionListQuery {
    pub salesperson_id: Option<String>,
    pub year: Option<i32>,
    pub status: Option<CommissionStatus>,
    pub client: Option<String>,
}

/// Запись вместе с рассчитанными показателями
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesCommissionView {
    #[serde(flatten)]
    pub record: SalesCommission,
    pub figures: CommissionFigures,
}

impl From<SalesCommission> for SalesCommissionView {
    fn from(record: SalesCommission) -> Self {
        let figures = record.figures();
        Self { record, figures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> SalesCommissionDto {
        SalesCommissionDto {
            client_name: "  Harbor View HOA ".into(),
            office: Some("Tampa".into()),
            adjuster: Some("".into()),
            year: 2024,
            initial_estimate: 200000.0,
            fee_percentage: 7.0,
            commission_percentage: 8.0,
            ..Default::default()
        }
    }

    #[test]
    fn new_record_defaults() {
        let record = SalesCommission::new_for_insert(&dto(), SalespersonId::new_v4());
        assert_eq!(record.client_name, "Harbor View HOA");
        assert_eq!(record.adjuster, None);
        assert_eq!(record.revised_estimate, Some(200000.0));
        assert_eq!(record.split_percentage, 100.0);
        assert_eq!(record.status, CommissionStatus::Open);
        assert_eq!(record.percent_change, 0.0);
        assert_eq!(record.new_remainder, 200000.0);
        assert_eq!(record.old_remainder, 200000.0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn revise_estimate_keeps_old_remainder() {
        let mut record = SalesCommission::new_for_insert(&dto(), SalespersonId::new_v4());
        record.apply_check_delta(50000.0, 280.0);
        record.revise_estimate(250000.0);
        assert_eq!(record.old_remainder, 150000.0);
        assert_eq!(record.new_remainder, 200000.0);
        assert!((record.percent_change - 25.0).abs() < 1e-9);
    }

    #[test]
    fn check_delta_floors_at_zero() {
        let mut record = SalesCommission::new_for_insert(&dto(), SalespersonId::new_v4());
        record.apply_check_delta(1000.0, 5.6);
        record.apply_check_delta(-2000.0, -10.0);
        assert_eq!(record.insurance_checks_ytd, 0.0);
        assert_eq!(record.commissions_paid, 0.0);
    }

    #[test]
    fn split_copy_shares_deal_fields() {
        let primary = SalesCommission::new_for_insert(&dto(), SalespersonId::new_v4());
        let other = SalespersonId::new_v4();
        let copy = primary.split_copy(other, 40.0);
        assert_ne!(copy.id, primary.id);
        assert_eq!(copy.salesperson_id, other);
        assert_eq!(copy.split_percentage, 40.0);
        assert_eq!(copy.client_name, primary.client_name);
        assert_eq!(copy.office, primary.office);
        assert_eq!(copy.fee_percentage, primary.fee_percentage);
        assert_eq!(copy.year, primary.year);
        assert_eq!(copy.commissions_paid, 0.0);
    }

    #[test]
    fn validation_rejects_bad_percentages() {
        let mut record = SalesCommission::new_for_insert(&dto(), SalespersonId::new_v4());
        record.fee_percentage = 120.0;
        assert!(record.validate().is_err());
        record.fee_percentage = 7.0;
        record.client_name = " ".into();
        assert!(record.validate().is_err());
    }

    #[test]
    fn table_name_follows_index_convention() {
        assert_eq!(SalesCommission::full_name(), "a001_sales_commission");
    }
}
