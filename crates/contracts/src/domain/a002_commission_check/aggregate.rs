use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a001_sales_commission::aggregate::{SalesCommission, SalesCommissionId};
use crate::domain::a001_sales_commission::metrics::commission_from_check;
use crate::domain::common::{AggregateRoot, EntityMetadata};
use crate::shared::money::round_cents;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор чека
    CommissionCheckId
);

/// Чек от страховой компании по сделке.
///
/// `commission_earned` хранит снимок на момент ввода чека: он считается от процентов
/// родительской записи и не пересчитывается, если проценты потом изменятся.
/// Использованные проценты хранятся рядом, чтобы снимок можно было проверить.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionCheck {
    pub id: CommissionCheckId,
    pub sales_commission_id: SalesCommissionId,
    pub check_amount: f64,
    pub received_date: NaiveDate,
    pub deposited_date: Option<NaiveDate>,
    pub check_number: Option<String>,
    pub notes: Option<String>,
    /// Комиссия с чека, округленная до центов:
    /// round(check_amount × fee% × commission% × split%, 2)
    pub commission_earned: f64,

    pub fee_percentage_used: f64,
    pub commission_percentage_used: f64,
    pub split_percentage_used: f64,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

/// Изменение агрегатов родительской записи
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CheckDelta {
    pub amount: f64,
    pub commission: f64,
}

impl CheckDelta {
    pub fn reversed(self) -> Self {
        Self {
            amount: -self.amount,
            commission: -self.commission,
        }
    }
}

impl CommissionCheck {
    /// Новый чек по родительской записи
    pub fn record(parent: &SalesCommission, dto: &CommissionCheckDto) -> Self {
        let mut check = Self {
            id: CommissionCheckId::new_v4(),
            sales_commission_id: parent.id,
            check_amount: dto.check_amount,
            received_date: dto.received_date,
            deposited_date: dto.deposited_date,
            check_number: dto.check_number.clone().filter(|s| !s.trim().is_empty()),
            notes: dto.notes.clone().filter(|s| !s.trim().is_empty()),
            commission_earned: 0.0,
            fee_percentage_used: 0.0,
            commission_percentage_used: 0.0,
            split_percentage_used: 0.0,
            metadata: EntityMetadata::new(),
        };
        check.snapshot_from(parent);
        check
    }

    /// Пересчитать комиссию по текущим процентам родителя
    fn snapshot_from(&mut self, parent: &SalesCommission) {
        self.fee_percentage_used = parent.fee_percentage;
        self.commission_percentage_used = parent.commission_percentage;
        self.split_percentage_used = parent.split_percentage;
        self.commission_earned = round_cents(commission_from_check(
            self.check_amount,
            parent.fee_percentage,
            parent.commission_percentage,
            parent.split_percentage,
        ));
    }

    /// Вклад чека в агрегаты родителя
    pub fn delta(&self) -> CheckDelta {
        CheckDelta {
            amount: self.check_amount,
            commission: self.commission_earned,
        }
    }

    /// Редактирование чека. Возвращает разницу, которую нужно применить к родителю.
    pub fn apply_edit(&mut self, parent: &SalesCommission, dto: &CommissionCheckDto) -> CheckDelta {
        let before = self.delta();

        self.check_amount = dto.check_amount;
        self.received_date = dto.received_date;
        self.deposited_date = dto.deposited_date;
        self.check_number = dto.check_number.clone().filter(|s| !s.trim().is_empty());
        self.notes = dto.notes.clone().filter(|s| !s.trim().is_empty());
        self.snapshot_from(parent);

        let after = self.delta();
        CheckDelta {
            amount: after.amount - before.amount,
            commission: after.commission - before.commission,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.check_amount.is_finite() || self.check_amount <= 0.0 {
            return Err("Check amount must be greater than zero".into());
        }
        if let Some(deposited) = self.deposited_date {
            if deposited < self.received_date {
                return Err("Deposited date cannot be earlier than received date".into());
            }
        }
        Ok(())
    }
}

impl AggregateRoot for CommissionCheck {
    type Id = CommissionCheckId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "commission_check"
    }

    fn element_name() -> &'static str {
        "Commission check"
    }

    fn list_name() -> &'static str {
        "Commission checks"
    }
}

/// DTO диалога чека
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionCheckDto {
    pub check_amount: f64,
    pub received_date: NaiveDate,
    pub deposited_date: Option<NaiveDate>,
    pub check_number: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_sales_commission::aggregate::SalesCommissionDto;
    use crate::domain::a003_salesperson::aggregate::SalespersonId;

    fn parent(split: f64) -> SalesCommission {
        let dto = SalesCommissionDto {
            client_name: "Bayfront Condos".into(),
            year: 2024,
            initial_estimate: 300000.0,
            fee_percentage: 7.0,
            commission_percentage: 8.0,
            split_percentage: Some(split),
            ..Default::default()
        };
        SalesCommission::new_for_insert(&dto, SalespersonId::new_v4())
    }

    fn check_dto(amount: f64) -> CommissionCheckDto {
        CommissionCheckDto {
            check_amount: amount,
            received_date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            deposited_date: None,
            check_number: Some("10021".into()),
            notes: Some(" ".into()),
        }
    }

    #[test]
    fn records_commission_snapshot() {
        let parent = parent(50.0);
        let check = CommissionCheck::record(&parent, &check_dto(50000.0));
        assert_eq!(check.commission_earned, 140.0);
        assert_eq!(check.split_percentage_used, 50.0);
        assert_eq!(check.notes, None);
        assert_eq!(
            check.delta(),
            CheckDelta {
                amount: 50000.0,
                commission: 140.0
            }
        );
    }

    #[test]
    fn snapshot_survives_parent_change_until_edited() {
        let mut parent = parent(100.0);
        let mut check = CommissionCheck::record(&parent, &check_dto(10000.0));
        assert_eq!(check.commission_earned, 56.0);

        parent.commission_percentage = 10.0;
        assert_eq!(check.commission_earned, 56.0);

        let delta = check.apply_edit(&parent, &check_dto(20000.0));
        assert_eq!(check.commission_earned, 140.0);
        assert_eq!(check.commission_percentage_used, 10.0);
        assert_eq!(delta.amount, 10000.0);
        assert!((delta.commission - 84.0).abs() < 1e-9);
    }

    #[test]
    fn commission_snapshot_is_rounded_to_cents() {
        let parent = parent(100.0);
        // 1234.57 × 7% × 8% = 6.913592
        let check = CommissionCheck::record(&parent, &check_dto(1234.57));
        assert_eq!(check.commission_earned, 6.91);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let parent = parent(100.0);
        let check = CommissionCheck::record(&parent, &check_dto(0.0));
        assert!(check.validate().is_err());
        let check = CommissionCheck::record(&parent, &check_dto(-5.0));
        assert!(check.validate().is_err());
    }
}
