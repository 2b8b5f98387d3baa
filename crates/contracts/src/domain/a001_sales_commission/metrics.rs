//! Производные финансовые показатели сделки.
//!
//! Все проценты хранятся в диапазоне 0–100 и делятся на 100 перед умножением.
//! Функции чистые и пересчитываются из текущих значений полей записи; одни и те
//! же формулы используются формой добавления сделки, карточкой сделки, диалогом
//! чеков и диалогом пересмотра оценки.

use serde::{Deserialize, Serialize};

use super::aggregate::SalesCommission;

pub use crate::shared::money::{format_currency, parse_amount};

/// Доля по умолчанию, если сделка не разделена
pub const DEFAULT_SPLIT_PERCENTAGE: f64 = 100.0;

fn pct(value: f64) -> f64 {
    value / 100.0
}

/// Процент собранных средств от пересмотренной оценки, всегда в [0, 100]
pub fn collection_progress(checks_received_ytd: f64, revised_estimate: f64) -> f64 {
    if revised_estimate == 0.0 {
        return 0.0;
    }
    (checks_received_ytd / revised_estimate * 100.0).clamp(0.0, 100.0)
}

/// Остаток к получению, никогда не отрицательный
pub fn remainder(revised_estimate: f64, checks_received_ytd: f64) -> f64 {
    (revised_estimate - checks_received_ytd).max(0.0)
}

/// Гонорар с суммы (`amount * fee%`)
pub fn fee_earned(amount: f64, fee_percentage: f64) -> f64 {
    amount * pct(fee_percentage)
}

/// Комиссия с гонорара с учетом доли продавца
pub fn commission_earned(fee: f64, commission_percentage: f64, split_percentage: f64) -> f64 {
    fee * pct(commission_percentage) * pct(split_percentage)
}

/// Прогноз комиссии со всей пересмотренной оценки
pub fn projected_commission(
    revised_estimate: f64,
    fee_percentage: f64,
    commission_percentage: f64,
    split_percentage: f64,
) -> f64 {
    commission_earned(
        fee_earned(revised_estimate, fee_percentage),
        commission_percentage,
        split_percentage,
    )
}

pub fn pending_commission(projected_total_commission: f64, earned: f64) -> f64 {
    projected_total_commission - earned
}

pub fn commission_owed(earned: f64, commissions_paid: f64) -> f64 {
    earned - commissions_paid
}

/// Изменение оценки в процентах; 0 при нулевой исходной оценке
pub fn percent_change(initial_estimate: f64, revised_estimate: f64) -> f64 {
    if initial_estimate == 0.0 {
        return 0.0;
    }
    (revised_estimate - initial_estimate) / initial_estimate * 100.0
}

/// Комиссия с одного полученного чека
pub fn commission_from_check(
    check_amount: f64,
    fee_percentage: f64,
    commission_percentage: f64,
    split_percentage: f64,
) -> f64 {
    check_amount * pct(fee_percentage) * pct(commission_percentage) * pct(split_percentage)
}

/// Предпросмотр в форме добавления сделки (база: исходная оценка)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DealPreview {
    pub fee_earned: f64,
    pub commission_earned: f64,
}

pub fn deal_preview(
    initial_estimate: f64,
    fee_percentage: f64,
    commission_percentage: f64,
    split_percentage: f64,
) -> DealPreview {
    let fee = fee_earned(initial_estimate, fee_percentage);
    DealPreview {
        fee_earned: fee,
        commission_earned: commission_earned(fee, commission_percentage, split_percentage),
    }
}

/// Входные значения для расчета показателей одной записи
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CommissionInputs {
    pub initial_estimate: f64,
    pub revised_estimate: Option<f64>,
    pub checks_received_ytd: f64,
    pub fee_percentage: f64,
    pub commission_percentage: f64,
    pub split_percentage: Option<f64>,
    pub commissions_paid: f64,
}

impl CommissionInputs {
    pub fn revised(&self) -> f64 {
        self.revised_estimate.unwrap_or(self.initial_estimate)
    }

    pub fn split(&self) -> f64 {
        self.split_percentage.unwrap_or(DEFAULT_SPLIT_PERCENTAGE)
    }

    pub fn compute(&self) -> CommissionFigures {
        let revised = self.revised();
        let split = self.split();

        let fee_earned_so_far = fee_earned(self.checks_received_ytd, self.fee_percentage);
        let projected_total_fee = fee_earned(revised, self.fee_percentage);
        let earned = commission_earned(fee_earned_so_far, self.commission_percentage, split);
        let projected =
            commission_earned(projected_total_fee, self.commission_percentage, split);

        CommissionFigures {
            collection_progress: collection_progress(self.checks_received_ytd, revised),
            remainder: remainder(revised, self.checks_received_ytd),
            fee_earned_so_far,
            projected_total_fee,
            commission_earned: earned,
            projected_total_commission: projected,
            pending_commission: pending_commission(projected, earned),
            commission_owed: commission_owed(earned, self.commissions_paid),
            percent_change: percent_change(self.initial_estimate, revised),
        }
    }
}

impl From<&SalesCommission> for CommissionInputs {
    fn from(record: &SalesCommission) -> Self {
        Self {
            initial_estimate: record.initial_estimate,
            revised_estimate: record.revised_estimate,
            checks_received_ytd: record.insurance_checks_ytd,
            fee_percentage: record.fee_percentage,
            commission_percentage: record.commission_percentage,
            split_percentage: Some(record.split_percentage),
            commissions_paid: record.commissions_paid,
        }
    }
}

/// Рассчитанные показатели записи (отдаются вместе с записью)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CommissionFigures {
    pub collection_progress: f64,
    pub remainder: f64,
    pub fee_earned_so_far: f64,
    pub projected_total_fee: f64,
    pub commission_earned: f64,
    pub projected_total_commission: f64,
    pub pending_commission: f64,
    pub commission_owed: f64,
    pub percent_change: f64,
}

impl CommissionFigures {
    pub fn from_record(record: &SalesCommission) -> Self {
        CommissionInputs::from(record).compute()
    }
}
