//! Разбор одной строки импорта.
//!
//! Заголовки сравниваются без учета регистра, пробелов и знаков препинания,
//! так что "Client Name", "client_name" и "CLIENT-NAME" считаются одной колонка.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::shared::money::parse_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportColumn {
    ClientName,
    Adjuster,
    Office,
    Salesperson,
    DateSigned,
    Year,
    InitialEstimate,
    RevisedEstimate,
    InsuranceChecksYtd,
    FeePercentage,
    CommissionPercentage,
    SplitPercentage,
    CommissionsPaid,
}

impl ImportColumn {
    pub fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '%')
            .flat_map(char::to_lowercase)
            .collect();

        let column = match key.as_str() {
            "client" | "clientname" => Self::ClientName,
            "adjuster" => Self::Adjuster,
            "office" => Self::Office,
            "salesperson" | "salespersonname" | "salesrep" | "rep" => Self::Salesperson,
            "datesigned" | "signed" => Self::DateSigned,
            "year" => Self::Year,
            "initialestimate" | "initial" => Self::InitialEstimate,
            "revisedestimate" | "revised" => Self::RevisedEstimate,
            "insurancechecksytd" | "checksytd" | "insurancechecks" => Self::InsuranceChecksYtd,
            "fee%" | "fee" | "feepercentage" => Self::FeePercentage,
            "commission%" | "commissionpercentage" | "comm%" => Self::CommissionPercentage,
            "split%" | "split" | "splitpercentage" => Self::SplitPercentage,
            "commissionspaid" | "paid" => Self::CommissionsPaid,
            _ => return None,
        };
        Some(column)
    }
}

/// Строка после приведения типов
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportRow {
    pub client_name: String,
    pub adjuster: Option<String>,
    pub office: Option<String>,
    pub salesperson_name: String,
    pub date_signed: Option<NaiveDate>,
    pub year: Option<i32>,
    pub initial_estimate: f64,
    pub revised_estimate: Option<f64>,
    pub insurance_checks_ytd: f64,
    pub fee_percentage: f64,
    pub commission_percentage: f64,
    pub split_percentage: Option<f64>,
    pub commissions_paid: f64,
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];

/// Дата в одном из распространенных форматов
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

impl ImportRow {
    pub fn from_map(raw: &HashMap<String, String>) -> Self {
        let mut row = ImportRow::default();

        for (header, value) in raw {
            let Some(column) = ImportColumn::from_header(header) else {
                continue;
            };
            let text = value.trim();
            let optional_text = (!text.is_empty()).then(|| text.to_string());

            match column {
                ImportColumn::ClientName => row.client_name = text.to_string(),
                ImportColumn::Adjuster => row.adjuster = optional_text,
                ImportColumn::Office => row.office = optional_text,
                ImportColumn::Salesperson => row.salesperson_name = text.to_string(),
                ImportColumn::DateSigned => row.date_signed = parse_date(text),
                ImportColumn::Year => row.year = text.parse::<i32>().ok(),
                ImportColumn::InitialEstimate => row.initial_estimate = parse_amount(text),
                ImportColumn::RevisedEstimate => {
                    row.revised_estimate = optional_text.map(|v| parse_amount(&v))
                }
                ImportColumn::InsuranceChecksYtd => row.insurance_checks_ytd = parse_amount(text),
                ImportColumn::FeePercentage => row.fee_percentage = parse_amount(text),
                ImportColumn::CommissionPercentage => {
                    row.commission_percentage = parse_amount(text)
                }
                ImportColumn::SplitPercentage => {
                    row.split_percentage = optional_text.map(|v| parse_amount(&v))
                }
                ImportColumn::CommissionsPaid => row.commissions_paid = parse_amount(text),
            }
        }

        row
    }

    /// Год сделки: явная колонка, иначе год подписания
    pub fn resolved_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.year.or_else(|| self.date_signed.map(|d| d.year()))
    }
}
