use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use contracts::domain::a001_sales_commission::splits::{client_key, validate_split_total};
use contracts::domain::a001_sales_commission::{SalesCommission, SalesCommissionDto};
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::common::AggregateRoot;
use contracts::enums::CommissionStatus;
use contracts::system::auth::TokenClaims;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u001_import_commissions::{
    ImportCommissions, ImportCommissionsRequest, ImportCommissionsResponse, ImportRow, SkippedRow,
};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::domain::{a001_sales_commission, a003_salesperson};
use crate::shared::error::ServiceError;
use crate::system::auth::access;

/// Строка, прошедшая разбор, или причина пропуска
fn build_record(
    row: &ImportRow,
    salespeople: &HashMap<String, SalespersonId>,
    actor: &TokenClaims,
) -> Result<SalesCommission, String> {
    if row.client_name.is_empty() {
        return Err("Missing client name".to_string());
    }
    if row.salesperson_name.is_empty() {
        return Err("Missing salesperson".to_string());
    }
    let salesperson_id = *salespeople
        .get(&row.salesperson_name.to_lowercase())
        .ok_or_else(|| format!("Unknown salesperson '{}'", row.salesperson_name))?;
    if access::ensure_owner(actor, salesperson_id).is_err() {
        return Err(format!(
            "Not permitted to import rows for '{}'",
            row.salesperson_name
        ));
    }
    let year = row
        .resolved_year()
        .ok_or_else(|| "Missing year or date signed".to_string())?;

    let dto = SalesCommissionDto {
        client_name: row.client_name.clone(),
        adjuster: row.adjuster.clone(),
        office: row.office.clone(),
        salesperson_id: None,
        date_signed: row.date_signed,
        year,
        initial_estimate: row.initial_estimate,
        revised_estimate: row.revised_estimate,
        insurance_checks_ytd: Some(row.insurance_checks_ytd),
        fee_percentage: row.fee_percentage,
        commission_percentage: row.commission_percentage,
        split_percentage: row.split_percentage,
        commissions_paid: Some(row.commissions_paid),
        status: Some(CommissionStatus::Imported),
        split_participants: Vec::new(),
    };
    let record = SalesCommission::new_for_insert(&dto, salesperson_id);
    record.validate()?;
    Ok(record)
}

/// Пакетная загрузка сделок.
///
/// Строки с неизвестным продавцом или некорректными данными пропускаются с
/// указанием причины. Если хоть одна группа клиента не проходит проверку
/// разделения, отклоняется весь пакет.
pub async fn import_rows(
    db: &DatabaseConnection,
    request: ImportCommissionsRequest,
    actor: &TokenClaims,
) -> Result<ImportCommissionsResponse> {
    tracing::info!(
        "{}: {} rows from {} by {}",
        ImportCommissions::full_name(),
        request.rows.len(),
        request.file_name.as_deref().unwrap_or("request"),
        actor.username
    );

    let salespeople: HashMap<String, SalespersonId> =
        a003_salesperson::repository::list(db, false)
            .await?
            .into_iter()
            .map(|s| (s.name.trim().to_lowercase(), s.id))
            .collect();

    let mut response = ImportCommissionsResponse::default();
    let mut records = Vec::new();

    for (index, raw) in request.rows.iter().enumerate() {
        let row = ImportRow::from_map(raw);
        match build_record(&row, &salespeople, actor) {
            Ok(record) => records.push(record),
            Err(reason) => response.skipped.push(SkippedRow {
                row_index: index + 1,
                reason,
            }),
        }
    }

    if records.is_empty() {
        tracing::warn!("{}: nothing to insert", ImportCommissions::full_name());
        return Ok(response);
    }

    // Проверка разделений по итоговым группам: уже сохраненные записи + пакет
    let clients: BTreeSet<String> = records
        .iter()
        .map(|r| client_key(&r.client_name))
        .collect();
    let mut existing = Vec::new();
    for client in &clients {
        existing.extend(a001_sales_commission::repository::find_by_client(db, client).await?);
    }
    let warnings = validate_split_total(
        existing
            .iter()
            .chain(records.iter())
            .map(|r| (r.client_name.as_str(), r.split_percentage)),
    )
    .map_err(|e| ServiceError::validation(format!("Import rejected: {}", e)))?;
    response.warnings = warnings.iter().map(ToString::to_string).collect();

    let txn = db.begin().await?;
    for record in records.iter_mut() {
        record.before_write();
        a001_sales_commission::repository::insert(&txn, record).await?;
    }
    txn.commit().await?;

    response.inserted_count = records.len();
    tracing::info!(
        "{}: inserted {}, skipped {}, warnings {}",
        ImportCommissions::full_name(),
        response.inserted_count,
        response.skipped.len(),
        response.warnings.len()
    );
    Ok(response)
}
