use axum::{extract::Multipart, Json};
use contracts::usecases::u001_import_commissions::{
    ImportCommissionsRequest, ImportCommissionsResponse,
};

use crate::shared::data::db::get_connection;
use crate::shared::error::{api_error, bad_request, ApiResult};
use crate::system::auth::extractor::CurrentUser;
use crate::usecases::u001_import_commissions::{csv_source, executor};

/// POST /api/u001/import (строки уже разобраны на клиенте)
pub async fn import_rows(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<ImportCommissionsRequest>,
) -> ApiResult<ImportCommissionsResponse> {
    executor::import_rows(get_connection(), request, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Import commissions", e))
}

/// POST /api/u001/import/csv (multipart, поле `file`)
pub async fn import_csv(
    CurrentUser(claims): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<ImportCommissionsResponse> {
    let mut upload: Option<(Option<String>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let text = field
            .text()
            .await
            .map_err(|e| bad_request(format!("Failed to read file: {}", e)))?;
        upload = Some((file_name, text));
    }

    let (file_name, text) = upload.ok_or_else(|| bad_request("No file uploaded"))?;
    let rows = csv_source::parse_csv(&text).map_err(|e| api_error("Parse CSV", e))?;

    let request = ImportCommissionsRequest { rows, file_name };
    executor::import_rows(get_connection(), request, &claims)
        .await
        .map(Json)
        .map_err(|e| api_error("Import commissions", e))
}
