//! Ошибки сервисов и их отображение в HTTP-ответы.

use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_sales_commission::SplitError;
use contracts::domain::common::AggregateId;
use serde_json::{json, Value};
use thiserror::Error;

/// Типизированные ошибки бизнес-логики.
///
/// Сервисы возвращают `anyhow::Result`; обработчики достают `ServiceError`
/// через `downcast_ref`, все остальное считается внутренней ошибкой.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> anyhow::Error {
        ServiceError::Validation(message.into()).into()
    }

    pub fn not_found(what: impl Into<String>) -> anyhow::Error {
        ServiceError::NotFound(what.into()).into()
    }

    pub fn forbidden(message: impl Into<String>) -> anyhow::Error {
        ServiceError::Forbidden(message.into()).into()
    }

    pub fn conflict(message: impl Into<String>) -> anyhow::Error {
        ServiceError::Conflict(message.into()).into()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<SplitError> for ServiceError {
    fn from(e: SplitError) -> Self {
        ServiceError::Validation(e.to_string())
    }
}

/// Ответ с ошибкой: статус и тело `{ "error": ... }`
pub type ApiError = (StatusCode, Json<Value>);

pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Преобразует ошибку сервиса в HTTP-ответ
pub fn api_error(context: &str, err: anyhow::Error) -> ApiError {
    if let Some(service_error) = err.downcast_ref::<ServiceError>() {
        let status = service_error.status_code();
        tracing::warn!("{}: {} ({})", context, service_error, status.as_u16());
        return error_body(status, service_error.to_string());
    }
    if let Some(split_error) = err.downcast_ref::<SplitError>() {
        tracing::warn!("{}: {}", context, split_error);
        return error_body(StatusCode::UNPROCESSABLE_ENTITY, split_error.to_string());
    }

    tracing::error!("{}: {:#}", context, err);
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    error_body(StatusCode::BAD_REQUEST, message)
}

pub fn unauthorized(message: impl Into<String>) -> ApiError {
    error_body(StatusCode::UNAUTHORIZED, message)
}

/// Разбор идентификатора из пути; некорректный UUID дает 400
pub fn parse_id<T: AggregateId>(raw: &str) -> Result<T, ApiError> {
    T::from_string(raw).map_err(bad_request)
}

/// Разбор необязательного идентификатора из тела запроса (ошибка валидации)
pub fn parse_optional_id<T: AggregateId>(raw: &Option<String>) -> anyhow::Result<Option<T>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => T::from_string(value)
            .map(Some)
            .map_err(ServiceError::validation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a003_salesperson::SalespersonId;

    #[test]
    fn service_errors_map_to_status_codes() {
        let (status, body) = api_error("test", ServiceError::validation("Client name is required"));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.0["error"], "Client name is required");

        let (status, _) = api_error("test", ServiceError::not_found("Sales commission"));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = api_error("test", ServiceError::forbidden("nope"));
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = api_error("test", ServiceError::conflict("dup"));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = api_error("test", anyhow::anyhow!("disk on fire"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["error"], "Internal server error");
    }

    #[test]
    fn split_errors_are_validation_errors() {
        let err = anyhow::Error::from(SplitError::TotalNot100 { total: 90.0 });
        let (status, body) = api_error("splits", err);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body.0["error"],
            "Split percentages must total 100% (currently 90%)"
        );
    }

    #[test]
    fn ids_are_parsed() {
        assert!(parse_id::<SalespersonId>("not-a-uuid").is_err());
        let (status, _) = parse_id::<SalespersonId>("x").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(parse_optional_id::<SalespersonId>(&None).unwrap(), None);
        assert_eq!(parse_optional_id::<SalespersonId>(&Some(" ".into())).unwrap(), None);
        assert!(parse_optional_id::<SalespersonId>(&Some("bad".into())).is_err());
    }
}
