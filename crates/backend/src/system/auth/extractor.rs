use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use contracts::system::auth::TokenClaims;

use crate::shared::error::{unauthorized, ApiError};

/// Утверждения токена вошедшего пользователя: роль (директор или
/// представитель) и связанный продавец, по которому сервисы ограничивают
/// доступ к сделкам.
///
/// Кладутся в extensions запроса middleware `require_auth`/`require_director`;
/// без них обработчик отвечает 401 с телом `{ "error": ... }`.
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        match parts.extensions.get::<TokenClaims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => Err(unauthorized("Sign in to access the sales dashboard")),
        }
    }
}
