use axum::{body::Body, extract::Request, http::{HeaderMap, StatusCode}, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;

use crate::shared::data::db::get_connection;

async fn claims_from_header(headers: &HeaderMap) -> Result<TokenClaims, StatusCode> {
    // Extract Authorization header
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check Bearer prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    super::jwt::validate_token(get_connection(), token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = claims_from_header(req.headers()).await?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires the sales director role
pub async fn require_director(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = claims_from_header(req.headers()).await?;

    if !claims.is_director() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
