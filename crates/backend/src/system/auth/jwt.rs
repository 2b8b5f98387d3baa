use anyhow::{Context, Result};
use chrono::Utc;
use contracts::enums::SalesRole;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::config::auth_settings;

const JWT_SECRET_KEY: &str = "jwt_secret";

/// Generate JWT access token; lifetime comes from `[auth] access_token_hours`
pub async fn generate_access_token(
    db: &DatabaseConnection,
    user_id: &str,
    username: &str,
    role: SalesRole,
    salesperson_id: Option<String>,
) -> Result<String> {
    let now = Utc::now();
    let lifetime = chrono::Duration::hours(auth_settings().access_token_hours);
    let exp = (now + lifetime).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        salesperson_id,
        exp,
        iat,
    };

    let secret = get_jwt_secret(db).await?;
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")?;

    Ok(token)
}

/// Validate JWT token and extract claims
pub async fn validate_token(db: &DatabaseConnection, token: &str) -> Result<TokenClaims> {
    let secret = get_jwt_secret(db).await?;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// Generate refresh token (UUID-based)
pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Get or create JWT secret from database
pub async fn get_jwt_secret(db: &DatabaseConnection) -> Result<String> {
    match get_jwt_secret_from_db(db).await {
        Ok(Some(secret)) => Ok(secret),
        Ok(None) | Err(_) => {
            let secret = generate_jwt_secret();
            if let Err(e) = save_jwt_secret_to_db(db, &secret).await {
                tracing::error!("Failed to store JWT secret: {}", e);
            }
            Ok(secret)
        }
    }
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db(db: &DatabaseConnection) -> Result<Option<String>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let secret: String = row.try_get("", "value")?;
            Ok(Some(secret))
        }
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(db: &DatabaseConnection, secret: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR REPLACE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            JWT_SECRET_KEY.into(),
            secret.to_string().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await?;

    Ok(())
}

/// Calculate refresh token expiration timestamp
pub fn calculate_refresh_token_expiration() -> String {
    let exp = Utc::now() + chrono::Duration::days(auth_settings().refresh_token_days);
    exp.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::test_db;

    #[tokio::test]
    async fn token_round_trip_keeps_role_and_link() {
        let db = test_db().await;
        let token = generate_access_token(
            &db,
            "user-1",
            "dana",
            SalesRole::SalesRep,
            Some("sp-1".into()),
        )
        .await
        .unwrap();

        let claims = validate_token(&db, &token).await.unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, SalesRole::SalesRep);
        assert_eq!(claims.salesperson_id.as_deref(), Some("sp-1"));
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn secret_is_persisted_once() {
        let db = test_db().await;
        let first = get_jwt_secret(&db).await.unwrap();
        let second = get_jwt_secret(&db).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let db = test_db().await;
        let token = generate_access_token(&db, "u", "dana", SalesRole::SalesDirector, None)
            .await
            .unwrap();
        let tampered = format!("{}x", token);
        assert!(validate_token(&db, &tampered).await.is_err());
    }
}
