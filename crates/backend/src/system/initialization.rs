use anyhow::Result;
use chrono::Utc;
use contracts::enums::SalesRole;
use contracts::system::users::User;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::system::auth::password;
use crate::system::users::repository;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";

/// Ensure a director account exists (create admin/admin if the user table is empty).
/// Returns the id of the created user.
pub async fn ensure_admin_user_exists(db: &DatabaseConnection) -> Result<Option<String>> {
    let count = repository::count_users(db).await?;
    if count > 0 {
        return Ok(None);
    }

    tracing::info!("No users found. Creating default director account...");

    // admin/admin не проходит проверку сложности пароля: пишем напрямую в репозиторий
    let now = Utc::now().to_rfc3339();
    let admin = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: DEFAULT_USERNAME.to_string(),
        email: None,
        full_name: Some("Sales Director".to_string()),
        is_active: true,
        role: SalesRole::SalesDirector,
        salesperson_id: None,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
        created_by: None,
    };
    let password_hash = password::hash_password(DEFAULT_PASSWORD)?;

    let txn = db.begin().await?;
    repository::create_with_password(&txn, &admin, &password_hash).await?;
    txn.commit().await?;

    tracing::warn!("═══════════════════════════════════════════════");
    tracing::warn!("  Default director account created!");
    tracing::warn!("  Username: {}", DEFAULT_USERNAME);
    tracing::warn!("  Password: {}", DEFAULT_PASSWORD);
    tracing::warn!("  User ID: {}", admin.id);
    tracing::warn!("  ⚠️  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
    tracing::warn!("═══════════════════════════════════════════════");

    Ok(Some(admin.id))
}
