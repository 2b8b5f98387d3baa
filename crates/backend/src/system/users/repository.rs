use anyhow::{Context, Result};
use contracts::enums::SalesRole;
use contracts::system::users::{User, UserRole};
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement};

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.full_name, u.is_active, \
     COALESCE(r.role, 'sales_rep') AS role, r.salesperson_id, \
     u.created_at, u.updated_at, u.last_login_at, u.created_by \
     FROM sys_users u LEFT JOIN sys_user_roles r ON r.user_id = u.id";

fn user_from_row(row: &QueryResult) -> Result<User> {
    let role: String = row.try_get("", "role")?;
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        email: row.try_get("", "email")?,
        full_name: row.try_get("", "full_name")?,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        role: SalesRole::from_code(&role).unwrap_or(SalesRole::SalesRep),
        salesperson_id: row.try_get("", "salesperson_id")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
        created_by: row.try_get("", "created_by")?,
    })
}

/// Create user with password hash and role row
pub async fn create_with_password<C: ConnectionTrait>(
    db: &C,
    user: &User,
    password_hash: &str,
) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_users (id, username, email, password_hash, full_name, is_active, created_at, updated_at, last_login_at, created_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.username.clone().into(),
            user.email.clone().into(),
            password_hash.to_string().into(),
            user.full_name.clone().into(),
            (if user.is_active { 1 } else { 0 }).into(),
            user.created_at.clone().into(),
            user.updated_at.clone().into(),
            user.last_login_at.clone().into(),
            user.created_by.clone().into(),
        ],
    ))
    .await
    .context("Failed to insert user")?;

    set_user_role(db, &user.id, user.role, user.salesperson_id.clone()).await
}

/// Insert or replace the role row of a user
pub async fn set_user_role<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    role: SalesRole,
    salesperson_id: Option<String>,
) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR REPLACE INTO sys_user_roles (user_id, role, salesperson_id) VALUES (?, ?, ?)",
        [
            user_id.to_string().into(),
            role.as_str().into(),
            salesperson_id.into(),
        ],
    ))
    .await
    .context("Failed to store user role")?;

    Ok(())
}

/// Role lookup: role and linked salesperson of a user
pub async fn get_user_role<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Option<UserRole>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT user_id, role, salesperson_id FROM sys_user_roles WHERE user_id = ?",
            [user_id.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let role: String = row.try_get("", "role")?;
            Ok(Some(UserRole {
                user_id: row.try_get("", "user_id")?,
                role: SalesRole::from_code(&role).unwrap_or(SalesRole::SalesRep),
                salesperson_id: row.try_get("", "salesperson_id")?,
            }))
        }
        None => Ok(None),
    }
}

/// Get user by ID
pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<User>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} WHERE u.id = ?", USER_COLUMNS),
            [id.into()],
        ))
        .await?;

    result.as_ref().map(user_from_row).transpose()
}

/// Get user by username
pub async fn get_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<User>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {} WHERE u.username = ?", USER_COLUMNS),
            [username.into()],
        ))
        .await?;

    result.as_ref().map(user_from_row).transpose()
}

/// Get password hash for user
pub async fn get_password_hash<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Option<String>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let hash: String = row.try_get("", "password_hash")?;
            Ok(Some(hash))
        }
        None => Ok(None),
    }
}

/// List all users
pub async fn list_all<C: ConnectionTrait>(db: &C) -> Result<Vec<User>> {
    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT {} ORDER BY u.created_at DESC", USER_COLUMNS),
        ))
        .await?;

    rows.iter().map(user_from_row).collect()
}

/// Update user and role
pub async fn update<C: ConnectionTrait>(db: &C, user: &User) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users
         SET email = ?, full_name = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
        [
            user.email.clone().into(),
            user.full_name.clone().into(),
            (if user.is_active { 1 } else { 0 }).into(),
            user.updated_at.clone().into(),
            user.id.clone().into(),
        ],
    ))
    .await
    .context("Failed to update user")?;

    set_user_role(db, &user.id, user.role, user.salesperson_id.clone()).await
}

/// Delete user (hard delete)
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "DELETE FROM sys_user_roles WHERE user_id = ?",
        [id.into()],
    ))
    .await
    .context("Failed to delete user role")?;

    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "DELETE FROM sys_users WHERE id = ?",
            [id.into()],
        ))
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected() > 0)
}

/// Update last login timestamp
pub async fn update_last_login<C: ConnectionTrait>(db: &C, id: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();

    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users SET last_login_at = ? WHERE id = ?",
        [now.into(), id.to_string().into()],
    ))
    .await
    .context("Failed to update last login")?;

    Ok(())
}

/// Count total users
pub async fn count_users<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let result = db
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users".to_string(),
        ))
        .await?;

    match result {
        Some(row) => {
            let count: i64 = row.try_get("", "count")?;
            Ok(count as usize)
        }
        None => Ok(0),
    }
}

/// Update user password
pub async fn update_password<C: ConnectionTrait>(db: &C, id: &str, password_hash: &str) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users SET password_hash = ?, updated_at = ? WHERE id = ?",
        [
            password_hash.to_string().into(),
            chrono::Utc::now().to_rfc3339().into(),
            id.to_string().into(),
        ],
    ))
    .await
    .context("Failed to update password")?;

    Ok(())
}
