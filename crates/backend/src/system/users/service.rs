use anyhow::Result;
use chrono::Utc;
use contracts::domain::a003_salesperson::SalespersonId;
use contracts::domain::common::AggregateId;
use contracts::enums::SalesRole;
use contracts::system::auth::TokenClaims;
use contracts::system::users::{ChangePasswordDto, CreateUserDto, UpdateUserDto, User, UserRole};
use sea_orm::{DatabaseConnection, TransactionTrait};

use super::repository;
use crate::domain::a001_sales_commission::service::ensure_salesperson_exists;
use crate::shared::error::{parse_optional_id, ServiceError};
use crate::system::auth::{access, password};

fn validate_email(email: &Option<String>) -> Result<()> {
    if let Some(email) = email {
        if !email.trim().is_empty() && !email.contains('@') {
            return Err(ServiceError::validation("Invalid email format"));
        }
    }
    Ok(())
}

/// Ссылка на продавца: у менеджера обязательна, у директора необязательна
async fn resolve_salesperson_link(
    db: &DatabaseConnection,
    role: SalesRole,
    raw: &Option<String>,
) -> Result<Option<String>> {
    let salesperson_id = parse_optional_id::<SalespersonId>(raw)?;
    match salesperson_id {
        Some(id) => {
            ensure_salesperson_exists(db, id).await?;
            Ok(Some(id.as_string()))
        }
        None if role == SalesRole::SalesRep => Err(ServiceError::validation(
            "A sales rep account must be linked to a salesperson",
        )),
        None => Ok(None),
    }
}

/// Create a new user
pub async fn create(
    db: &DatabaseConnection,
    dto: CreateUserDto,
    created_by: Option<String>,
) -> Result<String> {
    let username = dto.username.trim().to_string();
    if username.is_empty() {
        return Err(ServiceError::validation("Username cannot be empty"));
    }

    if repository::get_by_username(db, &username).await?.is_some() {
        return Err(ServiceError::conflict("Username already exists"));
    }

    validate_email(&dto.email)?;
    password::validate_password_strength(&dto.password).map_err(ServiceError::validation)?;
    let salesperson_id = resolve_salesperson_link(db, dto.role, &dto.salesperson_id).await?;

    let password_hash = password::hash_password(&dto.password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = User {
        id: user_id.clone(),
        username,
        email: dto.email,
        full_name: dto.full_name,
        is_active: true,
        role: dto.role,
        salesperson_id,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
        created_by,
    };

    let txn = db.begin().await?;
    repository::create_with_password(&txn, &user, &password_hash).await?;
    txn.commit().await?;

    tracing::info!("Created user '{}' ({})", user.username, user.role);
    Ok(user_id)
}

/// Update user
pub async fn update(db: &DatabaseConnection, dto: UpdateUserDto) -> Result<()> {
    let mut user = repository::get_by_id(db, &dto.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;

    validate_email(&dto.email)?;
    let salesperson_id = resolve_salesperson_link(db, dto.role, &dto.salesperson_id).await?;

    user.email = dto.email;
    user.full_name = dto.full_name;
    user.is_active = dto.is_active;
    user.role = dto.role;
    user.salesperson_id = salesperson_id;
    user.updated_at = Utc::now().to_rfc3339();

    let txn = db.begin().await?;
    repository::update(&txn, &user).await?;
    txn.commit().await?;

    Ok(())
}

/// Delete user
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<bool> {
    let txn = db.begin().await?;
    let deleted = repository::delete(&txn, id).await?;
    txn.commit().await?;
    Ok(deleted)
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    repository::get_by_id(db, id).await
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<User>> {
    repository::list_all(db).await
}

/// Role lookup used by token issuing
pub async fn get_user_role(db: &DatabaseConnection, user_id: &str) -> Result<Option<UserRole>> {
    repository::get_user_role(db, user_id).await
}

/// Change user password
pub async fn change_password(
    db: &DatabaseConnection,
    dto: ChangePasswordDto,
    requester: &TokenClaims,
) -> Result<()> {
    repository::get_by_id(db, &dto.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;

    if dto.user_id != requester.sub {
        // Changing someone else's password: directors only, no old password needed
        access::ensure_director(requester, "change other users' passwords")?;
    } else {
        let old_password = dto
            .old_password
            .as_deref()
            .ok_or_else(|| ServiceError::validation("Old password is required"))?;
        let current_hash = repository::get_password_hash(db, &dto.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Password hash"))?;

        if !password::verify_password(old_password, &current_hash)? {
            return Err(ServiceError::validation("Invalid old password"));
        }
    }

    password::validate_password_strength(&dto.new_password).map_err(ServiceError::validation)?;
    let new_hash = password::hash_password(&dto.new_password)?;
    repository::update_password(db, &dto.user_id, &new_hash).await?;

    Ok(())
}

/// Verify user credentials (for login)
pub async fn verify_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let user = match repository::get_by_username(db, username.trim()).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if !user.is_active {
        return Ok(None);
    }

    let password_hash = repository::get_password_hash(db, &user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        return Ok(None);
    }

    if let Err(e) = repository::update_last_login(db, &user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.username, e);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::test_support::{director, seed_salesperson, test_db};

    fn create_dto(username: &str, role: SalesRole, salesperson_id: Option<String>) -> CreateUserDto {
        CreateUserDto {
            username: username.into(),
            password: "password123".into(),
            email: Some(format!("{}@example.com", username)),
            full_name: None,
            role,
            salesperson_id,
        }
    }

    #[tokio::test]
    async fn create_and_verify_rep() {
        let db = test_db().await;
        let dana = seed_salesperson(&db, "Dana", SalesRole::SalesRep).await;

        let id = create(
            &db,
            create_dto("dana", SalesRole::SalesRep, Some(dana.id.as_string())),
            None,
        )
        .await
        .unwrap();

        let role = get_user_role(&db, &id).await.unwrap().unwrap();
        assert_eq!(role.role, SalesRole::SalesRep);
        assert_eq!(role.salesperson_id, Some(dana.id.as_string()));

        let user = verify_credentials(&db, "dana", "password123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, SalesRole::SalesRep);
        assert!(verify_credentials(&db, "dana", "wrong-pass1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rep_requires_salesperson_and_unique_username() {
        let db = test_db().await;
        let err = create(&db, create_dto("eli", SalesRole::SalesRep, None), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));

        create(&db, create_dto("boss", SalesRole::SalesDirector, None), None)
            .await
            .unwrap();
        let err = create(&db, create_dto("boss", SalesRole::SalesDirector, None), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn inactive_users_cannot_log_in() {
        let db = test_db().await;
        let id = create(&db, create_dto("boss", SalesRole::SalesDirector, None), None)
            .await
            .unwrap();
        update(
            &db,
            UpdateUserDto {
                id: id.clone(),
                email: None,
                full_name: Some("The Boss".into()),
                is_active: false,
                role: SalesRole::SalesDirector,
                salesperson_id: None,
            },
        )
        .await
        .unwrap();

        assert!(verify_credentials(&db, "boss", "password123")
            .await
            .unwrap()
            .is_none());
        let users = list_all(&db).await.unwrap();
        assert_eq!(users[0].full_name.as_deref(), Some("The Boss"));
    }

    #[tokio::test]
    async fn director_resets_password_without_old_one() {
        let db = test_db().await;
        let id = create(&db, create_dto("boss", SalesRole::SalesDirector, None), None)
            .await
            .unwrap();

        change_password(
            &db,
            ChangePasswordDto {
                user_id: id,
                old_password: None,
                new_password: "newpassword9".into(),
            },
            &director(),
        )
        .await
        .unwrap();

        assert!(verify_credentials(&db, "boss", "newpassword9")
            .await
            .unwrap()
            .is_some());
    }
}
