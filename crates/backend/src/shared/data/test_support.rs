//! Вспомогательные функции для тестов сервисов: база в памяти и фабрики данных.

use chrono::Utc;
use contracts::domain::a001_sales_commission::{SalesCommission, SalesCommissionDto};
use contracts::domain::a003_salesperson::{Salesperson, SalespersonId};
use contracts::domain::common::AggregateId;
use contracts::enums::SalesRole;
use contracts::system::auth::TokenClaims;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use super::migration_runner;
use crate::domain::{a001_sales_commission, a003_salesperson};

/// Пустая база в памяти с примененными миграциями
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration_runner::run_migrations(&db).await.unwrap();
    db
}

pub async fn seed_salesperson(db: &DatabaseConnection, name: &str, role: SalesRole) -> Salesperson {
    let salesperson = Salesperson::new_for_insert(
        name.to_string(),
        Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        role,
        None,
    );
    a003_salesperson::repository::insert(db, &salesperson)
        .await
        .unwrap();
    salesperson
}

pub async fn seed_commission(
    db: &DatabaseConnection,
    salesperson_id: SalespersonId,
    client_name: &str,
    split_percentage: f64,
) -> SalesCommission {
    let dto = SalesCommissionDto {
        client_name: client_name.to_string(),
        year: 2024,
        initial_estimate: 100000.0,
        fee_percentage: 10.0,
        commission_percentage: 10.0,
        split_percentage: Some(split_percentage),
        ..Default::default()
    };
    let record = SalesCommission::new_for_insert(&dto, salesperson_id);
    a001_sales_commission::repository::insert(db, &record)
        .await
        .unwrap();
    record
}

fn claims(role: SalesRole, salesperson_id: Option<SalespersonId>) -> TokenClaims {
    let now = Utc::now().timestamp() as usize;
    TokenClaims {
        sub: uuid::Uuid::new_v4().to_string(),
        username: "tester".to_string(),
        role,
        salesperson_id: salesperson_id.map(|id| id.as_string()),
        exp: now + 3600,
        iat: now,
    }
}

pub fn director() -> TokenClaims {
    claims(SalesRole::SalesDirector, None)
}

pub fn rep(salesperson_id: SalespersonId) -> TokenClaims {
    claims(SalesRole::SalesRep, Some(salesperson_id))
}
