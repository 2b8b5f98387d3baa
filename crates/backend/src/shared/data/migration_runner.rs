use sea_orm::DatabaseConnection;
use sqlx::migrate::Migrator;

/// Миграции из `migrations/` в корне workspace, встроенные в бинарник
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_migrations(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let pool = conn.get_sqlite_connection_pool();
    MIGRATOR.run(pool).await?;
    tracing::info!(
        "Database migrations applied successfully ({} known)",
        MIGRATOR.iter().count()
    );
    Ok(())
}
