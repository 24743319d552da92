use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

pub mod attendances;
pub mod events;
pub mod payments;
pub mod users;

/// Opens the connection pool and applies pending migrations.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Successfully connected to database");

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("Migrations run successfully");

    Ok(pool)
}

/// Clears every table, dependents first, in a single transaction.
pub async fn reset(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for table in ["payments", "attendances", "events", "users"] {
        let deleted = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!(table, deleted, "Table cleared");
    }

    tx.commit().await
}
