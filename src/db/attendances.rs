use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Attendance, PaymentStatus};

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    event_id: Uuid,
    payment_status: PaymentStatus,
    amount_paid: i64,
    created_at: DateTime<Utc>,
) -> Result<Attendance, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(
        "INSERT INTO attendances (id, user_id, event_id, payment_status, amount_paid, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(event_id)
    .bind(payment_status)
    .bind(amount_paid)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM attendances")
        .fetch_one(pool)
        .await
}

pub async fn count_confirmed(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM attendances WHERE payment_status IN ('succeeded', 'free')",
    )
    .fetch_one(pool)
    .await
}

pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM attendances WHERE payment_status = 'pending'")
        .fetch_one(pool)
        .await
}
