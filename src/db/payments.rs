use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payment::PAYMENT_SUCCEEDED;
use crate::models::{Attendance, Payment};

/// External references issued by the payment provider.
#[derive(Debug, Clone)]
pub struct ProviderRefs {
    pub checkout_session_id: String,
    pub payment_intent_id: String,
}

/// Records the succeeded payment backing `attendance`.
pub async fn insert_succeeded(
    pool: &PgPool,
    attendance: &Attendance,
    amount: i64,
    refs: ProviderRefs,
) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (id, user_id, event_id, attendance_id, amount, status,
                               stripe_checkout_session_id, stripe_payment_intent_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(attendance.user_id)
    .bind(attendance.event_id)
    .bind(attendance.id)
    .bind(amount)
    .bind(PAYMENT_SUCCEEDED)
    .bind(refs.checkout_session_id)
    .bind(refs.payment_intent_id)
    .bind(attendance.created_at)
    .fetch_one(pool)
    .await
}

