use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Free,
}

impl PaymentStatus {
    /// Paid or free registrations count as confirmed participants.
    pub fn is_confirmed(self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::Free)
    }
}

/// A user's registration for an event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub payment_status: PaymentStatus,
    /// Minor currency units.
    pub amount_paid: i64,
    pub created_at: DateTime<Utc>,
}
