//! Participant and revenue figures derived from an event's attendances.
//!
//! Nothing here is cached: every figure is recomputed from the records it is
//! given. The database counterparts live in [`crate::db::events`].

use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Attendance, Payment, PaymentStatus};

const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub confirmed_participants: i64,
    pub pending_participants: i64,
    pub total_revenue: Decimal,
}

impl EventStats {
    pub fn participants_count(&self) -> i64 {
        self.confirmed_participants
    }
}

pub fn confirmed_participants_count(attendances: &[Attendance]) -> i64 {
    count_where(attendances, |status| status.is_confirmed())
}

pub fn pending_participants_count(attendances: &[Attendance]) -> i64 {
    count_where(attendances, |status| status == PaymentStatus::Pending)
}

/// Sum of payments attached to succeeded attendances, in major units.
pub fn total_revenue(attendances: &[Attendance], payments: &[Payment]) -> Decimal {
    let succeeded: HashSet<Uuid> = attendances
        .iter()
        .filter(|a| a.payment_status == PaymentStatus::Succeeded)
        .map(|a| a.id)
        .collect();

    let minor: i64 = payments
        .iter()
        .filter(|p| succeeded.contains(&p.attendance_id))
        .map(|p| p.amount)
        .sum();

    minor_to_major(minor)
}

pub fn stats(attendances: &[Attendance], payments: &[Payment]) -> EventStats {
    EventStats {
        confirmed_participants: confirmed_participants_count(attendances),
        pending_participants: pending_participants_count(attendances),
        total_revenue: total_revenue(attendances, payments),
    }
}

pub fn minor_to_major(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// Converts a price to minor units, dropping any fraction of a cent.
pub fn major_to_minor(major: Decimal) -> i64 {
    (major * Decimal::from(MINOR_UNITS_PER_MAJOR))
        .trunc()
        .to_i64()
        .unwrap_or(0)
}

fn count_where(attendances: &[Attendance], pred: impl Fn(PaymentStatus) -> bool) -> i64 {
    attendances.iter().filter(|a| pred(a.payment_status)).count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attendance(event_id: Uuid, status: PaymentStatus, amount_paid: i64) -> Attendance {
        Attendance {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            event_id,
            payment_status: status,
            amount_paid,
            created_at: Utc::now(),
        }
    }

    fn payment_for(attendance: &Attendance, amount: i64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            user_id: attendance.user_id,
            event_id: attendance.event_id,
            attendance_id: attendance.id,
            amount,
            status: "succeeded".to_string(),
            stripe_checkout_session_id: None,
            stripe_payment_intent_id: None,
            created_at: attendance.created_at,
        }
    }

    #[test]
    fn test_three_payments_of_2500_yield_75() {
        let event_id = Uuid::new_v4();
        let attendances: Vec<_> = (0..3)
            .map(|_| attendance(event_id, PaymentStatus::Succeeded, 2500))
            .collect();
        let payments: Vec<_> = attendances.iter().map(|a| payment_for(a, 2500)).collect();

        assert_eq!(total_revenue(&attendances, &payments), Decimal::from(75));
    }

    #[test]
    fn test_revenue_is_zero_without_succeeded_payments() {
        let event_id = Uuid::new_v4();
        let attendances = vec![
            attendance(event_id, PaymentStatus::Free, 0),
            attendance(event_id, PaymentStatus::Pending, 3500),
        ];

        assert_eq!(total_revenue(&attendances, &[]), Decimal::ZERO);
    }

    #[test]
    fn test_revenue_ignores_payments_of_non_succeeded_attendances() {
        let event_id = Uuid::new_v4();
        let paid = attendance(event_id, PaymentStatus::Succeeded, 1250);
        let pending = attendance(event_id, PaymentStatus::Pending, 1250);
        let payments = vec![payment_for(&paid, 1250), payment_for(&pending, 1250)];

        assert_eq!(
            total_revenue(&[paid, pending], &payments),
            Decimal::new(1250, 2)
        );
    }

    #[test]
    fn test_counts_partition_attendances() {
        let event_id = Uuid::new_v4();
        let attendances = vec![
            attendance(event_id, PaymentStatus::Succeeded, 2500),
            attendance(event_id, PaymentStatus::Free, 0),
            attendance(event_id, PaymentStatus::Pending, 2500),
            attendance(event_id, PaymentStatus::Succeeded, 2500),
        ];

        let stats = stats(&attendances, &[]);
        assert_eq!(stats.confirmed_participants, 3);
        assert_eq!(stats.pending_participants, 1);
        assert_eq!(stats.participants_count(), 3);
        assert_eq!(
            stats.confirmed_participants + stats.pending_participants,
            attendances.len() as i64
        );
    }

    #[test]
    fn test_minor_unit_conversions() {
        assert_eq!(minor_to_major(12000), Decimal::from(120));
        assert_eq!(major_to_minor(Decimal::new(2500, 2)), 2500);
        assert_eq!(major_to_minor(Decimal::new(19999, 3)), 1999);
        assert_eq!(major_to_minor(Decimal::ZERO), 0);
    }
}
