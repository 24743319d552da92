use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::accounting::major_to_minor;
use crate::db::payments::ProviderRefs;
use crate::models::{Event, PaymentStatus, User};

pub const MIN_PARTICIPANTS: usize = 3;
pub const MAX_PARTICIPANTS: usize = 10;

/// Chance, out of ten, that a registration to a priced event is paid.
const PAID_OUT_OF_TEN: u32 = 9;

#[derive(Debug, Clone)]
pub struct PlannedAttendance {
    pub user_id: Uuid,
    pub payment_status: PaymentStatus,
    pub amount_paid: i64,
    pub created_at: DateTime<Utc>,
    /// Present when a payment record has to back the attendance.
    pub payment: Option<ProviderRefs>,
}

/// Picks distinct non-admin participants for `event`, excluding its
/// organizer, and decides how each one paid.
pub fn plan_attendances<R: Rng + ?Sized>(
    event: &Event,
    users: &[User],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<PlannedAttendance> {
    let candidates: Vec<&User> = users
        .iter()
        .filter(|u| !u.admin && u.id != event.user_id)
        .collect();

    let wanted = rng.gen_range(MIN_PARTICIPANTS..=MAX_PARTICIPANTS);
    let amount = if event.is_free() {
        0
    } else {
        major_to_minor(event.price)
    };
    let window_start = now - Duration::weeks(1);

    let chosen: Vec<&User> = candidates.choose_multiple(rng, wanted).copied().collect();

    chosen
        .into_iter()
        .map(|user| {
            let payment_status = if event.is_free() {
                PaymentStatus::Free
            } else if rng.gen_range(1..=10) <= PAID_OUT_OF_TEN {
                PaymentStatus::Succeeded
            } else {
                PaymentStatus::Pending
            };

            let offset = rng.gen_range(0..=(now - window_start).num_seconds());
            let payment = (payment_status == PaymentStatus::Succeeded).then(|| ProviderRefs {
                checkout_session_id: format!("cs_test_{}", random_hex(rng, 12)),
                payment_intent_id: format!("pi_test_{}", random_hex(rng, 8)),
            });

            PlannedAttendance {
                user_id: user.id,
                payment_status,
                amount_paid: amount,
                created_at: window_start + Duration::seconds(offset),
                payment,
            }
        })
        .collect()
}

fn random_hex<R: Rng + ?Sized>(rng: &mut R, bytes: usize) -> String {
    (0..bytes).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}
