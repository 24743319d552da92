pub mod attendance;
pub mod errors;
pub mod event;
pub mod payment;
pub mod user;

pub use attendance::{Attendance, PaymentStatus};
pub use errors::{DecisionError, ValidationErrors};
pub use event::{Event, EventDecision, EventDraft, Scope, ValidationState};
pub use payment::Payment;
pub use user::User;
