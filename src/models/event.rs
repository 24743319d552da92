use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::errors::{DecisionError, ValidationErrors};

pub const TITLE_MIN_LENGTH: usize = 5;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MIN_LENGTH: usize = 10;

const BLANK: &str = "can't be blank";
const IN_THE_PAST: &str = "ne peut pas être dans le passé";

/// Administrative review outcome. Persisted as a nullable boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationState {
    #[default]
    Pending,
    Validated,
    Rejected,
}

impl ValidationState {
    pub fn label(self) -> &'static str {
        match self {
            ValidationState::Pending => "En attente",
            ValidationState::Validated => "Validé",
            ValidationState::Rejected => "Refusé",
        }
    }

    pub fn as_flag(self) -> Option<bool> {
        match self {
            ValidationState::Pending => None,
            ValidationState::Validated => Some(true),
            ValidationState::Rejected => Some(false),
        }
    }
}

impl From<Option<bool>> for ValidationState {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => ValidationState::Pending,
            Some(true) => ValidationState::Validated,
            Some(false) => ValidationState::Rejected,
        }
    }
}

/// An administrator's verdict on a pending event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDecision {
    Validate,
    Reject,
}

impl EventDecision {
    fn outcome(self) -> ValidationState {
        match self {
            EventDecision::Validate => ValidationState::Validated,
            EventDecision::Reject => ValidationState::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    /// Organizing user.
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    /// Minutes.
    pub duration: i32,
    pub price: Decimal,
    pub location: String,
    #[sqlx(rename = "validated", try_from = "Option<bool>")]
    pub validation: ValidationState,
    pub validated_by: Option<Uuid>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Validates the draft and builds a pending event from it.
    pub fn from_draft(
        organizer: Uuid,
        draft: EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationErrors> {
        draft.validate(now)?;

        let (Some(start_date), Some(duration), Some(price)) =
            (draft.start_date, draft.duration, draft.price)
        else {
            let mut missing = ValidationErrors::new();
            missing.add("base", "incomplete event attributes");
            return Err(missing);
        };

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: organizer,
            title: draft.title,
            description: draft.description,
            start_date,
            duration,
            price,
            location: draft.location,
            validation: ValidationState::Pending,
            validated_by: None,
            validated_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable attributes. The draft is validated against `now`
    /// so an edit cannot move the start into the past.
    pub fn apply(&mut self, draft: EventDraft, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let updated = Event::from_draft(self.user_id, draft, now)?;

        self.title = updated.title;
        self.description = updated.description;
        self.start_date = updated.start_date;
        self.duration = updated.duration;
        self.price = updated.price;
        self.location = updated.location;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.validation == ValidationState::Pending
    }

    pub fn is_validated(&self) -> bool {
        self.validation == ValidationState::Validated
    }

    pub fn is_rejected(&self) -> bool {
        self.validation == ValidationState::Rejected
    }

    pub fn validation_status(&self) -> &'static str {
        self.validation.label()
    }

    /// Only pending events that have not started yet can be reviewed.
    pub fn can_be_validated(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.start_date > now
    }

    /// Records the administrator's verdict. The outcome is final.
    ///
    /// `at` is the review time, which may predate the write; `updated_at` is
    /// left to the store.
    pub fn decide(
        &mut self,
        admin: Uuid,
        decision: EventDecision,
        at: DateTime<Utc>,
    ) -> Result<(), DecisionError> {
        if !self.is_pending() {
            return Err(DecisionError::AlreadyDecided);
        }
        if !self.can_be_validated(at) {
            return Err(DecisionError::AlreadyStarted);
        }

        self.validation = decision.outcome();
        self.validated_by = Some(admin);
        self.validated_at = Some(at);
        Ok(())
    }

    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    pub fn full_price_with_currency(&self) -> String {
        format!("{:.2}€", self.price)
    }

    pub fn formatted_start_date(&self) -> String {
        self.start_date.format("%d/%m/%Y à %H:%M").to_string()
    }

    pub fn duration_in_hours(&self) -> f64 {
        f64::from(self.duration) / 60.0
    }
}

/// Editable attributes of an event, as submitted by its organizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub location: String,
}

impl EventDraft {
    /// Runs every attribute rule and returns all failures at once.
    ///
    /// The start date is checked against `now` on each call, so a write with
    /// a past start is always rejected while rows already stored are never
    /// re-checked.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_length(
            &mut errors,
            "title",
            &self.title,
            TITLE_MIN_LENGTH,
            Some(TITLE_MAX_LENGTH),
        );
        validate_length(
            &mut errors,
            "description",
            &self.description,
            DESCRIPTION_MIN_LENGTH,
            None,
        );

        match self.start_date {
            None => errors.add("start_date", BLANK),
            Some(start) if start < now => errors.add("start_date", IN_THE_PAST),
            Some(_) => {}
        }

        match self.duration {
            None => errors.add("duration", BLANK),
            Some(minutes) if minutes <= 0 => errors.add("duration", "must be greater than 0"),
            Some(_) => {}
        }

        match self.price {
            None => errors.add("price", BLANK),
            Some(price) if price < Decimal::ZERO => {
                errors.add("price", "must be greater than or equal to 0")
            }
            Some(_) => {}
        }

        if is_blank(&self.location) {
            errors.add("location", BLANK);
        }

        errors.into_result()
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: Some(event.start_date),
            duration: Some(event.duration),
            price: Some(event.price),
            location: event.location.clone(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn validate_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) {
    if is_blank(value) {
        errors.add(field, BLANK);
    }

    let length = value.chars().count();
    if length < min {
        errors.add(field, format!("is too short (minimum is {} characters)", min));
    }
    if let Some(max) = max {
        if length > max {
            errors.add(field, format!("is too long (maximum is {} characters)", max));
        }
    }
}

/// Named read filters over the event collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Pending,
    Validated,
    Rejected,
    Upcoming,
    Past,
}

impl Scope {
    pub fn matches(self, event: &Event, now: DateTime<Utc>) -> bool {
        match self {
            Scope::Pending => event.is_pending(),
            Scope::Validated => event.is_validated(),
            Scope::Rejected => event.is_rejected(),
            Scope::Upcoming => event.start_date > now,
            Scope::Past => event.start_date < now,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Pending => "pending",
            Scope::Validated => "validated",
            Scope::Rejected => "rejected",
            Scope::Upcoming => "upcoming",
            Scope::Past => "past",
        }
    }

    /// Parses a comma-separated scope list such as `validated,upcoming`.
    pub fn parse_list(raw: &str) -> Result<Vec<Scope>, ValidationErrors> {
        let mut scopes = Vec::new();
        let mut errors = ValidationErrors::new();

        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.parse::<Scope>() {
                Ok(scope) if !scopes.contains(&scope) => scopes.push(scope),
                Ok(_) => {}
                Err(unknown) => errors.add("scope", format!("'{}' is not a known scope", unknown.0)),
            }
        }

        errors.into_result().map(|()| scopes)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Scope::Pending),
            "validated" => Ok(Scope::Validated),
            "rejected" => Ok(Scope::Rejected),
            "upcoming" => Ok(Scope::Upcoming),
            "past" => Ok(Scope::Past),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Concert Jazz Fusion".to_string(),
            description: "Soirée jazz avec le quartet 'Fusion Elements'.".to_string(),
            start_date: Some(now() + Duration::days(10)),
            duration: Some(180),
            price: Some(Decimal::new(3500, 2)),
            location: "Le Blue Note, Paris".to_string(),
        }
    }

    fn event() -> Event {
        Event::from_draft(Uuid::new_v4(), draft(), now()).unwrap()
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().validate(now()).is_ok());
    }

    #[test]
    fn test_title_length_boundaries() {
        let mut d = draft();
        d.title = "Jazz".to_string();
        let errors = d.validate(now()).unwrap_err();
        assert_eq!(
            errors.messages("title"),
            ["is too short (minimum is 5 characters)".to_string()]
        );

        d.title = "Jazzy".to_string();
        assert!(d.validate(now()).is_ok());

        d.title = "x".repeat(101);
        let errors = d.validate(now()).unwrap_err();
        assert_eq!(
            errors.messages("title"),
            ["is too long (maximum is 100 characters)".to_string()]
        );

        d.title = "x".repeat(100);
        assert!(d.validate(now()).is_ok());
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let mut d = draft();
        d.title = "Fête!".to_string();
        assert!(d.validate(now()).is_ok());
    }

    #[test]
    fn test_blank_fields_are_reported_together() {
        let errors = EventDraft::default().validate(now()).unwrap_err();

        for field in ["title", "description", "start_date", "duration", "price", "location"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
        assert!(errors
            .messages("title")
            .contains(&"can't be blank".to_string()));
    }

    #[test]
    fn test_description_minimum_length() {
        let mut d = draft();
        d.description = "Trop court".chars().take(9).collect();
        assert!(d.validate(now()).unwrap_err().contains("description"));

        d.description = "Dix chars!".to_string();
        assert!(d.validate(now()).is_ok());
    }

    #[test]
    fn test_duration_and_price_bounds() {
        let mut d = draft();
        d.duration = Some(0);
        d.price = Some(Decimal::new(-1, 2));
        let errors = d.validate(now()).unwrap_err();
        assert_eq!(errors.messages("duration"), ["must be greater than 0".to_string()]);
        assert_eq!(
            errors.messages("price"),
            ["must be greater than or equal to 0".to_string()]
        );

        d.duration = Some(1);
        d.price = Some(Decimal::ZERO);
        assert!(d.validate(now()).is_ok());
    }

    #[test]
    fn test_past_start_date_is_rejected() {
        let mut d = draft();
        d.start_date = Some(now() - Duration::seconds(1));
        let errors = d.validate(now()).unwrap_err();
        assert_eq!(
            errors.messages("start_date"),
            ["ne peut pas être dans le passé".to_string()]
        );

        d.start_date = Some(now());
        assert!(d.validate(now()).is_ok());
    }

    #[test]
    fn test_stored_event_is_not_revalidated_until_saved_again() {
        let mut e = event();
        let later = e.start_date + Duration::hours(1);

        // Loading or inspecting an elapsed event is fine.
        assert!(!e.can_be_validated(later));
        assert!(Scope::Past.matches(&e, later));

        // Saving it again is not.
        let errors = e.apply(EventDraft::from(&e), later).unwrap_err();
        assert!(errors.contains("start_date"));
    }

    #[test]
    fn test_new_event_is_pending() {
        let e = event();
        assert!(e.is_pending());
        assert!(!e.is_validated());
        assert!(!e.is_rejected());
        assert_eq!(e.validation_status(), "En attente");
        assert!(e.validated_by.is_none());
    }

    #[test]
    fn test_exactly_one_state_holds() {
        for flag in [None, Some(true), Some(false)] {
            let mut e = event();
            e.validation = ValidationState::from(flag);
            let held = [e.is_pending(), e.is_validated(), e.is_rejected()]
                .iter()
                .filter(|h| **h)
                .count();
            assert_eq!(held, 1);
            assert_eq!(e.validation.as_flag(), flag);
        }
    }

    #[test]
    fn test_can_be_validated_requires_pending_and_future_start() {
        let e = event();
        assert!(e.can_be_validated(now()));
        assert!(!e.can_be_validated(e.start_date));
        assert!(!e.can_be_validated(e.start_date + Duration::minutes(1)));

        let mut validated = event();
        validated.validation = ValidationState::Validated;
        assert!(!validated.can_be_validated(now()));

        let mut rejected = event();
        rejected.validation = ValidationState::Rejected;
        assert!(!rejected.can_be_validated(now()));
    }

    #[test]
    fn test_decision_is_recorded_once() {
        let admin = Uuid::new_v4();
        let mut e = event();

        e.decide(admin, EventDecision::Validate, now()).unwrap();
        assert!(e.is_validated());
        assert_eq!(e.validation_status(), "Validé");
        assert_eq!(e.validated_by, Some(admin));
        assert_eq!(e.validated_at, Some(now()));

        assert_eq!(
            e.decide(admin, EventDecision::Reject, now()),
            Err(DecisionError::AlreadyDecided)
        );
        assert!(e.is_validated());
    }

    #[test]
    fn test_backdated_decision_leaves_updated_at_alone() {
        let mut e = event();
        let written = e.updated_at;
        let reviewed = now() - Duration::days(4);

        e.start_date = now() - Duration::days(1);
        e.decide(Uuid::new_v4(), EventDecision::Validate, reviewed)
            .unwrap();

        assert_eq!(e.validated_at, Some(reviewed));
        assert_eq!(e.updated_at, written);
        assert!(e.updated_at >= e.created_at);
    }

    #[test]
    fn test_rejection_label() {
        let mut e = event();
        e.decide(Uuid::new_v4(), EventDecision::Reject, now()).unwrap();
        assert!(e.is_rejected());
        assert_eq!(e.validation_status(), "Refusé");
    }

    #[test]
    fn test_cannot_decide_on_started_event() {
        let mut e = event();
        let at = e.start_date + Duration::hours(2);
        assert_eq!(
            e.decide(Uuid::new_v4(), EventDecision::Validate, at),
            Err(DecisionError::AlreadyStarted)
        );
        assert!(e.is_pending());
    }

    #[test]
    fn test_display_helpers() {
        let mut e = event();
        e.duration = 120;
        e.start_date = Utc.with_ymd_and_hms(2026, 3, 24, 20, 5, 0).unwrap();

        assert_eq!(e.duration_in_hours(), 2.0);
        assert_eq!(e.full_price_with_currency(), "35.00€");
        assert_eq!(e.formatted_start_date(), "24/03/2026 à 20:05");
        assert!(!e.is_free());

        e.price = Decimal::ZERO;
        assert!(e.is_free());
        assert_eq!(e.full_price_with_currency(), "0.00€");

        e.duration = 90;
        assert_eq!(e.duration_in_hours(), 1.5);
    }

    #[test]
    fn test_scopes_compose() {
        let mut upcoming_validated = event();
        upcoming_validated.validation = ValidationState::Validated;

        let mut past_validated = event();
        past_validated.validation = ValidationState::Validated;
        past_validated.start_date = now() - Duration::days(1);

        let pending = event();

        let mut at_now = event();
        at_now.start_date = now();

        let events = vec![upcoming_validated, past_validated, pending, at_now];
        let hits = |scopes: &[Scope]| -> Vec<Uuid> {
            events
                .iter()
                .filter(|e| scopes.iter().all(|s| s.matches(e, now())))
                .map(|e| e.id)
                .collect()
        };

        assert_eq!(hits(&[Scope::Validated, Scope::Upcoming]), vec![events[0].id]);
        assert_eq!(hits(&[Scope::Past]), vec![events[1].id]);
        assert_eq!(hits(&[Scope::Pending]).len(), 2);
        assert!(hits(&[Scope::Rejected]).is_empty());
        assert_eq!(hits(&[]).len(), 4);
    }

    #[test]
    fn test_parse_scope_list() {
        assert_eq!(
            Scope::parse_list("validated, upcoming,validated").unwrap(),
            vec![Scope::Validated, Scope::Upcoming]
        );
        assert!(Scope::parse_list("").unwrap().is_empty());

        let errors = Scope::parse_list("upcoming,soon").unwrap_err();
        assert_eq!(errors.messages("scope"), ["'soon' is not a known scope".to_string()]);
    }
}
