use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounting::EventStats;
use crate::db;
use crate::models::{Event, EventDraft, Scope, User, ValidationErrors};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Comma-separated scopes, all of which must match.
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub organizer_id: Uuid,
    #[serde(flatten)]
    pub draft: EventDraft,
}

/// An event together with its derived display fields.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub validation_status: &'static str,
    pub can_be_validated: bool,
    pub free_event: bool,
    pub full_price_with_currency: String,
    pub formatted_start_date: String,
    pub duration_in_hours: f64,
}

impl EventView {
    pub fn new(event: Event, now: DateTime<Utc>) -> Self {
        Self {
            validation_status: event.validation_status(),
            can_be_validated: event.can_be_validated(now),
            free_event: event.is_free(),
            full_price_with_currency: event.full_price_with_currency(),
            formatted_start_date: event.formatted_start_date(),
            duration_in_hours: event.duration_in_hours(),
            event,
        }
    }
}

/// Public face of an attendee. Contact details stay private.
#[derive(Debug, Serialize)]
pub struct ParticipantView {
    pub id: Uuid,
    pub full_name: String,
}

impl From<User> for ParticipantView {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            id: user.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub view: EventView,
    pub participants_count: i64,
    pub stats: EventStats,
    pub confirmed_participants: Vec<ParticipantView>,
    pub pending_participants: Vec<ParticipantView>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let scopes = Scope::parse_list(params.scope.as_deref().unwrap_or_default())?;

    let events = db::events::list(&state.pool, &scopes, now).await?;
    let views: Vec<EventView> = events.into_iter().map(|e| EventView::new(e, now)).collect();

    Ok(success(views, "Events retrieved"))
}

pub async fn show_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let event = db::events::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", id)))?;

    let stats = db::events::stats(&state.pool, id).await?;
    let confirmed = db::events::confirmed_participants(&state.pool, id).await?;
    let pending = db::events::pending_participants(&state.pool, id).await?;

    let details = EventDetails {
        view: EventView::new(event, now),
        participants_count: stats.participants_count(),
        stats,
        confirmed_participants: confirmed.into_iter().map(ParticipantView::from).collect(),
        pending_participants: pending.into_iter().map(ParticipantView::from).collect(),
    };

    Ok(success(details, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let now = Utc::now();

    let mut errors = match request.draft.validate(now) {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    if db::users::find(&state.pool, request.organizer_id).await?.is_none() {
        errors.add("user", "must exist");
    }
    errors.into_result()?;

    let event = db::events::create(&state.pool, request.organizer_id, request.draft, now).await?;

    Ok(created(EventView::new(event, now), "Event submitted for review"))
}
