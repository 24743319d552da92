//! Event persistence and the accounting queries that run against it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::accounting::{minor_to_major, EventStats};
use crate::models::{Event, EventDecision, EventDraft, Scope, User};
use crate::utils::error::AppError;

/// Validates `draft` against `now` and stores it as a pending event.
#[tracing::instrument(skip(pool, draft), fields(title = %draft.title))]
pub async fn create(
    pool: &PgPool,
    organizer: Uuid,
    draft: EventDraft,
    now: DateTime<Utc>,
) -> Result<Event, AppError> {
    let event = Event::from_draft(organizer, draft, now)?;

    let stored = sqlx::query_as::<_, Event>(
        "INSERT INTO events (id, user_id, title, description, start_date, duration, price, location,
                             validated, validated_by, validated_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING *",
    )
    .bind(event.id)
    .bind(event.user_id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.start_date)
    .bind(event.duration)
    .bind(event.price)
    .bind(&event.location)
    .bind(event.validation.as_flag())
    .bind(event.validated_by)
    .bind(event.validated_at)
    .bind(event.created_at)
    .bind(event.updated_at)
    .fetch_one(pool)
    .await?;

    tracing::info!(event_id = %stored.id, "Event created");
    Ok(stored)
}

/// Re-validates and saves new attributes for an existing event.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    draft: EventDraft,
    now: DateTime<Utc>,
) -> Result<Event, AppError> {
    let mut event = require(pool, id).await?;
    event.apply(draft, now)?;

    let stored = sqlx::query_as::<_, Event>(
        "UPDATE events
         SET title = $2, description = $3, start_date = $4, duration = $5, price = $6,
             location = $7, updated_at = $8
         WHERE id = $1
         RETURNING *",
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.start_date)
    .bind(event.duration)
    .bind(event.price)
    .bind(&event.location)
    .bind(event.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn require(pool: &PgPool, id: Uuid) -> Result<Event, AppError> {
    find(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", id)))
}

/// Events matching every scope, soonest first.
pub async fn list(
    pool: &PgPool,
    scopes: &[Scope],
    now: DateTime<Utc>,
) -> Result<Vec<Event>, sqlx::Error> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM events WHERE TRUE");
    push_scopes(&mut query, scopes, now);
    query.push(" ORDER BY start_date");

    query.build_query_as::<Event>().fetch_all(pool).await
}

fn push_scopes(query: &mut QueryBuilder<'_, Postgres>, scopes: &[Scope], now: DateTime<Utc>) {
    for scope in scopes {
        match scope {
            Scope::Pending => {
                query.push(" AND validated IS NULL");
            }
            Scope::Validated => {
                query.push(" AND validated = TRUE");
            }
            Scope::Rejected => {
                query.push(" AND validated = FALSE");
            }
            Scope::Upcoming => {
                query.push(" AND start_date > ").push_bind(now);
            }
            Scope::Past => {
                query.push(" AND start_date < ").push_bind(now);
            }
        }
    }
}

/// Applies an administrator's decision and persists the outcome.
#[tracing::instrument(skip(pool))]
pub async fn record_decision(
    pool: &PgPool,
    id: Uuid,
    admin: Uuid,
    decision: EventDecision,
    at: DateTime<Utc>,
) -> Result<Event, AppError> {
    let mut event = require(pool, id).await?;
    event.decide(admin, decision, at)?;

    // The IS NULL guard keeps a concurrent reviewer from overwriting the outcome.
    let stored = sqlx::query_as::<_, Event>(
        "UPDATE events
         SET validated = $2, validated_by = $3, validated_at = $4, updated_at = NOW()
         WHERE id = $1 AND validated IS NULL
         RETURNING *",
    )
    .bind(event.id)
    .bind(event.validation.as_flag())
    .bind(event.validated_by)
    .bind(event.validated_at)
    .fetch_optional(pool)
    .await?
    .ok_or(crate::models::DecisionError::AlreadyDecided)?;

    tracing::info!(event_id = %stored.id, status = stored.validation_status(), "Event reviewed");
    Ok(stored)
}

/// Deletes the event together with its attendances and payments.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await
}

pub async fn confirmed_participants_count(pool: &PgPool, id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM attendances
         WHERE event_id = $1 AND payment_status IN ('succeeded', 'free')",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn pending_participants_count(pool: &PgPool, id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM attendances WHERE event_id = $1 AND payment_status = 'pending'",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Succeeded payment amounts for the event, in major units.
pub async fn total_revenue(pool: &PgPool, id: Uuid) -> Result<Decimal, sqlx::Error> {
    let minor: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(p.amount), 0)::BIGINT
         FROM attendances a
         JOIN payments p ON p.attendance_id = a.id
         WHERE a.event_id = $1 AND a.payment_status = 'succeeded'",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(minor_to_major(minor))
}

pub async fn stats(pool: &PgPool, id: Uuid) -> Result<EventStats, sqlx::Error> {
    Ok(EventStats {
        confirmed_participants: confirmed_participants_count(pool, id).await?,
        pending_participants: pending_participants_count(pool, id).await?,
        total_revenue: total_revenue(pool, id).await?,
    })
}

pub async fn confirmed_participants(pool: &PgPool, id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN attendances a ON a.user_id = u.id
         WHERE a.event_id = $1 AND a.payment_status IN ('succeeded', 'free')
         ORDER BY a.created_at",
    )
    .bind(id)
    .fetch_all(pool)
    .await
}

pub async fn pending_participants(pool: &PgPool, id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN attendances a ON a.user_id = u.id
         WHERE a.event_id = $1 AND a.payment_status = 'pending'
         ORDER BY a.created_at",
    )
    .bind(id)
    .fetch_all(pool)
    .await
}
