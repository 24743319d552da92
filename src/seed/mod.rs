//! Development bootstrap: wipes the database and loads a fixed cast of
//! accounts and events, then fans out random registrations to every
//! validated event.
//!
//! This is destructive and meant for local use only.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{self, users::NewUser};
use crate::models::{EventDecision, Scope, User};
use crate::utils::error::AppError;

pub mod config;
pub mod fanout;
pub mod fixtures;

pub use config::{AdminAccount, SeedConfig};
pub use fanout::{plan_attendances, PlannedAttendance};

const DEFAULT_ADMIN_EMAIL: &str = "admin@eventbrite.local";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not store fixture: {0}")]
    Fixture(#[from] AppError),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub users: i64,
    pub admins: Vec<User>,
    pub events: i64,
    pub attendances: i64,
    pub confirmed_attendances: i64,
    pub pending_attendances: i64,
    /// Password shared by the seeded admin accounts, for the summary.
    pub admin_password: String,
    pub admin_login_url: String,
}

/// Resets the store and loads the development data set.
pub async fn run<R: Rng + ?Sized>(
    pool: &PgPool,
    config: &SeedConfig,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<SeedReport, SeedError> {
    tracing::info!("Cleaning database...");
    db::reset(pool).await?;

    let admin = seed_admins(pool, config, now).await?;
    let organizers = seed_users(pool, fixtures::organizers(), now).await?;
    seed_users(pool, fixtures::participants(), now).await?;

    let users = db::users::count(pool).await?;
    tracing::info!(users, "Users created");

    for fixture in fixtures::events(now) {
        let organizer = &organizers[fixture.organizer];
        let event = db::events::create(pool, organizer.id, fixture.draft, now).await?;

        if let Some(ago) = fixture.validated_ago {
            db::events::record_decision(pool, event.id, admin.id, EventDecision::Validate, now - ago)
                .await?;
        }
    }

    let events = db::events::count(pool).await?;
    tracing::info!(events, "Events created");

    seed_attendances(pool, rng, now).await?;

    let report = SeedReport {
        users,
        admins: db::users::list_by_role(pool, true).await?,
        events,
        attendances: db::attendances::count(pool).await?,
        confirmed_attendances: db::attendances::count_confirmed(pool).await?,
        pending_attendances: db::attendances::count_pending(pool).await?,
        admin_password: config
            .admin
            .as_ref()
            .map(|a| a.password.clone())
            .unwrap_or_else(|| fixtures::DEFAULT_PASSWORD.to_string()),
        admin_login_url: config.admin_login_url(),
    };

    tracing::info!(
        attendances = report.attendances,
        confirmed = report.confirmed_attendances,
        pending = report.pending_attendances,
        "Attendances created"
    );

    Ok(report)
}

/// Creates the configured admins, falling back to a default account when the
/// primary one is not configured. Returns the primary admin.
async fn seed_admins(
    pool: &PgPool,
    config: &SeedConfig,
    now: DateTime<Utc>,
) -> Result<User, SeedError> {
    let primary = match &config.admin {
        Some(account) => {
            let admin = insert_admin(
                pool,
                account,
                "Main administrator configured via .env",
                now,
            )
            .await?;
            tracing::info!(email = %admin.email, "Main admin created");
            admin
        }
        None => {
            tracing::warn!(
                missing = ?config.missing_admin_vars,
                "Admin environment incomplete, creating default admin"
            );
            let fallback = AdminAccount {
                first_name: "Default".to_string(),
                last_name: "Admin".to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: fixtures::DEFAULT_PASSWORD.to_string(),
            };
            insert_admin(pool, &fallback, "Default administrator", now).await?
        }
    };

    if let Some(account) = &config.secondary_admin {
        let admin = insert_admin(
            pool,
            account,
            "Secondary administrator configured via .env",
            now,
        )
        .await?;
        tracing::info!(email = %admin.email, "Secondary admin created");
    }

    Ok(primary)
}

async fn insert_admin(
    pool: &PgPool,
    account: &AdminAccount,
    description: &str,
    now: DateTime<Utc>,
) -> Result<User, SeedError> {
    let user = NewUser {
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        email: account.email.clone(),
        password_hash: bcrypt::hash(&account.password, bcrypt::DEFAULT_COST)?,
        admin: true,
        description: Some(description.to_string()),
    };
    Ok(db::users::insert(pool, user, now).await?)
}

async fn seed_users(
    pool: &PgPool,
    accounts: Vec<fixtures::UserFixture>,
    now: DateTime<Utc>,
) -> Result<Vec<User>, SeedError> {
    // Every test account shares one password, so one hash will do.
    let password_hash = bcrypt::hash(fixtures::DEFAULT_PASSWORD, bcrypt::DEFAULT_COST)?;
    let mut created = Vec::with_capacity(accounts.len());

    for fixture in accounts {
        let user = NewUser {
            first_name: fixture.first_name,
            last_name: fixture.last_name,
            email: fixture.email,
            password_hash: password_hash.clone(),
            admin: false,
            description: Some(fixture.description),
        };
        created.push(db::users::insert(pool, user, now).await?);
    }

    Ok(created)
}

async fn seed_attendances<R: Rng + ?Sized>(
    pool: &PgPool,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<(), SeedError> {
    let users = db::users::list_by_role(pool, false).await?;

    for event in db::events::list(pool, &[Scope::Validated], now).await? {
        let plan = plan_attendances(&event, &users, rng, now);
        tracing::debug!(event_id = %event.id, participants = plan.len(), "Registering participants");

        for planned in plan {
            let attendance = db::attendances::insert(
                pool,
                planned.user_id,
                event.id,
                planned.payment_status,
                planned.amount_paid,
                planned.created_at,
            )
            .await?;

            if let Some(refs) = planned.payment {
                db::payments::insert_succeeded(pool, &attendance, planned.amount_paid, refs).await?;
            }
        }
    }

    Ok(())
}
