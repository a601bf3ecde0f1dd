//! Shared test utilities for `WorktimeBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::settings::TrackerSettings,
    core::{
        payment,
        time_entry::{self, NewTimeEntry},
        user::{self, Profile},
        work_object,
    },
    entities,
    errors::Result,
    wizard::{StepEnv, Turn},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::DatabaseConnection;

/// External ID of the user created by [`setup_with_user`]
pub const TEST_USER: &str = "1001";

/// Builds a date, panicking on invalid input (tests only use literal dates).
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// `day` at `hour:minute`.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with no profile fields.
pub async fn create_test_user(
    db: &DatabaseConnection,
    external_id: &str,
) -> Result<entities::user::Model> {
    user::get_or_create_user(db, external_id, Profile::default()).await
}

/// Creates an active test object.
pub async fn create_test_object(
    db: &DatabaseConnection,
    owner_id: i64,
    name: &str,
) -> Result<entities::work_object::Model> {
    work_object::create_object(db, owner_id, name).await
}

/// Creates a time entry of `hours` starting at 08:00 on `day`.
pub async fn create_test_entry(
    db: &DatabaseConnection,
    work_object_id: i64,
    day: NaiveDate,
    hours: f64,
) -> Result<entities::time_entry::Model> {
    let start_time = at(day, 8, 0);
    #[allow(clippy::cast_possible_truncation)]
    let minutes = (hours * 60.0).round() as i64;
    time_entry::create_time_entry(
        db,
        work_object_id,
        NewTimeEntry {
            start_time,
            end_time: start_time + chrono::Duration::minutes(minutes),
            hours,
            date: day,
            comment: None,
        },
    )
    .await
}

/// Creates a payment of `amount_kopecks` on `day`.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    work_object_id: i64,
    day: NaiveDate,
    amount_kopecks: i64,
) -> Result<entities::payment::Model> {
    payment::create_payment(db, work_object_id, amount_kopecks, day).await
}

/// Sets up a complete test environment with one registered user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let owner = create_test_user(&db, TEST_USER).await?;
    Ok((db, owner))
}

/// A dialog turn for [`TEST_USER`] with a fixed "today".
#[must_use]
pub const fn test_turn<'a>(
    db: &'a DatabaseConnection,
    settings: &'a TrackerSettings,
    today: NaiveDate,
) -> Turn<'a> {
    Turn {
        db,
        user: TEST_USER,
        env: StepEnv { today, settings },
    }
}
