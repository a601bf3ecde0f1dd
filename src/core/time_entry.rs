//! Time entry business logic - create, read, update and delete logged work intervals.
//!
//! Entries reach their owner only through the owning work object, so every
//! caller-facing lookup goes through [`get_owned_time_entry`], which checks that the
//! object belongs to the caller.

use crate::{
    entities::{TimeEntry, WorkObject, time_entry, work_object},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Fields of a time entry about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    /// Local start of the interval
    pub start_time: NaiveDateTime,
    /// Local end of the interval
    pub end_time: NaiveDateTime,
    /// Duration in hours
    pub hours: f64,
    /// Day the work counts towards
    pub date: NaiveDate,
    /// Optional note
    pub comment: Option<String>,
}

/// Field overrides applied by the edit dialog. `comment` always overwrites.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntryUpdate {
    /// New duration in hours
    pub hours: f64,
    /// New attributed day
    pub date: NaiveDate,
    /// New note; `None` clears it
    pub comment: Option<String>,
}

/// Creates a time entry for `work_object_id`. Rejects non-positive durations.
pub async fn create_time_entry<C>(
    db: &C,
    work_object_id: i64,
    entry: NewTimeEntry,
) -> Result<time_entry::Model>
where
    C: ConnectionTrait,
{
    if entry.end_time <= entry.start_time || entry.hours <= 0.0 || !entry.hours.is_finite() {
        return Err(Error::Validation {
            message: "Время окончания должно быть позже времени начала.".to_string(),
        });
    }

    let now = chrono::Utc::now();
    let model = time_entry::ActiveModel {
        work_object_id: Set(work_object_id),
        start_time: Set(entry.start_time),
        end_time: Set(entry.end_time),
        hours: Set(entry.hours),
        date: Set(entry.date),
        comment: Set(entry.comment),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(
        "Logged {} h on object {work_object_id} (entry {})",
        result.hours,
        result.id
    );
    Ok(result)
}

/// Retrieves a time entry by ID without any ownership check.
pub async fn get_time_entry<C>(db: &C, entry_id: i64) -> Result<Option<time_entry::Model>>
where
    C: ConnectionTrait,
{
    TimeEntry::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a time entry and its object, verifying the object belongs to `owner_id`.
///
/// # Errors
/// [`Error::TimeEntryNotFound`] when the entry does not exist, [`Error::AccessDenied`]
/// when it belongs to another user.
pub async fn get_owned_time_entry<C>(
    db: &C,
    entry_id: i64,
    owner_id: i64,
) -> Result<(time_entry::Model, work_object::Model)>
where
    C: ConnectionTrait,
{
    let (entry, object) = TimeEntry::find_by_id(entry_id)
        .find_also_related(WorkObject)
        .one(db)
        .await?
        .ok_or(Error::TimeEntryNotFound { id: entry_id })?;

    match object {
        Some(object) if object.user_id == owner_id => Ok((entry, object)),
        _ => Err(Error::AccessDenied),
    }
}

/// Applies `update` to an entry.
pub async fn update_time_entry<C>(
    db: &C,
    entry_id: i64,
    update: TimeEntryUpdate,
) -> Result<time_entry::Model>
where
    C: ConnectionTrait,
{
    if update.hours <= 0.0 || !update.hours.is_finite() {
        return Err(Error::Validation {
            message: "Количество часов должно быть положительным.".to_string(),
        });
    }

    let entry = get_time_entry(db, entry_id)
        .await?
        .ok_or(Error::TimeEntryNotFound { id: entry_id })?;

    let mut active: time_entry::ActiveModel = entry.into();
    active.hours = Set(update.hours);
    active.date = Set(update.date);
    active.comment = Set(update.comment);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    tracing::info!("Updated time entry {entry_id}");
    Ok(updated)
}

/// Permanently deletes an entry. Returns `false` when it did not exist.
pub async fn delete_time_entry<C>(db: &C, entry_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = TimeEntry::delete_by_id(entry_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// All entries of an object, newest date first.
pub async fn entries_for_object<C>(db: &C, work_object_id: i64) -> Result<Vec<time_entry::Model>>
where
    C: ConnectionTrait,
{
    TimeEntry::find()
        .filter(time_entry::Column::WorkObjectId.eq(work_object_id))
        .order_by_desc(time_entry::Column::Date)
        .order_by_desc(time_entry::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Entries of an object whose date lies in `start..=end`.
pub async fn entries_in_period<C>(
    db: &C,
    work_object_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<time_entry::Model>>
where
    C: ConnectionTrait,
{
    TimeEntry::find()
        .filter(time_entry::Column::WorkObjectId.eq(work_object_id))
        .filter(time_entry::Column::Date.gte(start))
        .filter(time_entry::Column::Date.lte(end))
        .order_by_desc(time_entry::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}
