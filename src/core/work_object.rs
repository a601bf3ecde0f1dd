//! Work object lifecycle - lookup, get-or-create, status changes and soft deletion.
//!
//! Every query here filters on the owner and on `is_deleted = false`; a soft-deleted
//! object is invisible to name lookups and listings even though its rows (and the entries
//! and payments logged against it) remain in the database.

use crate::{
    entities::{
        Payment, TimeEntry, WorkObject, payment, time_entry, work_object,
        work_object::ObjectStatus,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Totals over everything ever logged against one object.
#[derive(Debug, Clone)]
pub struct ObjectSummary {
    /// The object itself
    pub object: work_object::Model,
    /// All time entries, oldest date first
    pub entries: Vec<time_entry::Model>,
    /// All payments, oldest date first
    pub payments: Vec<payment::Model>,
    /// Sum of entry hours
    pub total_hours: f64,
    /// Sum of payment amounts in kopecks
    pub total_payments: i64,
}

impl ObjectSummary {
    /// Date of the earliest time entry
    #[must_use]
    pub fn first_work_date(&self) -> Option<NaiveDate> {
        self.entries.iter().map(|e| e.date).min()
    }

    /// Date of the latest time entry
    #[must_use]
    pub fn last_work_date(&self) -> Option<NaiveDate> {
        self.entries.iter().map(|e| e.date).max()
    }
}

/// Finds a non-deleted object by ID, scoped to its owner.
pub async fn get_by_id<C>(db: &C, object_id: i64, owner_id: i64) -> Result<Option<work_object::Model>>
where
    C: ConnectionTrait,
{
    WorkObject::find_by_id(object_id)
        .filter(work_object::Column::UserId.eq(owner_id))
        .filter(work_object::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_by_id`], but a missing or foreign object is an [`Error::ObjectNotFound`].
pub async fn require_owned<C>(db: &C, object_id: i64, owner_id: i64) -> Result<work_object::Model>
where
    C: ConnectionTrait,
{
    get_by_id(db, object_id, owner_id)
        .await?
        .ok_or(Error::ObjectNotFound { id: object_id })
}

/// Finds a non-deleted object by exact name under the owner.
pub async fn get_by_name<C>(db: &C, owner_id: i64, name: &str) -> Result<Option<work_object::Model>>
where
    C: ConnectionTrait,
{
    WorkObject::find()
        .filter(work_object::Column::UserId.eq(owner_id))
        .filter(work_object::Column::Name.eq(name))
        .filter(work_object::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the owner's non-deleted objects, newest first. With `include_completed = false`
/// only active objects are returned.
pub async fn list_for_owner<C>(
    db: &C,
    owner_id: i64,
    include_completed: bool,
) -> Result<Vec<work_object::Model>>
where
    C: ConnectionTrait,
{
    let mut query = WorkObject::find()
        .filter(work_object::Column::UserId.eq(owner_id))
        .filter(work_object::Column::IsDeleted.eq(false));

    if !include_completed {
        query = query.filter(work_object::Column::Status.eq(ObjectStatus::Active));
    }

    query
        .order_by_desc(work_object::Column::CreatedAt)
        .order_by_desc(work_object::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active object. The name is trimmed and must not be empty.
pub async fn create_object<C>(db: &C, owner_id: i64, name: &str) -> Result<work_object::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Название объекта не может быть пустым.".to_string(),
        });
    }

    let now = chrono::Utc::now();
    let object = work_object::ActiveModel {
        user_id: Set(owner_id),
        name: Set(name.to_string()),
        status: Set(ObjectStatus::Active),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = object.insert(db).await?;
    tracing::info!("Created work object {} ({}) for user {owner_id}", result.id, result.name);
    Ok(result)
}

/// Returns the owner's non-deleted object called `name`, creating an active one when none
/// exists. Repeating the call with the same name yields the same object.
pub async fn resolve_or_create<C>(db: &C, owner_id: i64, name: &str) -> Result<work_object::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if let Some(existing) = get_by_name(db, owner_id, name).await? {
        return Ok(existing);
    }
    create_object(db, owner_id, name).await
}

/// Switches an owned object between active and completed. Returns `None` (and changes
/// nothing) when the object is missing, deleted or owned by someone else.
pub async fn set_status<C>(
    db: &C,
    object_id: i64,
    owner_id: i64,
    status: ObjectStatus,
) -> Result<Option<work_object::Model>>
where
    C: ConnectionTrait,
{
    let Some(object) = get_by_id(db, object_id, owner_id).await? else {
        return Ok(None);
    };

    let mut active: work_object::ActiveModel = object.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    tracing::info!("Work object {object_id} is now {status:?}");
    Ok(Some(updated))
}

/// Soft-deletes an owned object. Returns `false` when it is missing, already deleted or
/// owned by someone else.
pub async fn soft_delete<C>(db: &C, object_id: i64, owner_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let Some(object) = get_by_id(db, object_id, owner_id).await? else {
        return Ok(false);
    };

    let mut active: work_object::ActiveModel = object.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await?;
    tracing::info!("Soft-deleted work object {object_id}");
    Ok(true)
}

/// Loads an owned object together with all of its entries and payments.
pub async fn object_summary<C>(db: &C, object_id: i64, owner_id: i64) -> Result<ObjectSummary>
where
    C: ConnectionTrait,
{
    let object = require_owned(db, object_id, owner_id).await?;

    let entries = TimeEntry::find()
        .filter(time_entry::Column::WorkObjectId.eq(object.id))
        .order_by_asc(time_entry::Column::Date)
        .order_by_asc(time_entry::Column::Id)
        .all(db)
        .await?;
    let payments = Payment::find()
        .filter(payment::Column::WorkObjectId.eq(object.id))
        .order_by_asc(payment::Column::Date)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await?;

    let total_hours = entries.iter().map(|e| e.hours).sum();
    let total_payments = payments.iter().map(|p| p.amount).sum();

    Ok(ObjectSummary {
        object,
        entries,
        payments,
        total_hours,
        total_payments,
    })
}
