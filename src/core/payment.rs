//! Payment business logic - create, read, update and delete payments.
//!
//! Amounts are integers in kopecks end to end; the dialogs multiply whole rubles by
//! [`KOPECKS_PER_RUBLE`] before anything reaches this module.

use crate::{
    entities::{Payment, WorkObject, payment, work_object},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Minor units per major currency unit
pub const KOPECKS_PER_RUBLE: i64 = 100;

fn validate_amount(amount_kopecks: i64) -> Result<()> {
    if amount_kopecks <= 0 {
        return Err(Error::Validation {
            message: "Сумма оплаты должна быть положительной.".to_string(),
        });
    }
    Ok(())
}

/// Creates a payment for `work_object_id`.
pub async fn create_payment<C>(
    db: &C,
    work_object_id: i64,
    amount_kopecks: i64,
    date: NaiveDate,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    validate_amount(amount_kopecks)?;

    let now = chrono::Utc::now();
    let model = payment::ActiveModel {
        work_object_id: Set(work_object_id),
        amount: Set(amount_kopecks),
        date: Set(date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    tracing::info!(
        "Recorded payment {} of {amount_kopecks} kopecks on object {work_object_id}",
        result.id
    );
    Ok(result)
}

/// Retrieves a payment by ID without any ownership check.
pub async fn get_payment<C>(db: &C, payment_id: i64) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a payment and its object, verifying the object belongs to `owner_id`.
pub async fn get_owned_payment<C>(
    db: &C,
    payment_id: i64,
    owner_id: i64,
) -> Result<(payment::Model, work_object::Model)>
where
    C: ConnectionTrait,
{
    let (payment, object) = Payment::find_by_id(payment_id)
        .find_also_related(WorkObject)
        .one(db)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    match object {
        Some(object) if object.user_id == owner_id => Ok((payment, object)),
        _ => Err(Error::AccessDenied),
    }
}

/// Overwrites amount and date of a payment.
pub async fn update_payment<C>(
    db: &C,
    payment_id: i64,
    amount_kopecks: i64,
    date: NaiveDate,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    validate_amount(amount_kopecks)?;

    let payment = get_payment(db, payment_id)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    let mut active: payment::ActiveModel = payment.into();
    active.amount = Set(amount_kopecks);
    active.date = Set(date);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;
    tracing::info!("Updated payment {payment_id}");
    Ok(updated)
}

/// Permanently deletes a payment. Returns `false` when it did not exist.
pub async fn delete_payment<C>(db: &C, payment_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Payment::delete_by_id(payment_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// All payments of an object, newest date first.
pub async fn payments_for_object<C>(db: &C, work_object_id: i64) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::WorkObjectId.eq(work_object_id))
        .order_by_desc(payment::Column::Date)
        .order_by_desc(payment::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Payments of an object whose date lies in `start..=end`.
pub async fn payments_in_period<C>(
    db: &C,
    work_object_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::WorkObjectId.eq(work_object_id))
        .filter(payment::Column::Date.gte(start))
        .filter(payment::Column::Date.lte(end))
        .order_by_desc(payment::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}
