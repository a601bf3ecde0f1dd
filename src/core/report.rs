//! Period reports - hours, payments, hourly rates and worked days per object.
//!
//! [`build_period_report`] gathers the numbers and [`render_period_report`] turns them into
//! chat text. Money stays in integer kopecks through every sum; only the formatters convert
//! to rubles.

use crate::{
    core::{
        format::{
            format_currency, format_date_range, format_hours, format_month_year, format_rate,
            format_work_days,
        },
        payment, time_entry, work_object,
    },
    entities::work_object as work_object_entity,
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::ConnectionTrait;
use std::collections::BTreeSet;

/// Message shown when the owner has no objects at all.
pub const NO_DATA_MESSAGE: &str = "📊 За указанный период нет данных.";

/// One object's figures inside the requested range.
#[derive(Debug, Clone)]
pub struct ObjectTotals {
    /// The object being reported on
    pub object: work_object_entity::Model,
    /// Sum of entry hours in range
    pub total_hours: f64,
    /// Sum of payments in range, in kopecks
    pub total_payments: i64,
    /// Distinct dates with at least one entry in range
    pub work_dates: BTreeSet<NaiveDate>,
}

impl ObjectTotals {
    /// Number of distinct worked days
    #[must_use]
    pub fn work_days(&self) -> usize {
        self.work_dates.len()
    }
}

/// Figures for every non-deleted object of an owner over `start..=end`.
#[derive(Debug, Clone)]
pub struct PeriodReport {
    /// First day of the range
    pub start: NaiveDate,
    /// Last day of the range, inclusive
    pub end: NaiveDate,
    /// Per-object totals, newest object first
    pub objects: Vec<ObjectTotals>,
}

impl PeriodReport {
    /// Hours across all objects
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.objects.iter().map(|o| o.total_hours).sum()
    }

    /// Payments across all objects, in kopecks
    #[must_use]
    pub fn total_payments(&self) -> i64 {
        self.objects.iter().map(|o| o.total_payments).sum()
    }

    /// Distinct worked days across all objects. A day worked on two objects counts once.
    #[must_use]
    pub fn work_days(&self) -> usize {
        self.objects
            .iter()
            .flat_map(|o| o.work_dates.iter())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Inclusive number of calendar days in the range
    #[must_use]
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Collects per-object totals for the owner's non-deleted objects (both statuses) over
/// `start..=end`.
pub async fn build_period_report<C>(
    db: &C,
    owner_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PeriodReport>
where
    C: ConnectionTrait,
{
    let objects = work_object::list_for_owner(db, owner_id, true).await?;
    let mut totals = Vec::with_capacity(objects.len());

    for object in objects {
        let entries = time_entry::entries_in_period(db, object.id, start, end).await?;
        let payments = payment::payments_in_period(db, object.id, start, end).await?;

        totals.push(ObjectTotals {
            total_hours: entries.iter().map(|e| e.hours).sum(),
            total_payments: payments.iter().map(|p| p.amount).sum(),
            work_dates: entries.iter().map(|e| e.date).collect(),
            object,
        });
    }

    tracing::debug!(
        "Built report for user {owner_id} over {start}..={end}: {} objects",
        totals.len()
    );

    Ok(PeriodReport {
        start,
        end,
        objects: totals,
    })
}

/// One line per object: `"<name> — 0ч — <money>"` when nothing was logged, otherwise
/// hours, worked days, money and the implied hourly rate.
#[must_use]
pub fn render_object_line(totals: &ObjectTotals) -> String {
    let name = &totals.object.name;
    let money = format_currency(totals.total_payments);

    if totals.total_hours == 0.0 {
        return format!("{name} — 0ч — {money}");
    }

    format!(
        "{name} — {} ({} д. работы) — {money} ({})",
        format_hours(totals.total_hours),
        totals.work_days(),
        format_rate(totals.total_payments, totals.total_hours)
    )
}

/// Report body: object lines, a blank line, the aggregate line and the worked-days summary.
/// An owner without objects gets [`NO_DATA_MESSAGE`].
#[must_use]
pub fn render_period_report(report: &PeriodReport) -> String {
    if report.objects.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let total_hours = report.total_hours();
    let total_payments = report.total_payments();
    let rate = if total_hours > 0.0 {
        format_rate(total_payments, total_hours)
    } else {
        "0 р./час".to_string()
    };

    let mut lines: Vec<String> = report.objects.iter().map(render_object_line).collect();
    lines.push(String::new());
    lines.push(format!("Итого: {} ({rate})", format_currency(total_payments)));
    lines.push(format!(
        "{} из {} дней в {}",
        format_work_days(report.work_days()),
        report.total_days(),
        format_month_year(report.start)
    ));
    lines.join("\n")
}

/// Full chat message with the period header. The no-data message goes out without one.
#[must_use]
pub fn render_report_message(report: &PeriodReport) -> String {
    if report.objects.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }
    format!(
        "📊 **Отчёт за период {}**\n\n{}",
        format_date_range(report.start, report.end),
        render_period_report(report)
    )
}

/// First and last day of the calendar month before the one containing `today`.
#[must_use]
pub fn last_month_period(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_of_current = today.with_day(1).unwrap_or(today);
    let last_of_previous = first_of_current.pred_opt().unwrap_or(first_of_current);
    let first_of_previous = last_of_previous.with_day(1).unwrap_or(last_of_previous);
    (first_of_previous, last_of_previous)
}

/// First and last day of `month` in `year`. `None` for an invalid month.
#[must_use]
pub fn month_period(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}
