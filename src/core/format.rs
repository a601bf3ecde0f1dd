//! Display formatting for money, durations and dates.
//!
//! Amounts arrive in kopecks and are shown in rubles; hours are shown as `H:MM` followed by
//! the Russian word for "hour" in the form that agrees with the whole-hour count.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const MONTHS_PREPOSITIONAL: [&str; 12] = [
    "январе",
    "феврале",
    "марте",
    "апреле",
    "мае",
    "июне",
    "июле",
    "августе",
    "сентябре",
    "октябре",
    "ноябре",
    "декабре",
];

/// Groups digits in threes with a space: `1500000` -> `"1 500 000"`.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats kopecks as rubles: `150000` -> `"1 500 р."`, `150050` -> `"1 500.50 р."`.
#[must_use]
pub fn format_currency(amount_kopecks: i64) -> String {
    let rubles = amount_kopecks.div_euclid(100);
    let kopecks = amount_kopecks.rem_euclid(100);

    if kopecks == 0 {
        format!("{} р.", group_thousands(rubles))
    } else {
        format!("{}.{kopecks:02} р.", group_thousands(rubles))
    }
}

/// Renders fractional hours as `H:MM`, carrying a rounded-up 60 minutes into the hour.
#[must_use]
pub fn hours_to_clock(hours: f64) -> String {
    #[allow(clippy::cast_possible_truncation)] // Durations are far below i64 range
    let mut whole = hours.trunc() as i64;
    #[allow(clippy::cast_possible_truncation)]
    let mut minutes = ((hours - hours.trunc()) * 60.0).round() as i64;
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }
    format!("{whole}:{minutes:02}")
}

/// Picks the singular / paucal / plural form for `count`.
const fn plural_form<'a>(count: i64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    match count {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

/// Formats hours with the agreeing word: `1.0` -> `"1:00 час"`, `3.0` -> `"3:00 часа"`,
/// `8.5` -> `"8:30 часов"`.
#[must_use]
pub fn format_hours(hours: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let whole = hours.trunc() as i64;
    let word = plural_form(whole, "час", "часа", "часов");
    format!("{} {word}", hours_to_clock(hours))
}

/// Formats a day count: `1` -> `"1 день"`, `3` -> `"3 дня"`, `5` -> `"5 дней"`.
#[must_use]
pub fn format_work_days(days: usize) -> String {
    let count = i64::try_from(days).unwrap_or(i64::MAX);
    format!("{days} {}", plural_form(count, "день", "дня", "дней"))
}

/// Hourly rate rounded to whole rubles: `format_rate(500_000, 10.0)` -> `"500 р./час"`.
#[must_use]
pub fn format_rate(amount_kopecks: i64, hours: f64) -> String {
    if hours == 0.0 {
        return "0 р./час".to_string();
    }

    #[allow(clippy::cast_precision_loss)] // Realistic totals are well within f64 precision
    let rubles = amount_kopecks as f64 / 100.0;
    #[allow(clippy::cast_possible_truncation)]
    let rate = (rubles / hours).round_ties_even() as i64;

    format!("{} р./час", group_thousands(rate))
}

/// Localised "month year" in the prepositional case: `"августе 2024"`.
#[must_use]
pub fn format_month_year(date: NaiveDate) -> String {
    let month = MONTHS_PREPOSITIONAL
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{month} {}", date.year())
}

/// `DD.MM.YY`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%y").to_string()
}

/// `HH:MM`
#[must_use]
pub fn format_time(moment: NaiveDateTime) -> String {
    moment.format("%H:%M").to_string()
}

/// `DD.MM.YY - DD.MM.YY`, or a single date when both ends coincide.
#[must_use]
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        format_date(start)
    } else {
        format!("{} - {}", format_date(start), format_date(end))
    }
}
