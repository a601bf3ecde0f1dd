//! Date and time parsing for chat input.
//!
//! Dates are typed as `DD.MM.YY` or `DD.MM.YYYY`; two-digit years belong to the 2000s and
//! anything outside 2000..=2100 is rejected. Times accept `HH:MM`, `HH.MM`, `HHMM` or a
//! bare hour. All parsers return `None` on bad input so the caller can re-prompt.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

const TODAY_WORDS: [&str; 4] = ["сегодня", "today", "сейчас", "now"];
const YESTERDAY_WORDS: [&str; 2] = ["вчера", "yesterday"];

fn parse_number<T: std::str::FromStr>(part: &str, max_len: usize) -> Option<T> {
    if part.is_empty() || part.len() > max_len || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Parses `DD.MM.YY` / `DD.MM.YYYY` into a calendar date.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('.');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let day: u32 = parse_number(day, 2)?;
    let month: u32 = parse_number(month, 2)?;
    let year: i32 = match year.len() {
        2 => MIN_YEAR + parse_number::<i32>(year, 2)?,
        4 => parse_number(year, 4)?,
        _ => return None,
    };

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolves a typed date answer: the "today"/"yesterday" keywords relative to `today`,
/// otherwise [`parse_date`].
#[must_use]
pub fn resolve_date_text(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = text.trim().to_lowercase();
    if TODAY_WORDS.contains(&lowered.as_str()) {
        return Some(today);
    }
    if YESTERDAY_WORDS.contains(&lowered.as_str()) {
        return today.pred_opt();
    }
    parse_date(&lowered)
}

/// Parses a time of day and attaches it to `on`.
#[must_use]
pub fn parse_time(text: &str, on: NaiveDate) -> Option<NaiveDateTime> {
    let text = text.trim();
    let (hour, minute): (u32, u32) = if let Some((h, m)) = text.split_once([':', '.']) {
        (parse_number(h, 2)?, parse_number(m, 2)?)
    } else {
        match text.len() {
            1 | 2 => (parse_number(text, 2)?, 0),
            4 => {
                let (h, m) = text.split_at_checked(2)?;
                (parse_number(h, 2)?, parse_number(m, 2)?)
            }
            _ => return None,
        }
    };

    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0).map(|time| on.and_time(time))
}

/// Hours between two instants, rounded to two decimals. Zero when `end` is not after `start`.
#[must_use]
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    if end <= start {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)] // Seconds in a day fit comfortably in f64
    let seconds = (end - start).num_seconds() as f64;
    (seconds / 3600.0 * 100.0).round() / 100.0
}
