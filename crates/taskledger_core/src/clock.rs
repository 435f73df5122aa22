//! Timestamp helpers for task records.
//!
//! # Responsibility
//! - Produce local wall-clock stamps in the `dd/mm/yyyy HH:MM` shape.
//! - Normalize stamps from older data sources into the same shape.
//!
//! # Invariants
//! - Blank input normalizes to blank output.
//! - Normalization never fails; unparseable values fall back to "now".

use once_cell::sync::Lazy;
use regex::Regex;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

static STAMP_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4} \d{2}:\d{2}").expect("valid stamp regex"));

/// Returns the current local time as a `dd/mm/yyyy HH:MM` stamp.
pub fn now_stamp() -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let now = OffsetDateTime::now_utc().to_offset(offset);
    format_stamp(PrimitiveDateTime::new(now.date(), now.time()))
}

/// Formats a date-time as `dd/mm/yyyy HH:MM`.
pub fn format_stamp(value: PrimitiveDateTime) -> String {
    value
        .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_else(|_| value.to_string())
}

/// Normalizes a stored stamp into `dd/mm/yyyy HH:MM`.
///
/// Accepted inputs, in order: already-normalized stamps (kept verbatim),
/// ISO date-times with or without fractional seconds or `T` separator,
/// `d/m/yyyy H:MM` date-times, ISO dates, and `d/m/yyyy` dates. Day, month
/// and hour may be written without a leading zero.
pub fn normalize_stamp(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if STAMP_SHAPE_RE.is_match(trimmed) {
        return trimmed.to_string();
    }

    match parse_loose(trimmed) {
        Some(parsed) => format_stamp(parsed),
        None => now_stamp(),
    }
}

fn parse_loose(value: &str) -> Option<PrimitiveDateTime> {
    let date_times = [
        PrimitiveDateTime::parse(
            value,
            format_description!(
                "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]:[second].[subsecond]"
            ),
        ),
        PrimitiveDateTime::parse(
            value,
            format_description!(
                "[year]-[month padding:none]-[day padding:none] [hour padding:none]:[minute]:[second]"
            ),
        ),
        PrimitiveDateTime::parse(
            value,
            format_description!(
                "[year]-[month padding:none]-[day padding:none]T[hour padding:none]:[minute]:[second]"
            ),
        ),
        PrimitiveDateTime::parse(
            value,
            format_description!(
                "[day padding:none]/[month padding:none]/[year] [hour padding:none]:[minute]"
            ),
        ),
    ];
    if let Some(parsed) = date_times.into_iter().find_map(Result::ok) {
        return Some(parsed);
    }

    let dates = [
        Date::parse(
            value,
            format_description!("[year]-[month padding:none]-[day padding:none]"),
        ),
        Date::parse(
            value,
            format_description!("[day padding:none]/[month padding:none]/[year]"),
        ),
    ];
    dates
        .into_iter()
        .find_map(Result::ok)
        .map(|date| date.midnight())
}
