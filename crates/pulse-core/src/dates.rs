//! Join-key normalization for both sides of the price/news merge
//!
//! Both sides are truncated to a calendar day. Article timestamps are moved to
//! UTC first. Price timestamps keep the exchange's wall-clock date and only
//! lose their offset, so a `00:00:00+09:00` session stays on its own day.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse a date or timestamp into a naive UTC timestamp
///
/// Offset-aware inputs are converted to UTC before the offset is dropped.
/// Naive inputs are taken as-is and bare dates map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    parse_with(value, |dt: DateTime<FixedOffset>| dt.naive_utc())
}

/// Parse a date or timestamp, dropping any offset without converting
pub fn parse_local_timestamp(value: &str) -> Option<NaiveDateTime> {
    parse_with(value, |dt: DateTime<FixedOffset>| dt.naive_local())
}

fn parse_with(
    value: &str,
    strip_offset: fn(DateTime<FixedOffset>) -> NaiveDateTime,
) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(strip_offset(dt));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(strip_offset(dt));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// UTC calendar day of an article timestamp, used as the merge key
///
/// Returns `None` for unparseable values and for anything not strictly after
/// the Unix epoch; callers drop those rows.
pub fn join_date(value: &str) -> Option<NaiveDate> {
    day_after_epoch(parse_timestamp(value)?)
}

/// Wall-clock calendar day of a price row, used as the merge key
///
/// Same rejection rules as [`join_date`].
pub fn price_date(value: &str) -> Option<NaiveDate> {
    day_after_epoch(parse_local_timestamp(value)?)
}

fn day_after_epoch(ts: NaiveDateTime) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
    if ts <= epoch {
        return None;
    }
    Some(ts.date())
}

/// Format a calendar day the way every stage writes it
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
