//! Time-of-day arithmetic for drag and resize edits.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{FormatError, SyncError};
use crate::models::{event_model::ScheduledEventRecord, DateRange};

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Parses `HH:MM`, `HH:MM:SS` and `HH:MM:SS.ffffff`.
pub fn parse_time(value: &str) -> Result<NaiveTime, FormatError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .ok_or_else(|| FormatError::InvalidTime {
            value: value.to_owned(),
        })
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Whole minutes between two instants, rounded to the nearest minute.
pub fn rounded_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    ((end - start).num_milliseconds() as f64 / 60_000.0).round() as i64
}

/// Date of `weekday` (0 = Monday) in the Monday-based week containing `week_of`.
pub fn weekday_date(week_of: NaiveDate, weekday: u8) -> Result<NaiveDate, FormatError> {
    if weekday > 6 {
        return Err(FormatError::InvalidWeekday { value: weekday });
    }
    let monday = week_of - Duration::days(i64::from(week_of.weekday().num_days_from_monday()));
    Ok(monday + Duration::days(i64::from(weekday)))
}

/// Every date of `weekday` inside `range`, end exclusive.
pub fn weekday_dates(range: &DateRange, weekday: u8) -> Result<Vec<NaiveDate>, FormatError> {
    let mut date = weekday_date(range.start, weekday)?;
    if date < range.start {
        date = date + Duration::days(7);
    }
    let mut dates = Vec::new();
    while date < range.end {
        dates.push(date);
        date = date + Duration::days(7);
    }
    Ok(dates)
}

/// Length of a record in minutes: its stored duration, or the span of its times.
pub fn record_duration(record: &ScheduledEventRecord) -> Result<i64, FormatError> {
    if let Some(minutes) = record.duration_minutes {
        return Ok(i64::from(minutes));
    }
    let start = parse_time(&record.start_time)?;
    let end = parse_time(&record.end_time)?;
    Ok((end - start).num_minutes())
}

/// Copy of `record` placed at `start..end`, re-anchored on the new date.
fn placed(
    record: &ScheduledEventRecord,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<ScheduledEventRecord, SyncError> {
    if end <= start {
        return Err(FormatError::InvertedTimes {
            id: record.id,
            start: start.to_string(),
            end: end.to_string(),
        }
        .into());
    }
    if end.date() != start.date() {
        return Err(SyncError::SpansMidnight { id: record.id });
    }

    let mut updated = record.clone();
    if record.specific_date.is_some() {
        updated.specific_date = Some(start.date().format("%Y-%m-%d").to_string());
    } else if record.weekday.is_some() {
        // num_days_from_monday is always below 7
        updated.weekday = Some(start.weekday().num_days_from_monday() as u8);
    } else {
        return Err(FormatError::MissingAnchor { id: record.id }.into());
    }
    updated.start_time = format_time(start.time());
    updated.end_time = format_time(end.time());
    Ok(updated)
}

/// The record after a drag to `new_start`; the duration is kept.
pub fn moved(
    record: &ScheduledEventRecord,
    new_start: NaiveDateTime,
) -> Result<ScheduledEventRecord, SyncError> {
    let duration = record_duration(record)?;
    placed(record, new_start, new_start + Duration::minutes(duration))
}

/// The record after a resize to `new_start..new_end`; the duration follows the new bounds.
pub fn resized(
    record: &ScheduledEventRecord,
    new_start: NaiveDateTime,
    new_end: NaiveDateTime,
) -> Result<ScheduledEventRecord, SyncError> {
    let mut updated = placed(record, new_start, new_end)?;
    let minutes = rounded_minutes(new_start, new_end);
    updated.duration_minutes = u32::try_from(minutes).ok();
    Ok(updated)
}

#[cfg(test)]
#[path = "tests/schedule_time_tests.rs"]
mod tests;
