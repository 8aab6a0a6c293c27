// Trip length reconciliation between traveller-picked dates and the
// itinerary's fixed duration.

use chrono::{DateTime, Days, NaiveDate, Utc};
use thiserror::Error;

use crate::model::{Itinerary, TripParameters};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateParseError {
    #[error("Invalid trip date: {0}")]
    InvalidDate(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("This itinerary is for {expected} days. Please select exact dates matching {expected} days (selected {selected}).")]
    DurationMismatch { expected: u32, selected: u32 },

    #[error("Itinerary has no fixed duration")]
    MissingDuration,
}

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Inclusive day count between two calendar dates, never less than 1.
pub fn calculate_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let span = (end - start).num_days();
    clamp_days(span + 1)
}

/// Inclusive day count between two instants, rounding partial days up.
pub fn calculate_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let seconds = (end - start).num_seconds();
    // ceil for positive spans; div_euclid floors negatives, then +1 below
    let whole_days = seconds.div_euclid(SECONDS_PER_DAY)
        + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0);
    clamp_days(whole_days + 1)
}

fn clamp_days(days: i64) -> u32 {
    days.clamp(1, u32::MAX as i64) as u32
}

/// Days the traveller is asking for: explicit dates first, then the
/// itinerary's declared length.
pub fn requested_days(itinerary: &Itinerary, params: &TripParameters) -> u32 {
    match params.date_range() {
        Some((start, end)) => calculate_days(start, end),
        None => itinerary.declared_days(),
    }
}

/// Inclusive end date for a trip of `duration_days` starting on `start`.
pub fn end_date_for(start: NaiveDate, duration_days: u32) -> NaiveDate {
    let offset = u64::from(duration_days.max(1) - 1);
    start.checked_add_days(Days::new(offset)).unwrap_or(NaiveDate::MAX)
}

/// A fixed-length itinerary can only be booked for exactly its duration.
pub fn validate_booking_range(
    itinerary: &Itinerary,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u32, BookingError> {
    let expected = itinerary.duration_days.ok_or(BookingError::MissingDuration)?;
    let selected = calculate_days(start, end);
    if selected != expected {
        return Err(BookingError::DurationMismatch { expected, selected });
    }
    Ok(selected)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (UTC date taken).
pub fn parse_trip_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| DateParseError::InvalidDate(value.to_string()))
}
