use super::models::EventDateTime;
use crate::error::{validation_error, AppResult};
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Message returned for any time string that cannot be parsed
pub const INVALID_TIME: &str = "Invalid start or end time";

/// Naive formats accepted from the browser, tried in order
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a user supplied time string.
///
/// RFC 3339 strings keep their own offset. Naive date-times (such as the
/// `datetime-local` input format) and bare dates are interpreted in `tz`.
pub fn parse_event_time(input: &str, tz: Tz) -> AppResult<DateTime<FixedOffset>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(validation_error(INVALID_TIME));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| validation_error(INVALID_TIME))?;

    localize(&naive, tz)
}

/// Attach `tz` to a naive date-time
fn localize(naive: &NaiveDateTime, tz: Tz) -> AppResult<DateTime<FixedOffset>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt.fixed_offset()),
        // Repeated hour when clocks go back, take the first occurrence
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.fixed_offset()),
        LocalResult::None => Err(validation_error(INVALID_TIME)),
    }
}

/// Parse a start/end pair and make sure the range is not inverted
pub fn parse_event_range(
    start: &str,
    end: &str,
    tz: Tz,
) -> AppResult<(EventDateTime, EventDateTime)> {
    let start = parse_event_time(start, tz)?;
    let end = parse_event_time(end, tz)?;

    if end < start {
        return Err(validation_error("End time must not be before start time"));
    }

    Ok((event_date_time(&start, tz), event_date_time(&end, tz)))
}

/// Provider representation of a timed (not all-day) instant
pub fn event_date_time(dt: &DateTime<FixedOffset>, tz: Tz) -> EventDateTime {
    EventDateTime {
        date_time: Some(dt.to_rfc3339()),
        date: None,
        time_zone: Some(tz.name().to_string()),
    }
}
