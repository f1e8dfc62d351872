//! Fixed-offset wall-clock arithmetic.
//!
//! Orders carry a signed UTC offset in minutes rather than a named zone, so
//! every conversion here is a plain shift: no DST rules, no zone database.
//! Naive timestamps are interpreted in the caller's offset; timestamps that
//! already carry an offset or `Z` are taken as absolute instants.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use thiserror::Error;

use crate::types::ValidationError;

/// Accepted naive datetime layouts, tried in order.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Fixed-width layouts checked before handing input to chrono, which also
/// accepts unpadded and signed fields. `d` stands for an ASCII digit.
const DATE_SHAPE: &[u8] = b"dddd-dd-dd";
const MINUTE_SHAPE: &[u8] = b"dddd-dd-ddTdd:dd";
const SECOND_SHAPE: &[u8] = b"dddd-dd-ddTdd:dd:dd";

/// Rendered form of a local timestamp, e.g. `2026-01-15T08:00:00+02:00`.
const LOCAL_RENDER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A date or timestamp string that matched none of the accepted forms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed timestamp: {value:?}")]
pub struct MalformedTimestamp {
    /// The rejected input.
    pub value: String,
}

impl MalformedTimestamp {
    fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// A validated fixed UTC offset, stored at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset(FixedOffset);

impl UtcOffset {
    /// Largest accepted offset magnitude (18 hours).
    pub const MAX_MINUTES: i64 = 18 * 60;

    /// Creates an offset from signed minutes east of UTC.
    pub fn from_minutes(minutes: i64) -> Result<Self, ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            field: "utc_offset_minutes",
            value: minutes,
            min: -Self::MAX_MINUTES,
            max: Self::MAX_MINUTES,
        };
        if !(-Self::MAX_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(out_of_range());
        }
        let seconds = i32::try_from(minutes * 60).map_err(|_| out_of_range())?;
        FixedOffset::east_opt(seconds)
            .map(Self)
            .ok_or_else(out_of_range)
    }

    /// The UTC offset itself (`+00:00`).
    #[must_use]
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// Signed minutes east of UTC.
    #[must_use]
    pub fn minutes(self) -> i64 {
        i64::from(self.0.local_minus_utc() / 60)
    }

    /// The offset as a chrono [`FixedOffset`].
    #[must_use]
    pub const fn fixed(self) -> FixedOffset {
        self.0
    }

    fn shift(self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

/// Parses a calendar date in strict `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<NaiveDate, MalformedTimestamp> {
    parse_date_only(value).ok_or_else(|| MalformedTimestamp::new(value))
}

/// Absolute instant of local midnight on `date` at `offset`.
///
/// This is UTC midnight of the same calendar date shifted back by the offset,
/// so `2026-01-15` at `+02:00` is `2026-01-14T22:00:00Z`.
pub fn local_midnight(
    date: NaiveDate,
    offset: UtcOffset,
) -> Result<DateTime<Utc>, MalformedTimestamp> {
    local_to_instant(date.and_time(NaiveTime::default()), offset)
}

/// Converts a naive local wall-clock time at `offset` to an absolute instant.
///
/// Fails when the shifted instant falls outside chrono's representable range.
pub fn local_to_instant(
    local: NaiveDateTime,
    offset: UtcOffset,
) -> Result<DateTime<Utc>, MalformedTimestamp> {
    local
        .and_utc()
        .checked_sub_signed(offset.shift())
        .ok_or_else(|| MalformedTimestamp::new(&local.to_string()))
}

/// Parses a timestamp into an absolute instant.
///
/// Supports:
/// - Date only: `2026-01-15` (local midnight at `offset`)
/// - Naive datetime: `2026-01-15T08:00` or `2026-01-15T08:00:00[.fff]` (local at `offset`)
/// - Offset-qualified: `2026-01-15T08:00:00Z`, `2026-01-15T08:00+05:30`, ...
///
/// `offset` only applies to the naive forms. A qualified timestamp keeps its
/// own offset even when it disagrees with the order's.
pub fn parse_instant(value: &str, offset: UtcOffset) -> Result<DateTime<Utc>, MalformedTimestamp> {
    let malformed = || MalformedTimestamp::new(value);

    if let Some(date) = parse_date_only(value) {
        return local_midnight(date, offset).map_err(|_| malformed());
    }

    if let Some(local) = parse_naive(value) {
        return local_to_instant(local, offset).map_err(|_| malformed());
    }

    parse_qualified(value).ok_or_else(malformed)
}

/// Renders an instant as local ISO 8601 time at `offset`.
///
/// The suffix always spells out the offset, so UTC renders as `+00:00`.
pub fn render_local(instant: DateTime<Utc>, offset: UtcOffset) -> String {
    instant
        .with_timezone(&offset.fixed())
        .format(LOCAL_RENDER_FORMAT)
        .to_string()
}

/// Whether `value` starts with `shape`, digit for digit.
fn has_shape(value: &str, shape: &[u8]) -> bool {
    value.len() >= shape.len()
        && value.bytes().zip(shape).all(|(byte, &expected)| {
            if expected == b'd' {
                byte.is_ascii_digit()
            } else {
                byte == expected
            }
        })
}

fn parse_date_only(value: &str) -> Option<NaiveDate> {
    if value.len() != DATE_SHAPE.len() || !has_shape(value, DATE_SHAPE) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let padded = has_shape(value, MINUTE_SHAPE)
        && (value.len() == MINUTE_SHAPE.len() || has_shape(value, SECOND_SHAPE));
    if !padded {
        return None;
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn parse_qualified(value: &str) -> Option<DateTime<Utc>> {
    if !has_shape(value, MINUTE_SHAPE) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // RFC 3339 requires seconds; also accept minute precision
    let normalized = value
        .strip_suffix(['Z', 'z'])
        .map_or_else(|| value.to_string(), |rest| format!("{rest}+00:00"));
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
