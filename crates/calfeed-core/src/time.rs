//! Time values for calendar events.
//!
//! This module provides [`TimeValue`], the loosely-typed "instant or date"
//! supplied by event sources, [`EventTime`], its parsed form, and the
//! formatting helpers that render either as iCalendar `DATE` or UTC
//! `DATE-TIME` tokens.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `strftime` pattern for iCalendar `DATE` values.
const ICS_DATE_FORMAT: &str = "%Y%m%d";

/// `strftime` pattern for iCalendar UTC `DATE-TIME` values.
const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Timestamp shapes carrying an explicit offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Timestamp shapes without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Errors produced while parsing or formatting a time value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A bare `YYYY-MM-DD` value that is not a valid calendar date.
    #[error("invalid date {0:?}")]
    InvalidDate(String),

    /// A value that is not a recognizable ISO-8601 timestamp.
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    /// Date arithmetic left the supported calendar range.
    #[error("date out of range: {0}")]
    OutOfRange(String),
}

/// Represents the time of a calendar event once parsed.
///
/// - **DateTime**: a specific point in time, stored as UTC
/// - **AllDay**: a calendar date without a time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific datetime, stored in UTC.
    DateTime(DateTime<Utc>),
    /// A date without a time of day.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a new `EventTime::DateTime` from a UTC datetime.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates a new `EventTime::DateTime` from a datetime in any timezone.
    pub fn from_local<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self::DateTime(dt.with_timezone(&Utc))
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is a date without a time of day.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the date portion of this event time.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::AllDay(date) => *date,
        }
    }

    /// Converts to a UTC datetime; dates map to midnight UTC.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::AllDay(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    /// Renders this time as an iCalendar token.
    ///
    /// `date_only` selects `YYYYMMDD`; otherwise the value is rendered as a
    /// UTC `YYYYMMDDTHHMMSSZ` token.
    pub fn format(&self, date_only: bool) -> String {
        if date_only {
            format_date(self.date())
        } else {
            format_datetime(self.to_utc_datetime())
        }
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc_datetime().cmp(&other.to_utc_datetime())
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }
}

/// A start or end value as supplied by an event source.
///
/// Sources either hand over typed values or ISO-8601 text. When deserialized,
/// strings that already are `YYYY-MM-DD` dates or RFC 3339 instants land in
/// the typed variants; everything else is kept as [`TimeValue::Text`] and
/// parsed lazily by [`TimeValue::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// A calendar date.
    Date(NaiveDate),
    /// A UTC instant.
    DateTime(DateTime<Utc>),
    /// Unparsed ISO-8601 text.
    Text(String),
}

impl TimeValue {
    /// Parses this value into an [`EventTime`].
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when the text is not a valid ISO-8601 date
    /// or timestamp.
    pub fn parse(&self) -> Result<EventTime, FormatError> {
        match self {
            Self::Date(date) => Ok(EventTime::AllDay(*date)),
            Self::DateTime(dt) => Ok(EventTime::DateTime(*dt)),
            Self::Text(text) => parse_time_text(text),
        }
    }
}

impl From<EventTime> for TimeValue {
    fn from(time: EventTime) -> Self {
        match time {
            EventTime::DateTime(dt) => Self::DateTime(dt),
            EventTime::AllDay(date) => Self::Date(date),
        }
    }
}

impl From<DateTime<Utc>> for TimeValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for TimeValue {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<&str> for TimeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Parses ISO-8601 text into an [`EventTime`].
///
/// A bare 10-character value without a `T` is a calendar date. Anything else
/// is a full timestamp; a trailing `Z` is read as a `+00:00` offset and
/// timestamps without an offset are taken to be UTC already.
///
/// Explicit offsets are honoured, not dropped: `17:30+02:00` becomes
/// `15:30` UTC.
///
/// # Errors
///
/// Returns [`FormatError::InvalidDate`] or [`FormatError::InvalidTimestamp`]
/// when the text does not parse.
pub fn parse_time_text(text: &str) -> Result<EventTime, FormatError> {
    let text = text.trim();

    if text.len() == 10 && !text.contains('T') {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(EventTime::AllDay)
            .map_err(|_| FormatError::InvalidDate(text.to_string()));
    }

    let normalized = match text.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => text.to_string(),
    };

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(EventTime::DateTime(dt.with_timezone(&Utc)));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(EventTime::DateTime(dt.and_utc()));
        }
    }

    Err(FormatError::InvalidTimestamp(text.to_string()))
}

/// Formats a supplied time value as an iCalendar token.
///
/// Text values go through [`parse_time_text`], so an offset timestamp is
/// rendered as the same instant in UTC.
///
/// # Errors
///
/// Returns a [`FormatError`] if the value is unparsable text.
pub fn format_time_value(value: &TimeValue, date_only: bool) -> Result<String, FormatError> {
    value.parse().map(|time| time.format(date_only))
}

/// Formats a date as `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(ICS_DATE_FORMAT).to_string()
}

/// Formats an instant as a UTC `YYYYMMDDTHHMMSSZ` token.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(ICS_DATETIME_FORMAT).to_string()
}

/// Returns the day after `date`.
///
/// # Errors
///
/// Returns [`FormatError::OutOfRange`] for the last representable date.
pub fn next_day(date: NaiveDate) -> Result<NaiveDate, FormatError> {
    date.succ_opt()
        .ok_or_else(|| FormatError::OutOfRange(format!("no day after {date}")))
}
