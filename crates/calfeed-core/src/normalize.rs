//! RawEvent to CalendarEvent conversion.
//!
//! The normalization process:
//! 1. Rejects records without a start
//! 2. Resolves start/end into an [`EventSpan`], inferring a missing end
//! 3. Fills the uid and title defaults and drops empty optional fields
//!
//! Rejections are per record: callers skip the record and carry on.

use thiserror::Error;

use crate::event::{CalendarEvent, DEFAULT_TITLE, EventSpan, RawEvent};
use crate::time::{EventTime, FormatError, TimeValue, next_day};
use crate::uid::UidGenerator;

/// Why a raw record was left out of the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The record has no start value.
    #[error("event has no start")]
    MissingStart,

    /// A start or end value could not be parsed.
    #[error("invalid {field}: {source}")]
    InvalidTime {
        /// Which field failed (`start` or `end`).
        field: &'static str,
        /// The underlying parse failure.
        #[source]
        source: FormatError,
    },
}

/// A record that did not survive normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    /// Position of the record in the input.
    pub index: usize,
    /// The source uid, when it had one.
    pub uid: Option<String>,
    /// Why it was skipped.
    pub reason: NormalizeError,
}

/// Converts a [`RawEvent`] to a [`CalendarEvent`].
///
/// All-day events without an end last one day; timed events without an end
/// take zero time. A missing or blank uid is replaced with one from `uids`.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the record has no start or carries an
/// unparsable start or end.
pub fn normalize_event(
    raw: &RawEvent,
    uids: &dyn UidGenerator,
) -> Result<CalendarEvent, NormalizeError> {
    let start = raw.start.as_ref().ok_or(NormalizeError::MissingStart)?;
    let start = parse_field("start", start)?;
    let end = raw
        .end
        .as_ref()
        .map(|end| parse_field("end", end))
        .transpose()?;

    let span = resolve_span(start, end, raw.is_all_day())?;

    let uid = non_empty(raw.uid.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| uids.next_uid());
    let title = non_empty(raw.title.as_deref()).unwrap_or(DEFAULT_TITLE);

    let mut event = CalendarEvent::new(uid, title, span);
    event.description = non_empty(raw.description.as_deref()).map(str::to_string);
    event.location = non_empty(raw.location.as_deref()).map(str::to_string);
    event.url = non_empty(raw.url.as_deref()).map(str::to_string);
    event.status = non_empty(raw.status.as_deref()).map(str::to_string);
    event.categories = raw
        .categories
        .iter()
        .flatten()
        .filter(|category| !category.is_empty())
        .cloned()
        .collect();

    Ok(event)
}

/// Normalizes a batch of raw events.
///
/// Returns the survivors in input order together with the skipped records.
pub fn normalize_events(
    raw_events: &[RawEvent],
    uids: &dyn UidGenerator,
) -> (Vec<CalendarEvent>, Vec<SkippedEvent>) {
    let mut events = Vec::with_capacity(raw_events.len());
    let mut skipped = Vec::new();

    for (index, raw) in raw_events.iter().enumerate() {
        match normalize_event(raw, uids) {
            Ok(event) => events.push(event),
            Err(reason) => skipped.push(SkippedEvent {
                index,
                uid: raw.uid.clone(),
                reason,
            }),
        }
    }

    (events, skipped)
}

fn parse_field(field: &'static str, value: &TimeValue) -> Result<EventTime, NormalizeError> {
    value
        .parse()
        .map_err(|source| NormalizeError::InvalidTime { field, source })
}

fn resolve_span(
    start: EventTime,
    end: Option<EventTime>,
    all_day: bool,
) -> Result<EventSpan, NormalizeError> {
    if all_day {
        let start = start.date();
        let end = match end {
            Some(end) => end.date(),
            None => next_day(start).map_err(|source| NormalizeError::InvalidTime {
                field: "end",
                source,
            })?,
        };
        Ok(EventSpan::AllDay { start, end })
    } else {
        let start = start.to_utc_datetime();
        let end = end.map_or(start, |end| end.to_utc_datetime());
        Ok(EventSpan::Timed { start, end })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
