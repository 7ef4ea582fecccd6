//! Event types for calendar documents.
//!
//! - [`RawEvent`]: a loosely-typed record as produced by an event source
//! - [`CalendarEvent`]: the canonical, fully-defaulted record the encoder emits
//! - [`EventSpan`]: the start/end pair, either all-day dates or UTC instants

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::time::TimeValue;

/// Title used when a record does not carry one.
pub const DEFAULT_TITLE: &str = "Untitled Event";

/// A raw event record from a source.
///
/// Every field is optional; the normalizer decides what is usable. Field
/// names accept the aliases used by the scrapers (`name` / `summary` for the
/// title, `begin` for the start).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    /// Source-assigned unique identifier.
    pub uid: Option<String>,

    /// The event title.
    #[serde(alias = "name", alias = "summary")]
    pub title: Option<String>,

    /// When the event starts. Records without a start are dropped.
    #[serde(alias = "begin")]
    pub start: Option<TimeValue>,

    /// When the event ends.
    pub end: Option<TimeValue>,

    /// Whether the event is an all-day event.
    pub all_day: Option<bool>,

    /// Free-form description.
    pub description: Option<String>,

    /// Where the event takes place.
    pub location: Option<String>,

    /// A link for the event, emitted verbatim.
    pub url: Option<String>,

    /// Event status (e.g. `CONFIRMED`), emitted verbatim.
    pub status: Option<String>,

    /// Categories, in order.
    pub categories: Option<Vec<String>>,
}

impl RawEvent {
    /// Creates a raw event with only a start value.
    pub fn new(start: impl Into<TimeValue>) -> Self {
        Self {
            start: Some(start.into()),
            ..Self::default()
        }
    }

    /// Builder method to set the uid.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the end.
    pub fn with_end(mut self, end: impl Into<TimeValue>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Builder method to set the all-day flag.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = Some(all_day);
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder method to set the categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the all-day flag, defaulting to `false`.
    pub fn is_all_day(&self) -> bool {
        self.all_day.unwrap_or(false)
    }
}

/// The start and end of a canonical event.
///
/// Both ends always share one representation, so an event is rendered
/// either as a `VALUE=DATE` pair or as a UTC date-time pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSpan {
    /// Calendar dates; `end` is exclusive.
    AllDay { start: NaiveDate, end: NaiveDate },
    /// UTC instants.
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl EventSpan {
    /// Returns true for an all-day span.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay { .. })
    }
}

/// A canonical calendar event, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique identifier; never empty.
    pub uid: String,
    /// The event title; never empty.
    pub title: String,
    /// Start and end.
    pub span: EventSpan,
    /// Description, if any.
    pub description: Option<String>,
    /// Location, if any.
    pub location: Option<String>,
    /// URL, if any.
    pub url: Option<String>,
    /// Status, if any.
    pub status: Option<String>,
    /// Non-empty categories, in source order.
    pub categories: Vec<String>,
}

impl CalendarEvent {
    /// Creates an event with required fields.
    pub fn new(uid: impl Into<String>, title: impl Into<String>, span: EventSpan) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            span,
            description: None,
            location: None,
            url: None,
            status: None,
            categories: Vec::new(),
        }
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.span.is_all_day()
    }
}
