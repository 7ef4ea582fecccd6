//! Event records as produced by event sources.
//!
//! A [`SourceEvent`] is stricter than [`RawEvent`]: it always has a start
//! and an end. Sources build these; [`SourceEvent::to_raw`] hands them to
//! the encoder.

use std::collections::BTreeMap;

use calfeed_core::{EventTime, RawEvent};
use serde::{Deserialize, Serialize};

/// Status written for every event rendered from a source.
pub const SOURCE_EVENT_STATUS: &str = "CONFIRMED";

/// An event fetched from a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Source-assigned unique identifier; empty means "generate one".
    #[serde(default)]
    pub uid: String,
    /// The event title.
    #[serde(default, alias = "name", alias = "summary")]
    pub title: String,
    /// When the event starts.
    #[serde(with = "time_text", alias = "begin")]
    pub start: EventTime,
    /// When the event ends.
    #[serde(with = "time_text")]
    pub end: EventTime,
    /// Whether this is an all-day event.
    #[serde(default)]
    pub all_day: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Where the event takes place.
    #[serde(default)]
    pub location: String,
    /// Source-specific data that is not rendered.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SourceEvent {
    /// Creates a new source event.
    pub fn new(
        uid: impl Into<String>,
        title: impl Into<String>,
        start: impl Into<EventTime>,
        end: impl Into<EventTime>,
    ) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            start: start.into(),
            end: end.into(),
            all_day: false,
            description: String::new(),
            location: String::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder method to mark as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder method to set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to attach source-specific data.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Converts this event into a record for the encoder.
    ///
    /// The status is always `CONFIRMED`; `extra` is not carried over.
    pub fn to_raw(&self) -> RawEvent {
        let mut raw = RawEvent::new(self.start)
            .with_end(self.end)
            .with_all_day(self.all_day)
            .with_status(SOURCE_EVENT_STATUS);
        if !self.uid.is_empty() {
            raw = raw.with_uid(self.uid.as_str());
        }
        if !self.title.is_empty() {
            raw = raw.with_title(self.title.as_str());
        }
        if !self.description.is_empty() {
            raw = raw.with_description(self.description.as_str());
        }
        if !self.location.is_empty() {
            raw = raw.with_location(self.location.as_str());
        }
        raw
    }
}

/// Reads event times from ISO-8601 text (or any other [`TimeValue`] shape)
/// and writes them back as text.
///
/// [`TimeValue`]: calfeed_core::TimeValue
mod time_text {
    use calfeed_core::{EventTime, TimeValue};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &EventTime, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            EventTime::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            EventTime::AllDay(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EventTime, D::Error> {
        TimeValue::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}
