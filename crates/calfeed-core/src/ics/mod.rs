//! iCalendar document assembly (RFC 5545).
//!
//! [`IcsEncoder`] turns raw event records into a complete `VCALENDAR`
//! document. Records that fail normalization are skipped; only invalid
//! calendar metadata fails an encode.
//!
//! # Example
//!
//! ```
//! use calfeed_core::{CalendarMeta, IcsEncoder, RawEvent};
//!
//! let events = vec![RawEvent::new("2024-03-01").with_title("Release").with_all_day(true)];
//! let ics = IcsEncoder::new()
//!     .encode(&events, &CalendarMeta::new("Releases"))
//!     .unwrap();
//! assert!(ics.contains("DTSTART;VALUE=DATE:20240301\r\n"));
//! ```


use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{IcsError, IcsResult};
use crate::escape::{escape_text, strip_line_breaks};
use crate::event::{CalendarEvent, EventSpan, RawEvent};
use crate::fold::fold_line;
use crate::normalize::{SkippedEvent, normalize_events};
use crate::time::{format_date, format_datetime};
use crate::uid::{RandomUid, UidGenerator};

/// Product identifier written to every document.
pub const PRODUCT_ID: &str = "-//Calendar Generator//EN";

/// Timezone label used when the caller does not declare one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Calendar-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMeta {
    /// Display name (`X-WR-CALNAME`).
    pub name: String,
    /// Optional description (`X-WR-CALDESC`).
    #[serde(default)]
    pub description: Option<String>,
    /// Declared timezone label (`X-WR-TIMEZONE`).
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl CalendarMeta {
    /// Creates metadata with the given name and the default timezone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            timezone: default_timezone(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the timezone label.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Checks that the metadata can produce a meaningful document.
    ///
    /// # Errors
    ///
    /// Returns [`IcsError::MissingCalendarName`] for a blank name and
    /// [`IcsError::InvalidMetadata`] for an empty timezone label or one that
    /// contains control characters.
    pub fn validate(&self) -> IcsResult<()> {
        if self.name.trim().is_empty() {
            return Err(IcsError::MissingCalendarName);
        }
        if self.timezone.trim().is_empty() {
            return Err(IcsError::InvalidMetadata {
                field: "timezone",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timezone.chars().any(char::is_control) {
            return Err(IcsError::InvalidMetadata {
                field: "timezone",
                reason: "must not contain control characters".to_string(),
            });
        }
        Ok(())
    }
}

/// An encoded document along with what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCalendar {
    /// The iCalendar text, CRLF-terminated.
    pub content: String,
    /// Number of `VEVENT` blocks written.
    pub emitted: usize,
    /// Records left out of the document.
    pub skipped: Vec<SkippedEvent>,
}

/// Serializes event records into iCalendar documents.
///
/// The clock supplies `DTSTAMP` and the uid generator fills in missing
/// identifiers; both can be swapped for deterministic output. The encoder
/// keeps no state between calls.
#[derive(Debug, Clone, Default)]
pub struct IcsEncoder<C = SystemClock, U = RandomUid> {
    clock: C,
    uids: U,
}

impl IcsEncoder {
    /// Creates an encoder using the system clock and random UUIDs.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock, U: UidGenerator> IcsEncoder<C, U> {
    /// Creates an encoder from an explicit clock and uid generator.
    pub fn with_parts(clock: C, uids: U) -> Self {
        Self { clock, uids }
    }

    /// Encodes `events` into a calendar document.
    ///
    /// # Errors
    ///
    /// Returns an [`IcsError`] only when `meta` is invalid.
    pub fn encode(&self, events: &[RawEvent], meta: &CalendarMeta) -> IcsResult<String> {
        self.encode_detailed(events, meta).map(|encoded| encoded.content)
    }

    /// Encodes `events` and reports which records were skipped.
    ///
    /// # Errors
    ///
    /// Returns an [`IcsError`] only when `meta` is invalid.
    pub fn encode_detailed(
        &self,
        events: &[RawEvent],
        meta: &CalendarMeta,
    ) -> IcsResult<EncodedCalendar> {
        meta.validate()?;

        let (normalized, skipped) = normalize_events(events, &self.uids);
        for skip in &skipped {
            debug!(
                index = skip.index,
                uid = ?skip.uid,
                reason = %skip.reason,
                "skipping event"
            );
        }

        let dtstamp = format_datetime(self.clock.now());
        let mut writer = DocumentWriter::default();
        writer.header(meta);

        let mut seen_uids = HashSet::new();
        for event in &normalized {
            if !seen_uids.insert(event.uid.as_str()) {
                warn!(uid = %event.uid, "duplicate uid in calendar");
            }
            writer.event(event, &dtstamp);
        }

        writer.line("END:VCALENDAR");

        info!(
            calendar = %meta.name,
            emitted = normalized.len(),
            skipped = skipped.len(),
            "encoded calendar"
        );

        Ok(EncodedCalendar {
            content: writer.finish(),
            emitted: normalized.len(),
            skipped,
        })
    }
}

/// Encodes events with the system clock and random uids.
///
/// `timezone` defaults to `UTC`.
///
/// # Errors
///
/// Returns an [`IcsError`] when the calendar name is blank or the timezone
/// label is unusable.
pub fn generate_ics(
    events: &[RawEvent],
    calendar_name: &str,
    calendar_description: Option<&str>,
    timezone: Option<&str>,
) -> IcsResult<String> {
    let mut meta = CalendarMeta::new(calendar_name);
    meta.description = calendar_description.map(str::to_string);
    if let Some(timezone) = timezone {
        meta.timezone = timezone.to_string();
    }
    IcsEncoder::new().encode(events, &meta)
}

/// Accumulates folded, CRLF-terminated content lines.
#[derive(Debug, Default)]
struct DocumentWriter {
    out: String,
}

impl DocumentWriter {
    fn line(&mut self, line: &str) {
        self.out.push_str(&fold_line(line));
        self.out.push_str("\r\n");
    }

    fn property(&mut self, name: &str, value: &str) {
        self.line(&format!("{name}:{value}"));
    }

    fn header(&mut self, meta: &CalendarMeta) {
        self.line("BEGIN:VCALENDAR");
        self.property("VERSION", "2.0");
        self.property("PRODID", PRODUCT_ID);
        self.property("CALSCALE", "GREGORIAN");
        self.property("METHOD", "PUBLISH");
        self.property("X-WR-CALNAME", &escape_text(&meta.name));
        self.property("X-WR-TIMEZONE", &meta.timezone);
        if let Some(description) = meta.description.as_deref().filter(|d| !d.is_empty()) {
            self.property("X-WR-CALDESC", &escape_text(description));
        }
    }

    fn event(&mut self, event: &CalendarEvent, dtstamp: &str) {
        self.line("BEGIN:VEVENT");

        match event.span {
            EventSpan::AllDay { start, end } => {
                self.property("DTSTART;VALUE=DATE", &format_date(start));
                self.property("DTEND;VALUE=DATE", &format_date(end));
            }
            EventSpan::Timed { start, end } => {
                self.property("DTSTART", &format_datetime(start));
                self.property("DTEND", &format_datetime(end));
            }
        }

        if let Some(ref description) = event.description {
            self.property("DESCRIPTION", &escape_text(description));
        }
        if let Some(ref location) = event.location {
            self.property("LOCATION", &escape_text(location));
        }
        if let Some(ref url) = event.url {
            self.property("URL", &strip_line_breaks(url));
        }
        if let Some(ref status) = event.status {
            self.property("STATUS", &strip_line_breaks(status));
        }
        if !event.categories.is_empty() {
            self.property("CATEGORIES", &strip_line_breaks(&event.categories.join(",")));
        }

        self.property("UID", &strip_line_breaks(&event.uid));
        self.property("DTSTAMP", dtstamp);
        self.property("SUMMARY", &escape_text(&event.title));
        self.line("END:VEVENT");
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fold::MAX_LINE_OCTETS;
    use crate::uid::SequentialUid;
    use chrono::{TimeZone, Utc};

    fn encoder() -> IcsEncoder<FixedClock, SequentialUid> {
        let now = Utc.with_ymd_and_hms(2024, 2, 20, 8, 0, 0).unwrap();
        IcsEncoder::with_parts(FixedClock(now), SequentialUid::new("test"))
    }

    fn physical_lines(doc: &str) -> Vec<&str> {
        let body = doc.strip_suffix("\r\n").expect("document ends with CRLF");
        body.split("\r\n").collect()
    }

    fn encode(events: &[RawEvent]) -> String {
        encoder()
            .encode(events, &CalendarMeta::new("Test Calendar"))
            .unwrap()
    }

    mod structure {
        use super::*;

        #[test]
        fn empty_input_yields_valid_empty_calendar() {
            let doc = encode(&[]);
            assert_eq!(
                physical_lines(&doc),
                vec![
                    "BEGIN:VCALENDAR",
                    "VERSION:2.0",
                    "PRODID:-//Calendar Generator//EN",
                    "CALSCALE:GREGORIAN",
                    "METHOD:PUBLISH",
                    "X-WR-CALNAME:Test Calendar",
                    "X-WR-TIMEZONE:UTC",
                    "END:VCALENDAR",
                ]
            );
        }

        #[test]
        fn every_line_is_crlf_terminated() {
            let doc = encode(&[RawEvent::new("2024-03-01")]);
            assert!(doc.ends_with("END:VCALENDAR\r\n"));
            assert!(!doc.replace("\r\n", "").contains('\n'));
            assert!(!doc.replace("\r\n", "").contains('\r'));
        }

        #[test]
        fn description_header_is_optional_and_escaped() {
            let meta = CalendarMeta::new("Cal").with_description("Films, series; more");
            let doc = encoder().encode(&[], &meta).unwrap();
            assert!(doc.contains("\r\nX-WR-CALDESC:Films\\, series\\; more\r\n"));

            let doc = encoder().encode(&[], &CalendarMeta::new("Cal")).unwrap();
            assert!(!doc.contains("X-WR-CALDESC"));
        }

        #[test]
        fn timezone_label_is_written_verbatim() {
            let meta = CalendarMeta::new("Cal").with_timezone("America/New_York");
            let doc = encoder().encode(&[], &meta).unwrap();
            assert!(doc.contains("\r\nX-WR-TIMEZONE:America/New_York\r\n"));
        }

        #[test]
        fn field_order_is_fixed() {
            let event = RawEvent::new("2024-03-01T10:00:00Z")
                .with_title("Ordered")
                .with_uid("evt-1")
                .with_status("CONFIRMED")
                .with_categories(["a"])
                .with_url("https://example.com")
                .with_location("Here")
                .with_description("About");
            let doc = encode(&[event]);
            let lines = physical_lines(&doc);
            let begin = lines.iter().position(|l| *l == "BEGIN:VEVENT").unwrap();
            let names: Vec<&str> = lines[begin..]
                .iter()
                .map(|l| l.split([':', ';']).next().unwrap())
                .collect();
            assert_eq!(
                names,
                vec![
                    "BEGIN",
                    "DTSTART",
                    "DTEND",
                    "DESCRIPTION",
                    "LOCATION",
                    "URL",
                    "STATUS",
                    "CATEGORIES",
                    "UID",
                    "DTSTAMP",
                    "SUMMARY",
                    "END",
                    "END",
                ]
            );
        }
    }

    mod dates {
        use super::*;

        #[test]
        fn all_day_without_end() {
            let doc = encode(&[RawEvent::new("2024-03-01").with_all_day(true)]);
            assert!(doc.contains("\r\nDTSTART;VALUE=DATE:20240301\r\n"));
            assert!(doc.contains("\r\nDTEND;VALUE=DATE:20240302\r\n"));
        }

        #[test]
        fn timed_without_end() {
            let doc = encode(&[RawEvent::new("2024-03-01T15:30:00Z")]);
            assert!(doc.contains("\r\nDTSTART:20240301T153000Z\r\n"));
            assert!(doc.contains("\r\nDTEND:20240301T153000Z\r\n"));
        }

        #[test]
        fn dtstamp_comes_from_the_clock() {
            let doc = encode(&[RawEvent::new("2024-03-01")]);
            assert!(doc.contains("\r\nDTSTAMP:20240220T080000Z\r\n"));
        }
    }

    mod escaping {
        use super::*;

        #[test]
        fn summary_is_escaped() {
            let doc = encode(&[RawEvent::new("2024-03-01").with_title("Launch, Part 1; Final")]);
            assert!(doc.contains("\r\nSUMMARY:Launch\\, Part 1\\; Final\r\n"));
        }

        #[test]
        fn description_and_location_are_escaped() {
            let event = RawEvent::new("2024-03-01")
                .with_description("Line one\r\nLine two")
                .with_location("Hall A, Floor 2");
            let doc = encode(&[event]);
            assert!(doc.contains("\r\nDESCRIPTION:Line one\\nLine two\r\n"));
            assert!(doc.contains("\r\nLOCATION:Hall A\\, Floor 2\r\n"));
        }

        #[test]
        fn verbatim_fields_are_not_escaped() {
            let event = RawEvent::new("2024-03-01")
                .with_url("https://example.com/?a=1;b=2,3")
                .with_status("TENTATIVE")
                .with_categories(["Rock, Pop", "Live"]);
            let doc = encode(&[event]);
            assert!(doc.contains("\r\nURL:https://example.com/?a=1;b=2,3\r\n"));
            assert!(doc.contains("\r\nSTATUS:TENTATIVE\r\n"));
            assert!(doc.contains("\r\nCATEGORIES:Rock, Pop,Live\r\n"));
        }

        #[test]
        fn verbatim_fields_cannot_break_lines() {
            let event = RawEvent::new("2024-03-01")
                .with_url("https://example.com/\r\nX-INJECTED:1")
                .with_status("CONFIRMED\n");
            let doc = encode(&[event]);
            assert!(!doc.contains("\r\nX-INJECTED"));
            assert!(doc.contains("\r\nURL:https://example.com/X-INJECTED:1\r\n"));
            assert!(doc.contains("\r\nSTATUS:CONFIRMED\r\n"));
        }
    }

    mod records {
        use super::*;

        #[test]
        fn record_without_start_is_excluded() {
            let events = vec![
                RawEvent::default().with_title("No start"),
                RawEvent::new("2024-03-01").with_title("Kept"),
            ];
            let encoded = encoder()
                .encode_detailed(&events, &CalendarMeta::new("Cal"))
                .unwrap();
            assert_eq!(encoded.emitted, 1);
            assert_eq!(encoded.skipped.len(), 1);
            assert_eq!(encoded.content.matches("BEGIN:VEVENT").count(), 1);
            assert!(!encoded.content.contains("No start"));
        }

        #[test]
        fn only_bad_records_still_yield_a_document() {
            let events = vec![RawEvent::default(), RawEvent::new("not a date")];
            let doc = encode(&events);
            assert!(doc.starts_with("BEGIN:VCALENDAR\r\n"));
            assert!(doc.ends_with("END:VCALENDAR\r\n"));
            assert!(!doc.contains("BEGIN:VEVENT"));
        }

        #[test]
        fn missing_uids_are_distinct() {
            let events = vec![
                RawEvent::new("2024-03-01").with_title("A"),
                RawEvent::new("2024-03-01").with_title("A"),
            ];
            let doc = encode(&events);
            let uids: Vec<&str> = physical_lines(&doc)
                .into_iter()
                .filter(|l| l.starts_with("UID:"))
                .collect();
            assert_eq!(uids, vec!["UID:test-1", "UID:test-2"]);
        }

        #[test]
        fn mandatory_fields_are_never_empty() {
            let doc = encode(&[RawEvent::new("2024-03-01").with_title("")]);
            for prefix in ["UID:", "DTSTART:", "DTEND:", "SUMMARY:"] {
                let line = physical_lines(&doc)
                    .into_iter()
                    .find(|l| l.starts_with(prefix))
                    .unwrap();
                assert!(line.len() > prefix.len(), "{line}");
            }
            assert!(doc.contains("\r\nSUMMARY:Untitled Event\r\n"));
        }
    }

    mod folding {
        use super::*;

        #[test]
        fn no_physical_line_exceeds_75_octets() {
            let long = "Doors open at 7pm, show at 8pm; bring ID\\tickets. ".repeat(10);
            let events = vec![
                RawEvent::new("2024-03-01T19:00:00Z")
                    .with_title(long.clone())
                    .with_description(format!("{long}\n{long}"))
                    .with_location("Zürich, Théâtre de l'Étoile ".repeat(8))
                    .with_url(format!("https://example.com/{}", "x".repeat(200)))
                    .with_categories(vec!["category"; 30]),
            ];
            let meta = CalendarMeta::new("名前".repeat(40)).with_description(long);
            let doc = encoder().encode(&events, &meta).unwrap();

            for line in physical_lines(&doc) {
                assert!(line.len() <= MAX_LINE_OCTETS, "{} octets: {line:?}", line.len());
            }
        }

        #[test]
        fn folded_lines_unfold_to_the_logical_line() {
            let title = "T".repeat(150);
            let doc = encode(&[RawEvent::new("2024-03-01").with_title(title.clone())]);
            let unfolded = crate::fold::unfold_lines(&doc);
            assert!(unfolded.contains(&format!("\r\nSUMMARY:{title}\r\n")));
        }
    }

    mod metadata {
        use super::*;

        #[test]
        fn blank_name_is_a_caller_error() {
            let result = encoder().encode(&[RawEvent::new("2024-03-01")], &CalendarMeta::new("  "));
            assert_eq!(result, Err(IcsError::MissingCalendarName));
        }

        #[test]
        fn timezone_with_line_break_is_rejected() {
            let meta = CalendarMeta::new("Cal").with_timezone("UTC\r\nX-EVIL:1");
            assert!(matches!(
                encoder().encode(&[], &meta),
                Err(IcsError::InvalidMetadata { field: "timezone", .. })
            ));
        }

        #[test]
        fn empty_timezone_is_rejected() {
            let meta = CalendarMeta::new("Cal").with_timezone("");
            assert!(meta.validate().is_err());
        }

        #[test]
        fn meta_deserializes_with_default_timezone() {
            let meta: CalendarMeta = serde_json::from_str(r#"{"name": "Cal"}"#).unwrap();
            assert_eq!(meta, CalendarMeta::new("Cal"));
        }
    }

    mod convenience {
        use super::*;

        #[test]
        fn generate_ics_uses_defaults() {
            let doc = generate_ics(
                &[RawEvent::new("2024-03-01").with_title("Hello")],
                "Releases",
                Some("New releases"),
                None,
            )
            .unwrap();
            assert!(doc.contains("\r\nX-WR-TIMEZONE:UTC\r\n"));
            assert!(doc.contains("\r\nX-WR-CALDESC:New releases\r\n"));
            assert!(doc.contains("\r\nSUMMARY:Hello\r\n"));
            assert!(doc.contains("\r\nDTSTAMP:"));
        }

        #[test]
        fn encoder_is_shareable_across_threads() {
            let encoder = encoder();
            let events = vec![RawEvent::new("2024-03-01")];
            let meta = CalendarMeta::new("Cal");
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..4)
                    .map(|_| scope.spawn(|| encoder.encode(&events, &meta).unwrap()))
                    .collect();
                for handle in handles {
                    assert!(handle.join().unwrap().contains("BEGIN:VEVENT"));
                }
            });
        }
    }
}
