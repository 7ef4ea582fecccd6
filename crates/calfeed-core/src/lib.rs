//! Core types for calfeed: event records, time handling and the iCalendar
//! (RFC 5545) serializer.
//!
//! The encoding pipeline runs [`RawEvent`]s through the normalizer into
//! [`CalendarEvent`]s, then [`IcsEncoder`] writes them as escaped, folded,
//! CRLF-terminated content lines.

pub mod clock;
pub mod error;
pub mod escape;
pub mod event;
pub mod fold;
pub mod ics;
pub mod normalize;
pub mod slug;
pub mod time;
pub mod tracing;
pub mod uid;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{IcsError, IcsResult};
pub use escape::{escape_text, strip_line_breaks, unescape_text};
pub use event::{CalendarEvent, DEFAULT_TITLE, EventSpan, RawEvent};
pub use fold::{MAX_LINE_OCTETS, fold_line, unfold_lines};
pub use ics::{CalendarMeta, EncodedCalendar, IcsEncoder, generate_ics};
pub use normalize::{NormalizeError, SkippedEvent, normalize_event, normalize_events};
pub use slug::{DEFAULT_SLUG_LENGTH, make_slug};
pub use time::{EventTime, FormatError, TimeValue, format_time_value, parse_time_text};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use uid::{RandomUid, SequentialUid, UidGenerator};
