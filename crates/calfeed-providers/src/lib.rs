//! Event sources and integrations.
//!
//! This crate sits between whatever produces events and the encoder in
//! `calfeed-core`:
//!
//! - [`EventSource`] - The trait every producer of events implements
//! - [`SourceEvent`] - The record sources build
//! - [`JsonFileSource`] / [`StaticSource`] - Ready-made sources
//! - [`IntegrationRegistry`] - Named sources rendered as calendars
//! - [`ProviderError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │  JSON records   │    │  Custom source  │
//! └────────┬────────┘    └────────┬────────┘
//!          │      EventSource     │
//!          └──────────┬───────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │ SourceEvent │
//!              └──────┬──────┘
//!                     ▼ to_raw()
//!              ┌─────────────┐
//!              │  RawEvent   │
//!              └──────┬──────┘
//!                     ▼ IcsEncoder
//!              ┌─────────────┐
//!              │  VCALENDAR  │
//!              └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calfeed_providers::{FetchQuery, Integration, IntegrationRegistry, JsonFileSource};
//!
//! let mut registry = IntegrationRegistry::new();
//! registry.register(
//!     Integration::new("releases", "Game Releases"),
//!     Arc::new(JsonFileSource::new("releases", "/var/lib/calfeed/releases.json")),
//! )?;
//! let calendar = registry.render("releases", &FetchQuery::new(), &IcsEncoder::new()).await?;
//! ```

pub mod error;
pub mod integration;
pub mod json_file;
pub mod source;
pub mod source_event;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use integration::{Integration, IntegrationRegistry};
pub use json_file::{JsonFileSource, ParsedRecords, parse_records};
pub use source::{
    BoxFuture, CalendarInfo, ErrorSource, EventSource, FetchQuery, FetchResult, StaticSource,
};
pub use source_event::{SOURCE_EVENT_STATUS, SourceEvent};
