//! EventSource trait definition.
//!
//! This module defines [`EventSource`], the abstraction over anything that
//! can produce calendar events: scrapers, API clients, local record files.
//! Sources only fetch; encoding happens in the integration layer.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::{ProviderError, ProviderResult};
use crate::source_event::SourceEvent;

/// Information about a calendar offered by a multi-calendar source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    /// Identifier to pass back in a [`FetchQuery`].
    pub id: String,
    /// Human-readable name of the calendar.
    pub name: String,
    /// Description of the calendar, if available.
    pub description: Option<String>,
}

impl CalendarInfo {
    /// Creates a new CalendarInfo with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result from fetching events.
#[derive(Debug, Default)]
pub struct FetchResult {
    /// The fetched events, in source order.
    pub events: Vec<SourceEvent>,
    /// Number of source records that could not be read as events.
    pub skipped: usize,
}

impl FetchResult {
    /// Creates a new fetch result with events.
    pub fn with_events(events: Vec<SourceEvent>) -> Self {
        Self { events, skipped: 0 }
    }

    /// Builder method to record dropped records.
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Free-form parameters for a fetch (mode, ids, date ranges...).
///
/// Which keys matter is up to the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    params: BTreeMap<String, String>,
}

impl FetchQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parses a `key=value` pair and adds it.
    ///
    /// # Errors
    ///
    /// Returns a bad request error if there is no `=` or the key is empty.
    pub fn with_pair(self, pair: &str) -> ProviderResult<Self> {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok(self.with_param(key.trim(), value.trim()))
            }
            _ => Err(ProviderError::bad_request(format!(
                "expected key=value, got {pair:?}"
            ))),
        }
    }

    /// Returns a parameter, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a parameter or a bad request error naming it.
    ///
    /// # Errors
    ///
    /// Returns a bad request error if the parameter is missing.
    pub fn require(&self, key: &str) -> ProviderResult<&str> {
        self.get(key)
            .ok_or_else(|| ProviderError::bad_request(format!("missing parameter '{key}'")))
    }

    /// Iterates over all parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A boxed future for async trait methods.
///
/// Using boxed futures keeps the trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A producer of calendar events.
///
/// # Example Implementation
///
/// ```ignore
/// struct ReleasesSource {
///     client: reqwest::Client,
/// }
///
/// impl EventSource for ReleasesSource {
///     fn id(&self) -> &str { "releases" }
///
///     fn fetch_events<'a>(&'a self, query: &'a FetchQuery) -> BoxFuture<'a, ProviderResult<FetchResult>> {
///         Box::pin(async move {
///             let platform = query.get("platform").unwrap_or("pc");
///             // Fetch and map upstream records
///             Ok(FetchResult::with_events(events))
///         })
///     }
/// }
/// ```
pub trait EventSource: Send + Sync {
    /// Returns the identifier of this source.
    fn id(&self) -> &str;

    /// Fetches events matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the source cannot be read at all.
    /// Individual unreadable records are counted in [`FetchResult::skipped`]
    /// instead.
    fn fetch_events<'a>(&'a self, query: &'a FetchQuery)
    -> BoxFuture<'a, ProviderResult<FetchResult>>;

    /// Lists the calendars this source can produce.
    ///
    /// The default implementation reports unsupported operation.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        let error = ProviderError::unsupported("calendar listing is not supported by this source")
            .with_provider(self.id());
        Box::pin(async move { Err(error) })
    }
}

/// A source backed by an in-memory list of events.
#[derive(Debug, Clone)]
pub struct StaticSource {
    id: String,
    events: Vec<SourceEvent>,
    calendars: Vec<CalendarInfo>,
}

impl StaticSource {
    /// Creates a new static source.
    pub fn new(id: impl Into<String>, events: Vec<SourceEvent>) -> Self {
        Self {
            id: id.into(),
            events,
            calendars: Vec::new(),
        }
    }

    /// Builder method to advertise calendars.
    pub fn with_calendars(mut self, calendars: Vec<CalendarInfo>) -> Self {
        self.calendars = calendars;
        self
    }
}

impl EventSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch_events<'a>(
        &'a self,
        _query: &'a FetchQuery,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
        Box::pin(async move { Ok(FetchResult::with_events(self.events.clone())) })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move { Ok(self.calendars.clone()) })
    }
}

/// A source that always returns an error.
///
/// This is useful for testing or as a placeholder when a source
/// fails to initialize.
#[derive(Debug)]
pub struct ErrorSource {
    id: String,
    error: ProviderError,
}

impl ErrorSource {
    /// Creates a new error source.
    pub fn new(id: impl Into<String>, error: ProviderError) -> Self {
        Self {
            id: id.into(),
            error,
        }
    }

    fn error(&self) -> ProviderError {
        // ProviderError is not Clone; rebuild it from its parts
        ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.id)
    }
}

impl EventSource for ErrorSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch_events<'a>(
        &'a self,
        _query: &'a FetchQuery,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}
