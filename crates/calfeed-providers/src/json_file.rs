//! Event records stored as JSON.
//!
//! Two layouts are accepted: a top-level array of records, or an object with
//! an `events` array. Records that do not deserialize are counted and
//! skipped so one bad entry never hides the rest of the file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::source::{BoxFuture, EventSource, FetchQuery, FetchResult};
use crate::source_event::SourceEvent;

/// Records parsed from a JSON document.
#[derive(Debug)]
pub struct ParsedRecords<T> {
    /// Records that deserialized, in document order.
    pub records: Vec<T>,
    /// Indexes of entries that did not.
    pub skipped: Vec<usize>,
}

/// Parses a JSON document holding a list of records.
///
/// # Errors
///
/// Returns an invalid response error if the text is not JSON or has neither
/// accepted layout.
pub fn parse_records<T: DeserializeOwned>(text: &str) -> ProviderResult<ParsedRecords<T>> {
    let document: Value = serde_json::from_str(text).map_err(|e| {
        ProviderError::invalid_response(format!("not a JSON document: {e}")).with_source(e)
    })?;

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("events") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(ProviderError::invalid_response(
                    "expected an \"events\" array in the top-level object",
                ));
            }
        },
        _ => {
            return Err(ProviderError::invalid_response(
                "expected an array of events or an object with an \"events\" array",
            ));
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<T>(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed record");
                skipped.push(index);
            }
        }
    }

    Ok(ParsedRecords { records, skipped })
}

/// A source reading [`SourceEvent`] records from a JSON file.
///
/// The file is read on every fetch, so external tools can rewrite it
/// between fetches.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    id: String,
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading from `path`.
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Returns the file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> ProviderResult<FetchResult> {
        debug!(source = %self.id, path = %self.path.display(), "reading events");

        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ProviderError::io(format!("failed to read {}: {e}", self.path.display()))
                .with_source(e)
                .with_provider(&self.id)
        })?;

        let parsed = parse_records::<SourceEvent>(&text).map_err(|e| e.with_provider(&self.id))?;
        if !parsed.skipped.is_empty() {
            warn!(
                source = %self.id,
                skipped = parsed.skipped.len(),
                "dropped malformed records"
            );
        }

        Ok(FetchResult::with_events(parsed.records).with_skipped(parsed.skipped.len()))
    }
}

impl EventSource for JsonFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch_events<'a>(
        &'a self,
        _query: &'a FetchQuery,
    ) -> BoxFuture<'a, ProviderResult<FetchResult>> {
        Box::pin(self.read())
    }
}
