//! Integrations: named, described event sources rendered as calendars.
//!
//! An [`Integration`] carries the metadata a feed listing shows; the
//! [`IntegrationRegistry`] pairs each one with its [`EventSource`] and turns
//! fetches into iCalendar documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use calfeed_core::{CalendarMeta, Clock, EncodedCalendar, IcsEncoder, RawEvent, UidGenerator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::source::{CalendarInfo, EventSource, FetchQuery, FetchResult};

/// Metadata describing an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    /// Stable identifier (e.g. `sportsdb`).
    pub id: String,
    /// Display name, used as the calendar name.
    pub name: String,
    /// What the integration provides.
    #[serde(default)]
    pub description: String,
    /// Upstream service the events come from.
    #[serde(default)]
    pub base_url: String,
    /// Whether the integration offers more than one calendar.
    #[serde(default)]
    pub multi_calendar: bool,
}

impl Integration {
    /// Creates integration metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            base_url: String::new(),
            multi_calendar: false,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the upstream base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder method to declare multiple calendars.
    pub fn with_multi_calendar(mut self, multi_calendar: bool) -> Self {
        self.multi_calendar = multi_calendar;
        self
    }

    /// Returns the route this integration is served under: `/` followed by
    /// the id with underscores turned into dashes.
    pub fn route_prefix(&self) -> String {
        format!("/{}", self.id.replace('_', "-"))
    }
}

struct Registered {
    integration: Integration,
    source: Arc<dyn EventSource>,
}

/// Maps integration ids to their sources.
#[derive(Default)]
pub struct IntegrationRegistry {
    entries: BTreeMap<String, Registered>,
}

impl IntegrationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `integration.id`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the id is empty or already taken.
    pub fn register(
        &mut self,
        integration: Integration,
        source: Arc<dyn EventSource>,
    ) -> ProviderResult<()> {
        if integration.id.trim().is_empty() {
            return Err(ProviderError::configuration("integration id must not be empty"));
        }
        if self.entries.contains_key(&integration.id) {
            return Err(ProviderError::configuration(format!(
                "integration '{}' is registered twice",
                integration.id
            )));
        }
        self.entries.insert(
            integration.id.clone(),
            Registered {
                integration,
                source,
            },
        );
        Ok(())
    }

    /// Returns the metadata of a registered integration.
    pub fn get(&self, id: &str) -> Option<&Integration> {
        self.entries.get(id).map(|entry| &entry.integration)
    }

    /// Iterates over registered integrations in id order.
    pub fn integrations(&self) -> impl Iterator<Item = &Integration> {
        self.entries.values().map(|entry| &entry.integration)
    }

    /// Returns the number of registered integrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: &str) -> ProviderResult<&Registered> {
        self.entries
            .get(id)
            .ok_or_else(|| ProviderError::not_found(format!("unknown integration '{id}'")))
    }

    /// Fetches events from an integration's source.
    ///
    /// # Errors
    ///
    /// Returns a not found error for an unknown id, or whatever the source
    /// reports.
    pub async fn fetch(&self, id: &str, query: &FetchQuery) -> ProviderResult<FetchResult> {
        let entry = self.entry(id)?;
        entry.source.fetch_events(query).await
    }

    /// Lists the calendars of a multi-calendar integration.
    ///
    /// # Errors
    ///
    /// Returns an unsupported error if the integration does not declare
    /// multiple calendars.
    pub async fn list_calendars(&self, id: &str) -> ProviderResult<Vec<CalendarInfo>> {
        let entry = self.entry(id)?;
        if !entry.integration.multi_calendar {
            return Err(ProviderError::unsupported(
                "this integration does not support multiple calendars",
            )
            .with_provider(id));
        }
        entry.source.list_calendars().await
    }

    /// Fetches an integration's events and encodes them as a calendar named
    /// after the integration.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or an encoding error if the integration
    /// name cannot be used as a calendar name.
    pub async fn render<C: Clock, U: UidGenerator>(
        &self,
        id: &str,
        query: &FetchQuery,
        encoder: &IcsEncoder<C, U>,
    ) -> ProviderResult<EncodedCalendar> {
        let entry = self.entry(id)?;
        let fetched = entry.source.fetch_events(query).await?;
        let raw: Vec<RawEvent> = fetched.events.iter().map(|event| event.to_raw()).collect();

        let meta = CalendarMeta::new(entry.integration.name.as_str());
        let encoded = encoder
            .encode_detailed(&raw, &meta)
            .map_err(|e| ProviderError::from(e).with_provider(id))?;

        if !encoded.skipped.is_empty() {
            warn!(
                integration = id,
                skipped = encoded.skipped.len(),
                "events left out of calendar"
            );
        }
        info!(
            integration = id,
            fetched = fetched.events.len(),
            dropped_records = fetched.skipped,
            emitted = encoded.emitted,
            "rendered integration"
        );

        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::source::{ErrorSource, StaticSource};
    use crate::source_event::SourceEvent;
    use calfeed_core::{FixedClock, SequentialUid};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn encoder() -> IcsEncoder<FixedClock, SequentialUid> {
        IcsEncoder::with_parts(
            FixedClock(Utc.with_ymd_and_hms(2024, 2, 20, 8, 0, 0).unwrap()),
            SequentialUid::new("reg"),
        )
    }

    fn match_event() -> SourceEvent {
        SourceEvent::new(
            "match-1",
            "Arsenal vs Chelsea",
            Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 17, 0, 0).unwrap(),
        )
        .with_location("Emirates Stadium")
    }

    fn registry() -> IntegrationRegistry {
        let mut registry = IntegrationRegistry::new();
        registry
            .register(
                Integration::new("sportsdb", "SportsDB")
                    .with_description("Sports fixtures")
                    .with_base_url("https://www.thesportsdb.com")
                    .with_multi_calendar(true),
                Arc::new(
                    StaticSource::new("sportsdb", vec![match_event()])
                        .with_calendars(vec![CalendarInfo::new("4328", "EPL")]),
                ),
            )
            .unwrap();
        registry
            .register(
                Integration::new("game_releases", "Game Releases"),
                Arc::new(StaticSource::new(
                    "game_releases",
                    vec![
                        SourceEvent::new(
                            "",
                            "",
                            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                        )
                        .with_all_day(true),
                    ],
                )),
            )
            .unwrap();
        registry
            .register(
                Integration::new("broken", "Broken"),
                Arc::new(ErrorSource::new("broken", ProviderError::io("events file is locked"))),
            )
            .unwrap();
        registry
    }

    mod metadata {
        use super::*;

        #[test]
        fn route_prefix_uses_dashes() {
            assert_eq!(Integration::new("game_releases", "x").route_prefix(), "/game-releases");
            assert_eq!(Integration::new("wwe", "x").route_prefix(), "/wwe");
        }

        #[test]
        fn deserializes_with_defaults() {
            let integration: Integration =
                serde_json::from_str(r#"{"id": "imdb", "name": "IMDb"}"#).unwrap();
            assert_eq!(integration, Integration::new("imdb", "IMDb"));
        }
    }

    mod registration {
        use super::*;

        #[test]
        fn lists_in_id_order() {
            let registry = registry();
            let ids: Vec<&str> = registry.integrations().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, vec!["broken", "game_releases", "sportsdb"]);
            assert_eq!(registry.len(), 3);
            assert_eq!(registry.get("sportsdb").unwrap().name, "SportsDB");
        }

        #[test]
        fn rejects_duplicates_and_empty_ids() {
            let mut registry = registry();
            let source: Arc<dyn EventSource> = Arc::new(StaticSource::new("x", vec![]));

            let err = registry
                .register(Integration::new("sportsdb", "Again"), source.clone())
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);

            assert!(registry.register(Integration::new(" ", "Blank"), source).is_err());
        }
    }

    mod rendering {
        use super::*;

        #[tokio::test]
        async fn renders_confirmed_events_named_after_integration() {
            let encoded = registry()
                .render("sportsdb", &FetchQuery::new(), &encoder())
                .await
                .unwrap();

            assert_eq!(encoded.emitted, 1);
            assert!(encoded.content.contains("\r\nX-WR-CALNAME:SportsDB\r\n"));
            assert!(encoded.content.contains("\r\nSTATUS:CONFIRMED\r\n"));
            assert!(encoded.content.contains("\r\nUID:match-1\r\n"));
            assert!(encoded.content.contains("\r\nDTSTART:20240302T150000Z\r\n"));
            assert!(encoded.content.contains("\r\nLOCATION:Emirates Stadium\r\n"));
        }

        #[tokio::test]
        async fn fills_defaults_for_bare_events() {
            let encoded = registry()
                .render("game_releases", &FetchQuery::new(), &encoder())
                .await
                .unwrap();

            assert!(encoded.content.contains("\r\nUID:reg-1\r\n"));
            assert!(encoded.content.contains("\r\nSUMMARY:Untitled Event\r\n"));
            assert!(encoded.content.contains("\r\nDTSTART;VALUE=DATE:20240301\r\n"));
        }

        #[tokio::test]
        async fn unknown_integration_is_not_found() {
            let err = registry()
                .render("nope", &FetchQuery::new(), &encoder())
                .await
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::NotFound);
        }

        #[tokio::test]
        async fn source_failures_propagate() {
            let err = registry()
                .render("broken", &FetchQuery::new(), &encoder())
                .await
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::IoError);
            assert_eq!(err.provider(), Some("broken"));
        }

        #[tokio::test]
        async fn blank_integration_name_is_an_encoding_error() {
            let mut registry = IntegrationRegistry::new();
            registry
                .register(Integration::new("blank", "  "), Arc::new(StaticSource::new("blank", vec![])))
                .unwrap();

            let err = registry
                .render("blank", &FetchQuery::new(), &encoder())
                .await
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::EncodingError);
        }
    }

    mod calendars {
        use super::*;

        #[tokio::test]
        async fn multi_calendar_integrations_list_calendars() {
            let calendars = registry().list_calendars("sportsdb").await.unwrap();
            assert_eq!(calendars, vec![CalendarInfo::new("4328", "EPL")]);
        }

        #[tokio::test]
        async fn single_calendar_integrations_refuse() {
            let err = registry().list_calendars("game_releases").await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Unsupported);
        }
    }
}
