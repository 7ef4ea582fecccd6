//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calfeed/config.toml` by default:
//!
//! ```toml
//! [calendar]
//! name = "Events"
//! timezone = "UTC"
//!
//! [logging]
//! level = "info"
//! format = "compact"
//!
//! [[sources]]
//! id = "game_releases"
//! name = "Game Releases"
//! path = "/var/lib/calfeed/releases.json"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use calfeed_core::{CalendarMeta, TracingConfig, TracingOutputFormat};
use calfeed_providers::{
    ErrorSource, EventSource, Integration, IntegrationRegistry, JsonFileSource, ProviderError,
};
use serde::{Deserialize, Serialize};
use tracing::{Level, warn};

use crate::error::{CliError, CliResult};

/// Configuration for the calfeed CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Defaults for generated calendars.
    pub calendar: CalendarSettings,

    /// Log output settings.
    pub logging: LoggingSettings,

    /// Named event sources.
    pub sources: Vec<SourceSettings>,
}

/// Defaults for generated calendars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Calendar name when `--name` is not given.
    pub name: String,

    /// Calendar description when `--description` is not given.
    pub description: Option<String>,

    /// Timezone label when `--timezone` is not given.
    pub timezone: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            name: "Events".to_string(),
            description: None,
            timezone: calfeed_core::ics::DEFAULT_TIMEZONE.to_string(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for calfeed's own targets (`trace` to `error`).
    pub level: String,

    /// Output format.
    pub format: TracingOutputFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: TracingOutputFormat::Compact,
        }
    }
}

/// A named JSON record file served as an integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Integration id.
    pub id: String,

    /// Display name, also the calendar name.
    pub name: String,

    /// What the source provides.
    #[serde(default)]
    pub description: String,

    /// Upstream service the records come from.
    #[serde(default)]
    pub base_url: String,

    /// Whether the source offers several calendars.
    #[serde(default)]
    pub multi_calendar: bool,

    /// JSON file holding the records.
    pub path: PathBuf,
}

impl SourceSettings {
    /// Returns the integration metadata for this source.
    pub fn integration(&self) -> Integration {
        Integration::new(&self.id, &self.name)
            .with_description(&self.description)
            .with_base_url(&self.base_url)
            .with_multi_calendar(self.multi_calendar)
    }
}

impl CliConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calfeed")
    }

    /// Checks the configuration for values that would fail later.
    pub fn validate(&self) -> CliResult<()> {
        self.calendar_meta()
            .validate()
            .map_err(|e| CliError::Config(format!("[calendar]: {}", e)))?;
        self.log_level()?;

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(CliError::Config("source id must not be empty".to_string()));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(CliError::Config(format!(
                    "source '{}' is defined more than once",
                    source.id
                )));
            }
            if source.name.trim().is_empty() {
                return Err(CliError::Config(format!(
                    "source '{}' needs a name",
                    source.id
                )));
            }
        }

        Ok(())
    }

    /// Returns the calendar metadata built from `[calendar]`.
    pub fn calendar_meta(&self) -> CalendarMeta {
        let mut meta =
            CalendarMeta::new(self.calendar.name.as_str()).with_timezone(self.calendar.timezone.as_str());
        meta.description = self.calendar.description.clone();
        meta
    }

    /// Parses the configured log level.
    pub fn log_level(&self) -> CliResult<Level> {
        Level::from_str(self.logging.level.trim())
            .map_err(|_| CliError::Config(format!("unknown log level {:?}", self.logging.level)))
    }

    /// Returns the tracing setup for the CLI, forcing `debug` if asked.
    pub fn tracing_config(&self, debug: bool) -> CliResult<TracingConfig> {
        let level = if debug { Level::DEBUG } else { self.log_level()? };
        Ok(TracingConfig::cli()
            .with_level(level)
            .with_format(self.logging.format))
    }

    /// Builds the integration registry from `[[sources]]`.
    ///
    /// A source without a path is still listed but fails every fetch.
    pub fn registry(&self) -> CliResult<IntegrationRegistry> {
        let mut registry = IntegrationRegistry::new();
        for source in &self.sources {
            let events: Arc<dyn EventSource> = if source.path.as_os_str().is_empty() {
                warn!(source = %source.id, "source has no path configured");
                Arc::new(ErrorSource::new(
                    &source.id,
                    ProviderError::configuration("no path configured"),
                ))
            } else {
                Arc::new(JsonFileSource::new(&source.id, &source.path))
            };
            registry.register(source.integration(), events)?;
        }
        Ok(registry)
    }
}
