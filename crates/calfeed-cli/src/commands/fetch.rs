//! `calfeed fetch`: render a configured source.

use calfeed_core::IcsEncoder;
use calfeed_providers::FetchQuery;
use tracing::debug;

use crate::cli::FetchArgs;
use crate::commands::write_output;
use crate::config::CliConfig;
use crate::error::CliResult;

/// Runs the fetch command.
pub async fn fetch(args: &FetchArgs, config: &CliConfig) -> CliResult<()> {
    let registry = config.registry()?;
    let query = build_query(&args.params)?;
    debug!(source = %args.id, ?query, "fetching");

    let content = if args.json {
        let result = registry.fetch(&args.id, &query).await?;
        let mut json = serde_json::to_string_pretty(&result.events).map_err(std::io::Error::from)?;
        json.push('\n');
        json
    } else {
        registry
            .render(&args.id, &query, &IcsEncoder::new())
            .await?
            .content
    };

    write_output(args.output.as_deref(), &content).await
}

/// Builds a query from `key=value` arguments.
pub fn build_query(params: &[String]) -> CliResult<FetchQuery> {
    let mut query = FetchQuery::new();
    for pair in params {
        query = query.with_pair(pair)?;
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSettings;
    use crate::error::CliError;
    use std::path::Path;

    fn config_with_source(dir: &Path) -> CliConfig {
        let path = dir.join("releases.json");
        std::fs::write(
            &path,
            r#"{"events": [
                {"uid": "r-1", "title": "Release", "start": "2024-03-01", "end": "2024-03-02", "all_day": true},
                {"uid": "r-2", "title": "Broken", "start": "soon", "end": "later"}
            ]}"#,
        )
        .unwrap();

        CliConfig {
            sources: vec![SourceSettings {
                id: "game_releases".to_string(),
                name: "Game Releases".to_string(),
                description: String::new(),
                base_url: String::new(),
                multi_calendar: false,
                path,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn build_query_parses_pairs() {
        let query = build_query(&["mode=upcoming".to_string(), "id=42".to_string()]).unwrap();
        assert_eq!(query.get("mode"), Some("upcoming"));
        assert_eq!(query.get("id"), Some("42"));
        assert!(build_query(&["novalue".to_string()]).is_err());
    }

    #[tokio::test]
    async fn renders_source_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_source(dir.path());
        let output = dir.path().join("feed.ics");
        let args = FetchArgs {
            id: "game_releases".to_string(),
            output: Some(output.clone()),
            ..Default::default()
        };

        fetch(&args, &config).await.unwrap();

        let content = std::fs::read_to_string(output).unwrap();
        assert!(content.contains("\r\nX-WR-CALNAME:Game Releases\r\n"));
        assert!(content.contains("\r\nUID:r-1\r\n"));
        assert!(content.contains("\r\nSTATUS:CONFIRMED\r\n"));
        assert!(!content.contains("Broken"));
    }

    #[tokio::test]
    async fn json_output_lists_events() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_source(dir.path());
        let output = dir.path().join("events.json");
        let args = FetchArgs {
            id: "game_releases".to_string(),
            json: true,
            output: Some(output.clone()),
            ..Default::default()
        };

        fetch(&args, &config).await.unwrap();

        let events: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(events.as_array().unwrap().len(), 1);
        assert_eq!(events[0]["start"], "2024-03-01");
    }

    #[tokio::test]
    async fn unknown_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_source(dir.path());
        let args = FetchArgs {
            id: "nope".to_string(),
            ..Default::default()
        };

        let err = fetch(&args, &config).await.unwrap_err();
        assert!(matches!(err, CliError::Provider(_)));
    }
}
