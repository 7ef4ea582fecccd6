//! `calfeed sources`: list configured sources.

use calfeed_providers::Integration;

use crate::config::CliConfig;
use crate::error::CliResult;

/// Runs the sources command.
pub fn sources(config: &CliConfig) -> CliResult<()> {
    let registry = config.registry()?;
    if registry.is_empty() {
        println!(
            "No sources configured. Add [[sources]] entries to {}",
            CliConfig::default_path().display()
        );
        return Ok(());
    }

    for integration in registry.integrations() {
        println!("{}", describe(integration));
    }
    Ok(())
}

/// One listing entry: id, route and name, then the description if any.
pub fn describe(integration: &Integration) -> String {
    let mut line = format!(
        "{:<20} {:<22} {}",
        integration.id,
        integration.route_prefix(),
        integration.name
    );
    if integration.multi_calendar {
        line.push_str(" [multi-calendar]");
    }
    if !integration.description.is_empty() {
        line.push_str("\n    ");
        line.push_str(&integration.description);
    }
    line
}
