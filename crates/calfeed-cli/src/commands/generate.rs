//! `calfeed generate`: JSON records in, iCalendar out.

use std::path::{Path, PathBuf};

use calfeed_core::{CalendarMeta, DEFAULT_SLUG_LENGTH, IcsEncoder, RawEvent, make_slug};
use calfeed_providers::parse_records;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::cli::GenerateArgs;
use crate::commands::write_output;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// File stem used when the calendar name has no sluggable characters.
const FALLBACK_FILE_STEM: &str = "calendar";

/// Runs the generate command.
pub async fn generate(args: &GenerateArgs, config: &CliConfig) -> CliResult<()> {
    let events = read_inputs(&args.inputs).await?;
    let meta = resolve_meta(args, config);

    let encoded = IcsEncoder::new().encode_detailed(&events, &meta)?;
    if !encoded.skipped.is_empty() {
        warn!(
            skipped = encoded.skipped.len(),
            "some records were left out of the calendar"
        );
    }

    let target = output_target(args, &meta);
    write_output(target.as_deref(), &encoded.content).await?;

    if let Some(path) = target {
        info!(path = %path.display(), events = encoded.emitted, "wrote calendar");
        println!(
            "wrote {} event(s) to {}",
            encoded.emitted,
            path.display()
        );
    }

    Ok(())
}

/// Reads and concatenates the records of every input.
pub async fn read_inputs(inputs: &[PathBuf]) -> CliResult<Vec<RawEvent>> {
    if inputs.is_empty() {
        return read_input(Path::new("-")).await;
    }

    let mut events = Vec::new();
    for input in inputs {
        events.extend(read_input(input).await?);
    }
    Ok(events)
}

async fn read_input(input: &Path) -> CliResult<Vec<RawEvent>> {
    let (label, text) = if input == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        ("<stdin>".to_string(), text)
    } else {
        let text = tokio::fs::read_to_string(input).await.map_err(|e| {
            CliError::Input(format!("failed to read {}: {}", input.display(), e))
        })?;
        (input.display().to_string(), text)
    };

    let parsed = parse_records::<RawEvent>(&text)
        .map_err(|e| CliError::Input(format!("{}: {}", label, e.message())))?;
    if !parsed.skipped.is_empty() {
        warn!(
            input = %label,
            entries = ?parsed.skipped,
            "ignored malformed records"
        );
    }
    Ok(parsed.records)
}

/// Combines command-line flags with `[calendar]` defaults.
pub fn resolve_meta(args: &GenerateArgs, config: &CliConfig) -> CalendarMeta {
    let mut meta = config.calendar_meta();
    if let Some(ref name) = args.name {
        meta.name = name.clone();
    }
    if let Some(ref description) = args.description {
        meta.description = Some(description.clone());
    }
    if let Some(ref timezone) = args.timezone {
        meta.timezone = timezone.clone();
    }
    meta
}

/// Returns where the calendar goes; `None` means stdout.
pub fn output_target(args: &GenerateArgs, meta: &CalendarMeta) -> Option<PathBuf> {
    if let Some(ref output) = args.output {
        return Some(output.clone());
    }
    args.out_dir
        .as_ref()
        .map(|dir| dir.join(format!("{}.ics", file_stem(&meta.name))))
}

fn file_stem(name: &str) -> String {
    let slug = make_slug(name, DEFAULT_SLUG_LENGTH);
    if slug.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        slug
    }
}
