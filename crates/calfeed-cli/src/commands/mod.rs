//! Subcommand implementations.

pub mod config;
pub mod fetch;
pub mod generate;
pub mod sources;

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::CliResult;

/// Writes command output to `target`, or to stdout when there is none.
///
/// Parent directories of `target` are created as needed.
pub async fn write_output(target: Option<&Path>, content: &str) -> CliResult<()> {
    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(content.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
