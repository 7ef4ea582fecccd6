//! CLI error types.

use std::fmt;

use calfeed_core::IcsError;
use calfeed_providers::ProviderError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Input records could not be read.
    Input(String),
    /// Event source error.
    Provider(ProviderError),
    /// The calendar could not be encoded.
    Encode(IcsError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Input(msg) => write!(f, "invalid input: {}", msg),
            Self::Provider(err) => write!(f, "source error: {}", err),
            Self::Encode(err) => write!(f, "encoding failed: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<IcsError> for CliError {
    fn from(err: IcsError) -> Self {
        Self::Encode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_prefixes_kind() {
        let err = CliError::Config("unknown log level \"loud\"".to_string());
        assert_eq!(err.to_string(), "configuration error: unknown log level \"loud\"");

        let err = CliError::from(IcsError::MissingCalendarName);
        assert_eq!(err.to_string(), "encoding failed: calendar name is required");
    }

    #[test]
    fn wraps_sources() {
        let err = CliError::from(ProviderError::not_found("unknown integration 'x'"));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("source error: "));

        let err = CliError::Input("bad".to_string());
        assert!(err.source().is_none());
    }
}
