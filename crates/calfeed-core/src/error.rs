//! Errors that fail a whole encode.
//!
//! Problems with individual records never surface here; they are reported
//! as [`NormalizeError`](crate::normalize::NormalizeError) and skipped.

use thiserror::Error;

/// Invalid calendar-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IcsError {
    /// The calendar name is empty or blank.
    #[error("calendar name is required")]
    MissingCalendarName,

    /// A metadata field cannot be written as a content line.
    #[error("invalid calendar {field}: {reason}")]
    InvalidMetadata {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type alias for encoding.
pub type IcsResult<T> = Result<T, IcsError>;
