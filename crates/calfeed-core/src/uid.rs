//! Unique identifier generation for events that arrive without a uid.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces identifiers for events whose source did not supply one.
///
/// Every call must return a value distinct from all earlier calls on the
/// same generator.
pub trait UidGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn next_uid(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUid;

impl UidGenerator for RandomUid {
    fn next_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` identifiers, counting from 1.
#[derive(Debug)]
pub struct SequentialUid {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialUid {
    /// Creates a generator with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialUid {
    fn default() -> Self {
        Self::new("event")
    }
}

impl UidGenerator for SequentialUid {
    fn next_uid(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

impl<U: UidGenerator + ?Sized> UidGenerator for &U {
    fn next_uid(&self) -> String {
        (**self).next_uid()
    }
}
