//! Error taxonomy for the `Db` façade.

use thiserror::Error;

/// Failure modes surfaced by [`crate::Db`]'s public operations.
///
/// `KeyNotFound` and `KeyDeleted` are kept distinct (rather than the
/// teacher's convention of propagating a blanket `anyhow::Error`) because
/// callers need to match on "absent" versus "explicitly deleted" without
/// string-matching an error message.
#[derive(Debug, Error)]
pub enum DbError {
    /// The key is not present anywhere visible (memtable or any segment).
    #[error("key not found")]
    KeyNotFound,
    /// The key's newest visible record is a tombstone.
    #[error("key was deleted")]
    KeyDeleted,
    /// A caller passed an empty key; keys must be non-empty byte strings.
    #[error("key must not be empty")]
    EmptyKey,
    /// Underlying filesystem failure during flush, merge, cold-start scan,
    /// or segment read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A segment-construction ordering invariant was violated.
    #[error("segment invariant violated: {0}")]
    InvariantViolated(String),
}

/// Converts the `anyhow::Error` surfaced by `sstable` into a `DbError`,
/// preserving the underlying `io::Error` when present and otherwise
/// collapsing the chain into `InvariantViolated` (e.g. a corrupt entry tag
/// or an out-of-order `add_entry` call caught defensively by `sstable`).
impl From<anyhow::Error> for DbError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<std::io::Error>() {
            Ok(io_err) => DbError::Io(io_err),
            Err(e) => DbError::InvariantViolated(e.to_string()),
        }
    }
}
