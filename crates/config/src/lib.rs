//! # Config
//!
//! Tunable parameters for the RiptideKV storage engine.
//!
//! [`DbConfig`] is the single entry point for configuring a [`db::Db`]
//! instance: memtable capacity, segment size, sparse-index sampling period,
//! compaction trigger, persistence mode, and the directory segments live in.
//!
//! ## Example
//!
//! ```rust
//! use config::DbConfig;
//!
//! let cfg = DbConfig::default()
//!     .with_max_inmemory_size(2)
//!     .with_segment_size(2)
//!     .with_merge_threshold(2);
//! assert_eq!(cfg.max_inmemory_size, 2);
//! ```

use std::path::PathBuf;

/// Default memtable capacity (distinct keys) before a flush is triggered.
pub const DEFAULT_MAX_INMEMORY_SIZE: usize = 1000;
/// Default number of entries per segment produced by flush or compaction.
pub const DEFAULT_SEGMENT_SIZE: usize = 1000;
/// Default sparse-index sampling period.
pub const DEFAULT_SPARSE_OFFSET: usize = 100;
/// Default segment count that triggers compaction.
pub const DEFAULT_MERGE_THRESHOLD: usize = 10;
/// Default directory used for persisted segments.
pub const DEFAULT_PATH: &str = "sst_data";

/// Tunable parameters for a [`db::Db`] instance.
///
/// All fields are public so callers can construct a `DbConfig` directly or
/// via the `with_*` builder methods, which mirror the teacher's preference
/// for small, explicit constructors while collapsing the engine's four
/// positional arguments into a single configuration object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Memtable capacity trigger: maximum distinct keys held in memory
    /// before a flush is forced.
    pub max_inmemory_size: usize,
    /// Maximum number of entries per segment file produced by flush or
    /// compaction.
    pub segment_size: usize,
    /// Sampling period for each segment's sparse index: every `sparse_offset`
    /// entries (and always the last entry) is recorded.
    pub sparse_offset: usize,
    /// Number of segments that triggers compaction.
    pub merge_threshold: usize,
    /// If `false`, segments are ephemeral (written to a temp directory and
    /// removed when the `Db` is dropped). If `true`, segments live under
    /// `path` and survive process restarts.
    pub persist_segments: bool,
    /// Directory holding `.dat` segment files. Ignored when
    /// `persist_segments` is `false` except as a label for diagnostics.
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_inmemory_size: DEFAULT_MAX_INMEMORY_SIZE,
            segment_size: DEFAULT_SEGMENT_SIZE,
            sparse_offset: DEFAULT_SPARSE_OFFSET,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            persist_segments: true,
            path: PathBuf::from(DEFAULT_PATH),
        }
    }
}

impl DbConfig {
    /// Creates a config with all implementation-chosen defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `max_inmemory_size`.
    #[must_use]
    pub fn with_max_inmemory_size(mut self, n: usize) -> Self {
        self.max_inmemory_size = n;
        self
    }

    /// Sets `segment_size`.
    #[must_use]
    pub fn with_segment_size(mut self, n: usize) -> Self {
        self.segment_size = n;
        self
    }

    /// Sets `sparse_offset`.
    #[must_use]
    pub fn with_sparse_offset(mut self, n: usize) -> Self {
        self.sparse_offset = n;
        self
    }

    /// Sets `merge_threshold`.
    #[must_use]
    pub fn with_merge_threshold(mut self, n: usize) -> Self {
        self.merge_threshold = n;
        self
    }

    /// Sets `persist_segments`.
    #[must_use]
    pub fn with_persist_segments(mut self, persist: bool) -> Self {
        self.persist_segments = persist;
        self
    }

    /// Sets `path`.
    #[must_use]
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }
}
