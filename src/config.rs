/// Minimum number of revisions a page must have to be extracted
pub const DEFAULT_MIN_REVISIONS: usize = 25;

/// Maximum number of revisions a page may have to be extracted
pub const DEFAULT_MAX_REVISIONS: usize = 5500;

/// Minimum similarity ratio for accepting a sentence match
pub const DEFAULT_CUTOFF: f32 = 0.7;

/// Initial delay between checkpoint flushes in seconds (doubles after each flush)
pub const DEFAULT_SAVE_INTERVAL_SECS: u64 = 45 * 60;

/// Progress update interval (tick every N pages)
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Rewrite the per-worker status file every N extracted pages
pub const STATUS_INTERVAL: u64 = 50;
