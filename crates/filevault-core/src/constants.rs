//! Shared default values for client configuration.

/// Maximum number of files that may sit in the upload queue at once.
pub const DEFAULT_MAX_FILES: usize = 10;

/// Maximum size of a single file accepted for upload (32 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 32 * 1024 * 1024;

/// Page size used for file listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Interval between synthetic progress ticks while a batch is in flight.
pub const DEFAULT_PROGRESS_TICK_MS: u64 = 200;

/// Progress added per tick while a batch is in flight.
pub const DEFAULT_PROGRESS_STEP: u8 = 10;

/// Synthetic progress never exceeds this value; only a confirmed server
/// response moves an item to 100.
pub const DEFAULT_PROGRESS_CAP: u8 = 90;

/// Delay before successfully uploaded items are swept out of the queue.
pub const DEFAULT_SWEEP_DELAY_MS: u64 = 3_000;

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
