//! Configuration module
//!
//! Client configuration read from the environment with sensible defaults.
//! All knobs have `FILEVAULT_*` variables; unset or unparseable values fall
//! back to the defaults in [`crate::constants`].

use std::env;

use crate::constants::*;

/// Runtime configuration for the filevault client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the storage backend, e.g. "http://localhost:8080".
    pub api_url: String,
    /// Maximum number of files allowed in the upload queue.
    pub max_files: usize,
    /// Maximum size of a single file in bytes.
    pub max_file_size_bytes: u64,
    /// Allowed content types (exact or prefix match, e.g. "image/").
    /// Empty means every type is accepted.
    pub allowed_content_types: Vec<String>,
    /// Page size for list views.
    pub page_size: u32,
    /// Interval between synthetic progress ticks.
    pub progress_tick_ms: u64,
    /// Progress percentage added per tick.
    pub progress_step: u8,
    /// Upper bound for synthetic progress.
    pub progress_cap: u8,
    /// Delay before successful uploads are evicted from the queue.
    pub sweep_delay_ms: u64,
    /// HTTP request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            max_files: DEFAULT_MAX_FILES,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_content_types: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            progress_tick_ms: DEFAULT_PROGRESS_TICK_MS,
            progress_step: DEFAULT_PROGRESS_STEP,
            progress_cap: DEFAULT_PROGRESS_CAP,
            sweep_delay_ms: DEFAULT_SWEEP_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Build the configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_url: env::var("FILEVAULT_API_URL")
                .or_else(|_| env::var("API_URL"))
                .unwrap_or(defaults.api_url),
            max_files: parse_env("FILEVAULT_MAX_FILES", defaults.max_files),
            max_file_size_bytes: parse_env(
                "FILEVAULT_MAX_FILE_SIZE_BYTES",
                defaults.max_file_size_bytes,
            ),
            allowed_content_types: env::var("FILEVAULT_ALLOWED_CONTENT_TYPES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            page_size: parse_env("FILEVAULT_PAGE_SIZE", defaults.page_size),
            progress_tick_ms: parse_env("FILEVAULT_PROGRESS_TICK_MS", defaults.progress_tick_ms),
            progress_step: parse_env("FILEVAULT_PROGRESS_STEP", defaults.progress_step),
            progress_cap: parse_env("FILEVAULT_PROGRESS_CAP", defaults.progress_cap),
            sweep_delay_ms: parse_env("FILEVAULT_SWEEP_DELAY_MS", defaults.sweep_delay_ms),
            request_timeout_secs: parse_env(
                "FILEVAULT_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
