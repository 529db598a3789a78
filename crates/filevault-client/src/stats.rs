//! Storage statistics reader.
//!
//! Purely derived data: no internal state machine, no caching, no retry.
//! Failures propagate to the caller.

use filevault_api_client::ApiClient;
use filevault_core::models::StorageStats;
use filevault_core::ClientError;

/// Stateless pass-through to the stats endpoint.
#[derive(Clone)]
pub struct StorageStatsReader {
    api: ApiClient,
}

impl StorageStatsReader {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch(&self) -> Result<StorageStats, ClientError> {
        self.api.storage_stats().await
    }
}
