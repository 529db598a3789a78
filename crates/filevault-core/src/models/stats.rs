//! Aggregate storage counters from the stats endpoint.

use serde::{Deserialize, Serialize};

/// Server-computed storage statistics. Read-only; refreshed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_storage_used_bytes: u64,
    pub original_storage_used_bytes: u64,
    pub storage_savings_bytes: u64,
    pub storage_savings_percentage: f64,
    pub storage_quota_mb: u64,
    pub quota_used_percentage: f64,
}
