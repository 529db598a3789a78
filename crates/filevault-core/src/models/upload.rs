//! Upload payloads and per-file outcomes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A file staged for upload. Content is loaded eagerly so validation is
/// pure and the submission order of bytes matches the queue order exactly.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Per-file result from a batch upload, in submission order. The server may
/// return a bare object for a single-file batch; the API client normalizes
/// that to a one-element vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub filename: String,
    pub size: u64,
    pub hash: String,
    #[serde(default)]
    pub deduplicated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate result of one batch submission, for user notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub success_count: usize,
    pub deduplicated_count: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.success_count == 1 { "" } else { "s" };
        write!(
            f,
            "{} file{} uploaded successfully",
            self.success_count, plural
        )?;
        if self.deduplicated_count > 0 {
            write!(f, " ({} deduplicated)", self.deduplicated_count)?;
        }
        Ok(())
    }
}
