//! Pre-queue upload validation.
//!
//! A candidate batch is partitioned into accepted and rejected files before
//! anything touches the upload queue. Rejected files never enter queue
//! state; the caller is responsible for surfacing the reasons.

use std::fmt;

use crate::models::FileHandle;

/// Why a candidate file was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge,
    TooManyFiles,
    TypeNotAllowed,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooLarge => write!(f, "file exceeds the maximum allowed size"),
            RejectReason::TooManyFiles => write!(f, "too many files in the upload queue"),
            RejectReason::TypeNotAllowed => write!(f, "file type is not allowed"),
        }
    }
}

/// A rejected candidate together with its reason.
#[derive(Debug, Clone)]
pub struct RejectedFile {
    pub file: FileHandle,
    pub reason: RejectReason,
}

/// Result of validating one candidate batch.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<FileHandle>,
    pub rejected: Vec<RejectedFile>,
}

/// Constraints applied to a candidate batch.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Maximum queue residency: already queued plus newly accepted.
    pub max_files: usize,
    pub max_size_bytes: u64,
    /// Exact or prefix matches (e.g. "image/"). Empty allows everything.
    pub allowed_content_types: Vec<String>,
}

impl UploadLimits {
    fn type_allowed(&self, content_type: Option<&str>) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }
        let Some(ct) = content_type else {
            return false;
        };
        self.allowed_content_types
            .iter()
            .any(|allowed| ct == allowed || ct.starts_with(allowed.as_str()))
    }
}

/// Partition `batch` into accepted and rejected files. Pure: no queue state
/// is touched. `already_queued` counts items currently in the queue so the
/// count limit applies to total residency, not just this call.
pub fn validate_batch(
    batch: Vec<FileHandle>,
    already_queued: usize,
    limits: &UploadLimits,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    let mut capacity = limits.max_files.saturating_sub(already_queued);

    for file in batch {
        if !limits.type_allowed(file.content_type.as_deref()) {
            outcome.rejected.push(RejectedFile {
                file,
                reason: RejectReason::TypeNotAllowed,
            });
            continue;
        }
        if file.size_bytes() > limits.max_size_bytes {
            outcome.rejected.push(RejectedFile {
                file,
                reason: RejectReason::TooLarge,
            });
            continue;
        }
        if capacity == 0 {
            outcome.rejected.push(RejectedFile {
                file,
                reason: RejectReason::TooManyFiles,
            });
            continue;
        }
        capacity -= 1;
        outcome.accepted.push(file);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_files: usize, max_size: u64) -> UploadLimits {
        UploadLimits {
            max_files,
            max_size_bytes: max_size,
            allowed_content_types: Vec::new(),
        }
    }

    #[test]
    fn oversize_file_is_rejected() {
        let batch = vec![
            FileHandle::new("small.txt", vec![0u8; 10]),
            FileHandle::new("big.bin", vec![0u8; 100]),
        ];
        let outcome = validate_batch(batch, 0, &limits(10, 50));

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "small.txt");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reason, RejectReason::TooLarge);
    }

    #[test]
    fn count_limit_accounts_for_queue_residency() {
        let batch = vec![
            FileHandle::new("a.txt", vec![0u8; 1]),
            FileHandle::new("b.txt", vec![0u8; 1]),
            FileHandle::new("c.txt", vec![0u8; 1]),
        ];
        let outcome = validate_batch(batch, 8, &limits(10, 100));

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].file.name, "c.txt");
        assert_eq!(outcome.rejected[0].reason, RejectReason::TooManyFiles);
    }

    #[test]
    fn disallowed_type_is_rejected_before_size_check() {
        let lim = UploadLimits {
            max_files: 10,
            max_size_bytes: 5,
            allowed_content_types: vec!["image/".to_string()],
        };
        let batch = vec![
            FileHandle::new("photo.png", vec![0u8; 3]).with_content_type("image/png"),
            FileHandle::new("huge.mov", vec![0u8; 100]).with_content_type("video/quicktime"),
            FileHandle::new("unknown.bin", vec![0u8; 3]),
        ];
        let outcome = validate_batch(batch, 0, &lim);

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "photo.png");
        assert!(outcome
            .rejected
            .iter()
            .all(|r| r.reason == RejectReason::TypeNotAllowed));
    }

    #[test]
    fn empty_allow_list_accepts_any_type() {
        let batch = vec![FileHandle::new("data.xyz", vec![0u8; 1])];
        let outcome = validate_batch(batch, 0, &limits(10, 10));
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.rejected.is_empty());
    }
}
