//! Upload queue: insertion-ordered items with per-item status.
//!
//! Queue order is load-bearing: the batch executor submits pending items in
//! this order and correlates the server's outcome array back by position.
//! Status transitions only move forward (Pending → Uploading → Success or
//! Error); the queue enforces this, so no item can be rewound by a stale
//! caller.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;

use filevault_core::models::{FileHandle, UploadOutcome};
use filevault_core::ClientError;

/// Lifecycle of a queued upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Success | UploadStatus::Error)
    }

    /// Legal forward transitions. Errors are terminal: re-submission means
    /// removing the item and enqueueing a fresh one.
    fn can_become(self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Pending, UploadStatus::Uploading)
                | (UploadStatus::Pending, UploadStatus::Error)
                | (UploadStatus::Uploading, UploadStatus::Success)
                | (UploadStatus::Uploading, UploadStatus::Error)
        )
    }
}

/// One queued file with its upload state.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: Uuid,
    pub file: FileHandle,
    pub status: UploadStatus,
    pub progress_percent: u8,
    pub result: Option<UploadOutcome>,
    pub error_message: Option<String>,
    completed_at: Option<Instant>,
}

impl QueueItem {
    fn new(file: FileHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            file,
            status: UploadStatus::Pending,
            progress_percent: 0,
            result: None,
            error_message: None,
            completed_at: None,
        }
    }

    fn transition(&mut self, next: UploadStatus) -> bool {
        if !self.status.can_become(next) {
            tracing::warn!(
                item_id = %self.id,
                from = ?self.status,
                to = ?next,
                "ignoring illegal status transition"
            );
            return false;
        }
        self.status = next;
        true
    }
}

/// Shared, insertion-ordered upload queue. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct UploadQueue {
    inner: Arc<Mutex<Vec<QueueItem>>>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueueItem>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append validated files as Pending items, preserving arrival order.
    /// Returns the new item ids.
    pub fn enqueue(&self, files: Vec<FileHandle>) -> Vec<Uuid> {
        let mut items = self.lock();
        let ids: Vec<Uuid> = files
            .into_iter()
            .map(|file| {
                let item = QueueItem::new(file);
                let id = item.id;
                tracing::debug!(item_id = %id, filename = %item.file.name, "file enqueued");
                items.push(item);
                id
            })
            .collect();
        ids
    }

    /// Snapshot of all items, for display.
    pub fn items(&self) -> Vec<QueueItem> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|i| i.status == UploadStatus::Pending)
            .count()
    }

    /// Remove an item. Only Pending and Error items may be removed; pulling
    /// an Uploading item would race the executor, and Success items are
    /// left for the sweep.
    pub fn remove(&self, id: Uuid) -> Result<(), ClientError> {
        let mut items = self.lock();
        let Some(pos) = items.iter().position(|i| i.id == id) else {
            return Err(ClientError::InvalidState(format!(
                "item {} is not in the upload queue",
                id
            )));
        };
        match items[pos].status {
            UploadStatus::Pending | UploadStatus::Error => {
                items.remove(pos);
                Ok(())
            }
            status => Err(ClientError::InvalidState(format!(
                "cannot remove item {} with status {:?}",
                id, status
            ))),
        }
    }

    /// Remove everything except in-flight items.
    pub fn clear(&self) -> usize {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|i| i.status == UploadStatus::Uploading);
        before - items.len()
    }

    /// Evict Success items that completed at least `min_age` ago. Items the
    /// user removed earlier are simply gone already.
    pub fn sweep_completed(&self, min_age: Duration) -> usize {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|i| {
            i.status != UploadStatus::Success
                || i.completed_at.map(|t| t.elapsed() < min_age).unwrap_or(true)
        });
        let swept = before - items.len();
        if swept > 0 {
            tracing::debug!(swept, "swept completed uploads from queue");
        }
        swept
    }

    /// Transition every Pending item to Uploading with the given starting
    /// progress and return the snapshot the executor will submit, in queue
    /// order.
    pub(crate) fn begin_batch(&self, initial_progress: u8) -> Vec<(Uuid, FileHandle)> {
        let mut items = self.lock();
        let mut snapshot = Vec::new();
        for item in items.iter_mut() {
            if item.status == UploadStatus::Pending && item.transition(UploadStatus::Uploading) {
                item.progress_percent = initial_progress;
                snapshot.push((item.id, item.file.clone()));
            }
        }
        snapshot
    }

    /// Advance synthetic progress on all Uploading items, capped. Progress
    /// is non-decreasing by construction.
    pub(crate) fn advance_progress(&self, step: u8, cap: u8) {
        let mut items = self.lock();
        for item in items.iter_mut() {
            if item.status == UploadStatus::Uploading {
                item.progress_percent = item.progress_percent.saturating_add(step).min(cap);
            }
        }
    }

    /// Apply per-file outcomes by position. `ids` and `outcomes` must have
    /// equal length; the executor checks arity before calling.
    pub(crate) fn complete_batch(&self, ids: &[Uuid], outcomes: Vec<UploadOutcome>) {
        let mut items = self.lock();
        for (id, outcome) in ids.iter().zip(outcomes) {
            if let Some(item) = items.iter_mut().find(|i| i.id == *id) {
                if item.transition(UploadStatus::Success) {
                    item.progress_percent = 100;
                    item.result = Some(outcome);
                    item.completed_at = Some(Instant::now());
                }
            }
        }
    }

    /// Fail every item of a batch with a shared message.
    pub(crate) fn fail_batch(&self, ids: &[Uuid], message: &str) {
        let mut items = self.lock();
        for id in ids {
            if let Some(item) = items.iter_mut().find(|i| i.id == *id) {
                if item.transition(UploadStatus::Error) {
                    item.error_message = Some(message.to_string());
                }
            }
        }
    }

    /// Fail all Pending and Uploading items, e.g. after session teardown.
    /// Returns the number of items affected.
    pub fn fail_active(&self, message: &str) -> usize {
        let mut items = self.lock();
        let mut failed = 0;
        for item in items.iter_mut() {
            if !item.status.is_terminal() && item.transition(UploadStatus::Error) {
                item.error_message = Some(message.to_string());
                failed += 1;
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str) -> FileHandle {
        FileHandle::new(name, vec![0u8; 4])
    }

    fn outcome(name: &str, deduplicated: bool) -> UploadOutcome {
        UploadOutcome {
            filename: name.to_string(),
            size: 4,
            hash: "h".to_string(),
            deduplicated,
            message: None,
        }
    }

    #[test]
    fn enqueue_preserves_arrival_order() {
        let queue = UploadQueue::new();
        queue.enqueue(vec![handle("a"), handle("b"), handle("c")]);

        let names: Vec<String> = queue.items().iter().map(|i| i.file.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(queue
            .items()
            .iter()
            .all(|i| i.status == UploadStatus::Pending && i.progress_percent == 0));
    }

    #[test]
    fn transitions_never_move_backward() {
        assert!(UploadStatus::Pending.can_become(UploadStatus::Uploading));
        assert!(UploadStatus::Uploading.can_become(UploadStatus::Success));
        assert!(UploadStatus::Uploading.can_become(UploadStatus::Error));

        assert!(!UploadStatus::Uploading.can_become(UploadStatus::Pending));
        assert!(!UploadStatus::Success.can_become(UploadStatus::Uploading));
        assert!(!UploadStatus::Success.can_become(UploadStatus::Error));
        assert!(!UploadStatus::Error.can_become(UploadStatus::Uploading));
        assert!(!UploadStatus::Error.can_become(UploadStatus::Success));
        assert!(!UploadStatus::Pending.can_become(UploadStatus::Success));
    }

    #[test]
    fn remove_rejects_uploading_and_success_items() {
        let queue = UploadQueue::new();
        let ids = queue.enqueue(vec![handle("a"), handle("b")]);

        let snapshot = queue.begin_batch(10);
        assert_eq!(snapshot.len(), 2);

        // a is in flight
        assert!(matches!(
            queue.remove(ids[0]),
            Err(ClientError::InvalidState(_))
        ));

        queue.complete_batch(&[ids[0]], vec![outcome("a", false)]);
        // a is now Success, still not removable by the user
        assert!(matches!(
            queue.remove(ids[0]),
            Err(ClientError::InvalidState(_))
        ));

        queue.fail_batch(&[ids[1]], "boom");
        // error items can go
        assert!(queue.remove(ids[1]).is_ok());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn remove_unknown_id_is_invalid_state() {
        let queue = UploadQueue::new();
        assert!(matches!(
            queue.remove(Uuid::new_v4()),
            Err(ClientError::InvalidState(_))
        ));
    }

    #[test]
    fn clear_spares_in_flight_items() {
        let queue = UploadQueue::new();
        let ids = queue.enqueue(vec![handle("a"), handle("b"), handle("c")]);

        // all three go in flight, then "b" succeeds and "c" fails
        let snapshot = queue.begin_batch(10);
        assert_eq!(snapshot.len(), 3);
        queue.complete_batch(&[ids[1]], vec![outcome("b", false)]);
        queue.fail_batch(&[ids[2]], "x");

        let removed = queue.clear();
        assert_eq!(removed, 2);
        let remaining = queue.items();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[0]);
        assert_eq!(remaining[0].status, UploadStatus::Uploading);
    }

    #[test]
    fn progress_is_capped_and_lands_on_100_at_success() {
        let queue = UploadQueue::new();
        let ids = queue.enqueue(vec![handle("a")]);
        queue.begin_batch(10);

        let mut last = 0;
        for _ in 0..20 {
            queue.advance_progress(10, 90);
            let progress = queue.items()[0].progress_percent;
            assert!(progress >= last, "progress must be non-decreasing");
            assert!(progress <= 90, "synthetic progress must stay below 100");
            last = progress;
        }
        assert_eq!(last, 90);

        queue.complete_batch(&ids, vec![outcome("a", true)]);
        let item = &queue.items()[0];
        assert_eq!(item.status, UploadStatus::Success);
        assert_eq!(item.progress_percent, 100);
        assert!(item.result.as_ref().unwrap().deduplicated);
    }

    #[test]
    fn sweep_evicts_only_aged_success_items() {
        let queue = UploadQueue::new();
        let ids = queue.enqueue(vec![handle("a"), handle("b")]);
        queue.begin_batch(10);
        queue.complete_batch(&[ids[0]], vec![outcome("a", false)]);

        // "a" completed just now: a long min_age spares it
        assert_eq!(queue.sweep_completed(Duration::from_secs(60)), 0);
        // zero min_age evicts it; "b" is still Uploading and untouched
        assert_eq!(queue.sweep_completed(Duration::ZERO), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.items()[0].status, UploadStatus::Uploading);
    }

    #[test]
    fn fail_active_covers_pending_and_uploading() {
        let queue = UploadQueue::new();
        let ids = queue.enqueue(vec![handle("a"), handle("b"), handle("c")]);
        queue.begin_batch(10);
        queue.complete_batch(&[ids[0]], vec![outcome("a", false)]);
        queue.enqueue(vec![handle("d")]);

        let failed = queue.fail_active("session expired");
        assert_eq!(failed, 3);

        let items = queue.items();
        assert_eq!(items[0].status, UploadStatus::Success);
        for item in &items[1..] {
            assert_eq!(item.status, UploadStatus::Error);
            assert_eq!(item.error_message.as_deref(), Some("session expired"));
        }
    }
}
