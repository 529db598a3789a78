//! Filevault client core.
//!
//! Owns the stateful subsystems of the client: the upload queue and its
//! batch executor, the result-list consistency controller, the storage
//! statistics reader, and the mutation event bus that ties them together.
//! All networking goes through `filevault-api-client`.

pub mod events;
pub mod executor;
pub mod queue;
pub mod stats;
pub mod views;

use std::sync::Arc;

use filevault_api_client::{ApiClient, SessionContext};
use filevault_core::ClientError;

pub use events::{EventBus, MutationEvent};
pub use executor::{BatchUploadExecutor, ExecutorConfig};
pub use queue::{QueueItem, UploadQueue, UploadStatus};
pub use stats::StorageStatsReader;
pub use views::{ResultListController, ViewContext};

/// Delete files by id and publish [`MutationEvent::FilesDeleted`] for the
/// ones that went through. Stops at the first failure; deletions already
/// performed are still announced so subscribed views re-fetch.
pub async fn delete_files(
    api: &ApiClient,
    events: &EventBus,
    ids: &[i64],
) -> Result<usize, ClientError> {
    let mut deleted = 0;
    let mut failure = None;
    for id in ids {
        match api.delete_file(*id).await {
            Ok(()) => deleted += 1,
            Err(err) => {
                tracing::error!(error = %err, file_id = id, "delete failed");
                failure = Some(err);
                break;
            }
        }
    }
    if deleted > 0 {
        events.publish(MutationEvent::FilesDeleted {
            deleted_count: deleted,
        });
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(deleted),
    }
}

/// Fail all active queue items when the session is invalidated.
///
/// Spawned once per process; exits after the first invalidation (a fresh
/// login creates a clean session state, so callers re-spawn if they
/// re-authenticate).
pub fn spawn_session_watcher(
    queue: UploadQueue,
    session: Arc<SessionContext>,
) -> tokio::task::JoinHandle<()> {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            if *rx.borrow_and_update() {
                let failed = queue.fail_active("Session expired, please log in again");
                if failed > 0 {
                    tracing::warn!(failed, "marked queued uploads as failed after session loss");
                }
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
