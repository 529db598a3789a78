//! Batch upload executor.
//!
//! Submits every pending queue item as one multipart request and maps the
//! server's ordered outcome array back onto the snapshot by position —
//! never by filename, since duplicate names are legal. A batch is atomic:
//! any transport or server failure moves every in-flight item of that batch
//! to Error with a shared message.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use filevault_api_client::ApiClient;
use filevault_core::constants::{
    DEFAULT_PROGRESS_CAP, DEFAULT_PROGRESS_STEP, DEFAULT_PROGRESS_TICK_MS, DEFAULT_SWEEP_DELAY_MS,
};
use filevault_core::models::{BatchSummary, FileHandle};
use filevault_core::{ClientConfig, ClientError};

use crate::events::{EventBus, MutationEvent};
use crate::queue::UploadQueue;

/// Progress starts here the moment a batch goes in flight, so the user sees
/// movement before the first tick.
const INITIAL_PROGRESS: u8 = 10;

/// Timing knobs for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub progress_tick: Duration,
    pub progress_step: u8,
    pub progress_cap: u8,
    pub sweep_delay: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            progress_tick: Duration::from_millis(DEFAULT_PROGRESS_TICK_MS),
            progress_step: DEFAULT_PROGRESS_STEP,
            progress_cap: DEFAULT_PROGRESS_CAP,
            sweep_delay: Duration::from_millis(DEFAULT_SWEEP_DELAY_MS),
        }
    }
}

impl From<&ClientConfig> for ExecutorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            progress_tick: Duration::from_millis(config.progress_tick_ms),
            progress_step: config.progress_step,
            progress_cap: config.progress_cap,
            sweep_delay: Duration::from_millis(config.sweep_delay_ms),
        }
    }
}

/// Drives batch submissions for one upload queue. Cheap to clone.
#[derive(Clone)]
pub struct BatchUploadExecutor {
    api: ApiClient,
    queue: UploadQueue,
    events: EventBus,
    config: ExecutorConfig,
    in_flight: Arc<Mutex<()>>,
}

impl BatchUploadExecutor {
    pub fn new(api: ApiClient, queue: UploadQueue, events: EventBus, config: ExecutorConfig) -> Self {
        Self {
            api,
            queue,
            events,
            config,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    /// Submit all pending items as one batch.
    ///
    /// Returns `Ok(None)` without side effects when another submission is
    /// already in flight (single-flight guard) or when nothing is pending.
    /// On success the batch summary is returned and an
    /// [`MutationEvent::UploadCompleted`] is published.
    pub async fn submit(&self) -> Result<Option<BatchSummary>, ClientError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("batch upload already in flight, ignoring submit");
            return Ok(None);
        };

        if self.api.session().is_invalidated() {
            return Err(ClientError::Auth(
                "session has been invalidated, log in again before uploading".to_string(),
            ));
        }

        let snapshot = self.queue.begin_batch(INITIAL_PROGRESS);
        if snapshot.is_empty() {
            return Ok(None);
        }
        let (ids, files): (Vec<Uuid>, Vec<FileHandle>) = snapshot.into_iter().unzip();
        tracing::info!(batch_size = ids.len(), "submitting upload batch");

        match self.run_batch(&ids, &files).await {
            Ok(summary) => {
                self.events.publish(MutationEvent::UploadCompleted {
                    success_count: summary.success_count,
                    deduplicated_count: summary.deduplicated_count,
                });
                self.schedule_sweep();
                tracing::info!(
                    success_count = summary.success_count,
                    deduplicated_count = summary.deduplicated_count,
                    "upload batch completed"
                );
                Ok(Some(summary))
            }
            Err(err) => {
                // Atomic failure: the contract gives no per-file outcome on
                // error, so every item of this batch fails together.
                self.queue.fail_batch(&ids, &err.to_string());
                tracing::error!(error = %err, batch_size = ids.len(), "upload batch failed");
                Err(err)
            }
        }
    }

    /// Issue the request while ticking synthetic progress on the in-flight
    /// items. The ticker is indeterminate-progress feedback, capped below
    /// 100; only a confirmed outcome moves an item to 100.
    async fn run_batch(
        &self,
        ids: &[Uuid],
        files: &[FileHandle],
    ) -> Result<BatchSummary, ClientError> {
        let request = self.api.upload_batch(files);
        tokio::pin!(request);

        let mut ticker = tokio::time::interval(self.config.progress_tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // first tick completes immediately

        let outcomes = loop {
            tokio::select! {
                result = &mut request => break result?,
                _ = ticker.tick() => {
                    self.queue
                        .advance_progress(self.config.progress_step, self.config.progress_cap);
                }
            }
        };

        if outcomes.len() != ids.len() {
            return Err(ClientError::Decode(format!(
                "server returned {} upload outcomes for {} submitted files",
                outcomes.len(),
                ids.len()
            )));
        }

        let summary = BatchSummary {
            success_count: outcomes.len(),
            deduplicated_count: outcomes.iter().filter(|o| o.deduplicated).count(),
        };
        self.queue.complete_batch(ids, outcomes);
        Ok(summary)
    }

    /// Evict this batch's Success items after the configured delay, unless
    /// the user removed them first.
    fn schedule_sweep(&self) {
        let queue = self.queue.clone();
        let delay = self.config.sweep_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.sweep_completed(delay);
        });
    }
}
