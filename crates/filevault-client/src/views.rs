//! Result-list consistency controller.
//!
//! Owns the active view (a list page or a search) and the last page fetched
//! for it. Every observable change to the result set comes from a fresh
//! fetch; nothing is patched locally, so pagination metadata always matches
//! the server. Fetches are tagged with a generation number captured at
//! issue time and a completion for a superseded generation is discarded,
//! which gives last-writer-wins semantics on the stored page.

use std::sync::{Arc, Mutex, MutexGuard};

use filevault_api_client::ApiClient;
use filevault_core::models::{ResultPage, SearchFilters};
use filevault_core::ClientError;

use crate::events::MutationEvent;

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContext {
    ListView { page: u32, page_size: u32 },
    SearchView { filters: SearchFilters },
}

impl ViewContext {
    pub fn list(page: u32, page_size: u32) -> Self {
        ViewContext::ListView { page, page_size }
    }

    pub fn search(filters: SearchFilters) -> Self {
        ViewContext::SearchView { filters }
    }
}

#[derive(Debug)]
struct ViewState {
    context: ViewContext,
    page: Option<ResultPage>,
    generation: u64,
}

/// Keeps the displayed result list consistent with the server after
/// mutations. Cheap to clone.
#[derive(Clone)]
pub struct ResultListController {
    api: ApiClient,
    state: Arc<Mutex<ViewState>>,
}

impl ResultListController {
    pub fn new(api: ApiClient, initial: ViewContext) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ViewState {
                context: initial,
                page: None,
                generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The active view context.
    pub fn context(&self) -> ViewContext {
        self.lock().context.clone()
    }

    /// The last page applied for the active context, if any.
    pub fn current_page(&self) -> Option<ResultPage> {
        self.lock().page.clone()
    }

    /// Replace the view context and fetch it. Bumps the generation so any
    /// still-in-flight fetch for the old context is discarded on arrival.
    pub async fn set_view(&self, view: ViewContext) -> Result<ResultPage, ClientError> {
        let (generation, context) = {
            let mut state = self.lock();
            state.generation += 1;
            state.context = view;
            (state.generation, state.context.clone())
        };
        self.fetch_and_apply(generation, context).await
    }

    /// Re-issue the fetch for the current context verbatim. Used after an
    /// upload completes so page 1 of the default list shows new files.
    pub async fn refresh(&self) -> Result<ResultPage, ClientError> {
        let (generation, context) = {
            let state = self.lock();
            (state.generation, state.context.clone())
        };
        self.fetch_and_apply(generation, context).await
    }

    /// Re-resolve the view after files were deleted.
    ///
    /// For a list view: if the delete emptied the displayed page and we are
    /// past page 1, jump back to page 1 rather than fetching a page that no
    /// longer exists. A search view always re-issues the same filters.
    pub async fn after_delete(&self, deleted_count: usize) -> Result<ResultPage, ClientError> {
        let jump_to_first = {
            let state = self.lock();
            match (&state.context, &state.page) {
                (ViewContext::ListView { page, page_size }, Some(result))
                    if *page > 1 && result.files.len() == deleted_count =>
                {
                    Some(*page_size)
                }
                _ => None,
            }
        };

        if let Some(page_size) = jump_to_first {
            tracing::debug!("deleted page emptied, jumping back to page 1");
            self.set_view(ViewContext::list(1, page_size)).await
        } else {
            self.refresh().await
        }
    }

    /// React to a mutation event from the bus.
    pub async fn handle_mutation(&self, event: MutationEvent) -> Result<ResultPage, ClientError> {
        match event {
            MutationEvent::UploadCompleted { .. } => self.refresh().await,
            MutationEvent::FilesDeleted { deleted_count } => self.after_delete(deleted_count).await,
        }
    }

    /// Consume mutation events in a background task, logging fetch failures
    /// instead of propagating them (the next explicit fetch surfaces them).
    pub fn listen(
        &self,
        mut rx: tokio::sync::broadcast::Receiver<MutationEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if let Err(err) = controller.handle_mutation(event).await {
                    tracing::warn!(error = %err, "view refresh after mutation failed");
                }
            }
        })
    }

    async fn fetch_and_apply(
        &self,
        generation: u64,
        context: ViewContext,
    ) -> Result<ResultPage, ClientError> {
        let page = match &context {
            ViewContext::ListView { page, page_size } => {
                self.api.list_files(*page, *page_size).await?
            }
            ViewContext::SearchView { filters } => self.api.search_files(filters).await?,
        };

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(
                stale_generation = generation,
                current_generation = state.generation,
                "discarding fetch result for abandoned view"
            );
            return Ok(page);
        }
        state.page = Some(page.clone());
        Ok(page)
    }
}
