//! Searchable, paginated patient list.
//!
//! The controller owns the search box text, the committed search and the page
//! index. Typing restarts a debounce timer; when it fires the text is committed
//! and the page resets to 1. Every change of the query key issues a fetch.
//! Fetches run concurrently, and results are applied by key recency: a response
//! is applied only if it belongs to the current key and is the newest fetch
//! issued for it. Anything else is discarded, whatever order responses arrive in.
//!
//! Results are delivered as events on an internal channel; the owner drives the
//! controller by awaiting [`ListQueryController::next_update`].

use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::PatientCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{ListPatientsParams, PaginatedPatients};
use crate::services::patients::PatientService;

/// Identifies one list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub search: String,
    pub page: u32,
}

/// What the list screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListView {
    /// Last successfully applied page; kept when a later fetch fails
    pub page: Option<PaginatedPatients>,
    pub is_loading: bool,
    /// Set when the latest fetch for the current key failed
    pub error: Option<String>,
}

/// Outcome of applying one controller event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListUpdate {
    /// The debounce fired and the search text was committed
    Committed(String),
    /// A fetch result was applied to the view
    Applied(QueryKey),
    /// The fetch for the current key failed; the previous page stays visible
    Failed(QueryKey),
    /// A result arrived for a superseded fetch and was dropped
    Discarded(QueryKey),
    /// A debounce commit that had already been superseded
    Superseded,
}

enum ListEvent {
    Commit {
        generation: u64,
        text: String,
    },
    Loaded {
        key: QueryKey,
        seq: u64,
        result: Result<PaginatedPatients>,
    },
}

pub struct ListQueryController {
    service: PatientService,
    cache: PatientCache,
    page_size: u32,
    debounce: Duration,
    search_text: String,
    committed_search: String,
    page_index: u32,
    total_pages: Option<u32>,
    view: ListView,
    debounce_generation: u64,
    pending_commit: Option<CancellationToken>,
    latest_seq: u64,
    in_flight: usize,
    events_tx: mpsc::UnboundedSender<ListEvent>,
    events_rx: mpsc::UnboundedReceiver<ListEvent>,
}

impl ListQueryController {
    pub fn new(service: PatientService, cache: PatientCache, config: &Config) -> Self {
        Self::with_settings(
            service,
            cache,
            config.page_size(None),
            Duration::from_millis(config.search.debounce_ms),
        )
    }

    pub fn with_settings(
        service: PatientService,
        cache: PatientCache,
        page_size: u32,
        debounce: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            service,
            cache,
            page_size,
            debounce,
            search_text: String::new(),
            committed_search: String::new(),
            page_index: 1,
            total_pages: None,
            view: ListView::default(),
            debounce_generation: 0,
            pending_commit: None,
            latest_seq: 0,
            in_flight: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn committed_search(&self) -> &str {
        &self.committed_search
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total pages reported by the last applied response.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            search: self.committed_search.clone(),
            page: self.page_index,
        }
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    /// True while a debounce is pending or a fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending_commit.is_some() || self.in_flight > 0
    }

    /// Records new search box text and (re)starts the debounce timer.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.search_text = text.clone();

        if let Some(pending) = self.pending_commit.take() {
            pending.cancel();
        }
        self.debounce_generation += 1;

        let token = CancellationToken::new();
        self.pending_commit = Some(token.clone());

        let generation = self.debounce_generation;
        let delay = self.debounce;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(ListEvent::Commit { generation, text });
                }
            }
        });
    }

    /// Loads the current key, from cache when possible.
    pub async fn load(&mut self) {
        self.request_current(false).await;
    }

    /// Refetches the current key, bypassing the cache.
    pub async fn refresh(&mut self) {
        self.request_current(true).await;
    }

    /// Moves to `page` if it lies within `[1, total_pages]` of the last response.
    ///
    /// Returns false (and changes nothing) otherwise, or if `page` is already current.
    pub async fn go_to_page(&mut self, page: u32) -> bool {
        let Some(total_pages) = self.total_pages else {
            return false;
        };
        if page < 1 || page > total_pages || page == self.page_index {
            debug!(page, total_pages, "page navigation ignored");
            return false;
        }

        self.page_index = page;
        self.request_current(false).await;
        true
    }

    pub async fn next_page(&mut self) -> bool {
        self.go_to_page(self.page_index + 1).await
    }

    pub async fn previous_page(&mut self) -> bool {
        match self.page_index.checked_sub(1) {
            Some(page) => self.go_to_page(page).await,
            None => false,
        }
    }

    /// Waits for and applies the next event. Returns `None` when nothing is pending.
    pub async fn next_update(&mut self) -> Option<ListUpdate> {
        if !self.is_busy() {
            return None;
        }
        let event = self.events_rx.recv().await?;
        Some(self.apply(event).await)
    }

    /// Applies events until no debounce or fetch is pending.
    pub async fn settle(&mut self) -> Vec<ListUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    async fn apply(&mut self, event: ListEvent) -> ListUpdate {
        match event {
            ListEvent::Commit { generation, text } => {
                if generation != self.debounce_generation {
                    return ListUpdate::Superseded;
                }
                self.pending_commit = None;

                let previous = self.query_key();
                self.committed_search = text.clone();
                self.page_index = 1;
                info!(search = %text, "search committed");

                if self.query_key() != previous {
                    self.request_current(false).await;
                }
                ListUpdate::Committed(text)
            }
            ListEvent::Loaded { key, seq, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);

                if key != self.query_key() || seq != self.latest_seq {
                    debug!(search = %key.search, page = key.page, seq, "discarding stale list result");
                    return ListUpdate::Discarded(key);
                }

                self.view.is_loading = false;
                match result {
                    Ok(page) => {
                        self.cache
                            .put_list(&key.search, key.page, self.page_size, page.clone())
                            .await;
                        self.show(page);
                        ListUpdate::Applied(key)
                    }
                    Err(e) => {
                        warn!(search = %key.search, page = key.page, "patient list fetch failed: {}", e);
                        self.view.error = Some(e.user_message());
                        ListUpdate::Failed(key)
                    }
                }
            }
        }
    }

    fn show(&mut self, page: PaginatedPatients) {
        self.total_pages = Some(page.total_pages);
        self.view.page = Some(page);
        self.view.error = None;
    }

    async fn request_current(&mut self, force: bool) {
        let key = self.query_key();
        self.latest_seq += 1;
        let seq = self.latest_seq;

        if !force {
            if let Some(page) = self.cache.get_list(&key.search, key.page, self.page_size).await {
                debug!(search = %key.search, page = key.page, "serving patient list from cache");
                self.view.is_loading = false;
                self.show(page);
                return;
            }
        }

        let params = ListPatientsParams {
            page: key.page,
            page_size: self.page_size,
            search: key.search.clone(),
        };
        debug!(search = %key.search, page = key.page, seq, "issuing patient list fetch");

        self.in_flight += 1;
        self.view.is_loading = true;

        let service = self.service.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.list(&params).await;
            let _ = tx.send(ListEvent::Loaded { key, seq, result });
        });
    }
}
