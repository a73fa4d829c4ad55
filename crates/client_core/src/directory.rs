//! Searchable, paginated directory listing.
//!
//! Keyword edits are debounced; every other trigger fetches right away. Fetch
//! results are applied in the order they resolve, so a slow response can
//! overwrite the effects of a newer one.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use shared::domain::{total_pages, QueryParams, Record};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{debounce::Debouncer, store::RecordStore};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryState {
    pub keyword: String,
    pub current_page: u32,
    pub records: Vec<Record>,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for DirectoryState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            current_page: 1,
            records: Vec::new(),
            total: 0,
            has_next: false,
            has_prev: false,
            loading: false,
            error: None,
        }
    }
}

impl DirectoryState {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total)
    }
}

pub struct DirectoryController {
    store: Arc<dyn RecordStore>,
    state: Mutex<DirectoryState>,
    search: Debouncer,
}

impl DirectoryController {
    pub fn new(store: Arc<dyn RecordStore>) -> Arc<Self> {
        Self::with_debounce(store, SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(store: Arc<dyn RecordStore>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            state: Mutex::new(DirectoryState::default()),
            search: Debouncer::new(delay),
        })
    }

    pub async fn state(&self) -> DirectoryState {
        self.state.lock().await.clone()
    }

    /// Fetches page 1 with no keyword. Run on activation.
    pub async fn initialize(&self) {
        self.search.cancel().await;
        {
            let mut guard = self.state.lock().await;
            guard.keyword.clear();
            guard.current_page = 1;
        }
        self.fetch(String::new(), 1).await;
    }

    /// Updates the keyword immediately and schedules a page-1 fetch for it
    /// after the quiet period, replacing any fetch still waiting.
    pub async fn set_keyword(self: &Arc<Self>, keyword: impl Into<String>) {
        let keyword = keyword.into();
        {
            let mut guard = self.state.lock().await;
            guard.keyword = keyword.clone();
            guard.current_page = 1;
            // paging is unknown until the new keyword's first page arrives
            guard.has_next = false;
            guard.has_prev = false;
        }

        let controller = Arc::clone(self);
        self.search
            .schedule(async move { controller.fetch(keyword, 1).await })
            .await;
    }

    /// Clears the keyword and fetches page 1 right away.
    pub async fn refresh(&self) {
        if self.search.cancel().await {
            debug!("pending keyword search dropped by refresh");
        }
        {
            let mut guard = self.state.lock().await;
            guard.keyword.clear();
            guard.current_page = 1;
        }
        self.fetch(String::new(), 1).await;
    }

    /// Returns `false` without touching state when there is no next page.
    pub async fn go_to_next_page(&self) -> bool {
        let (keyword, page) = {
            let guard = self.state.lock().await;
            if !guard.has_next {
                return false;
            }
            (guard.keyword.clone(), guard.current_page.saturating_add(1))
        };
        self.fetch(keyword, page).await;
        true
    }

    /// Returns `false` without touching state when there is no previous page.
    pub async fn go_to_prev_page(&self) -> bool {
        let (keyword, page) = {
            let guard = self.state.lock().await;
            if !guard.has_prev {
                return false;
            }
            (guard.keyword.clone(), guard.current_page.saturating_sub(1).max(1))
        };
        self.fetch(keyword, page).await;
        true
    }

    async fn fetch(&self, keyword: String, page: u32) {
        {
            let mut guard = self.state.lock().await;
            guard.loading = true;
            guard.error = None;
        }

        let params = QueryParams::for_page(&keyword, page);
        debug!(keyword = ?params.keyword, page, offset = params.offset, "directory fetch issued");
        let result = self.store.list_records(params).await;

        let mut guard = self.state.lock().await;
        match result {
            Ok(page_result) => {
                debug!(
                    page,
                    records = page_result.records.len(),
                    total = page_result.pagination.total,
                    "directory fetch settled"
                );
                guard.records = page_result.records;
                guard.total = page_result.pagination.total;
                guard.has_next = page_result.pagination.has_next;
                guard.has_prev = page_result.pagination.has_prev;
                guard.current_page = page;
            }
            Err(failure) => {
                warn!(page, kind = %failure.kind, "directory fetch failed");
                guard.error = Some(failure.display_message());
                guard.records.clear();
                guard.total = 0;
                guard.has_next = false;
                guard.has_prev = false;
            }
        }
        guard.loading = false;
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    created_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
