use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::data_models::Advocate;
use crate::filter::{AdvocateFilter, PageWindow, SortSpec};
use crate::query_params::SearchQuery;
use crate::store::AdvocateStore;

/// One page of search results plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub advocates: Vec<Advocate>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// The store failed. Details are logged where it happens and never carried
    /// back to the caller.
    #[error("search failed")]
    Internal,
}

pub struct QueryEngine {
    store: Arc<dyn AdvocateStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn AdvocateStore>) -> Self {
        Self { store }
    }

    /// Run a validated search: the page read and the count read share one
    /// filter and are issued concurrently.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        let start = Instant::now();
        let filter = AdvocateFilter::from(query);
        let sort = SortSpec::from(query);
        let window = PageWindow::from(query);

        let (advocates, total) = tokio::try_join!(
            self.store.find_page(&filter, sort, window),
            self.store.count(&filter),
        )
        .map_err(|e| {
            tracing::error!(?filter, page = query.page, "advocate search failed: {:#}", e);
            SearchError::Internal
        })?;

        tracing::debug!(
            ?filter,
            sort = query.sort.as_str(),
            order = query.order.as_str(),
            page = query.page,
            returned = advocates.len(),
            total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "advocate search"
        );

        Ok(SearchPage {
            advocates,
            page: query.page,
            page_size: query.page_size,
            total,
        })
    }
}
