use anyhow::Result;
use async_trait::async_trait;

use crate::data_models::Advocate;
use crate::filter::{AdvocateFilter, PageWindow, SortSpec};

/// Read access to the advocate rows.
///
/// Both methods must evaluate `filter` identically; the query engine relies
/// on `count` describing the same set `find_page` pages through.
#[async_trait]
pub trait AdvocateStore: Send + Sync {
    async fn find_page(
        &self,
        filter: &AdvocateFilter,
        sort: SortSpec,
        window: PageWindow,
    ) -> Result<Vec<Advocate>>;

    async fn count(&self, filter: &AdvocateFilter) -> Result<u64>;
}

/// Advocates held in process memory, used when serving fixtures and in tests.
#[derive(Debug, Default)]
pub struct InMemoryAdvocateStore {
    advocates: Vec<Advocate>,
}

impl InMemoryAdvocateStore {
    pub fn new(advocates: Vec<Advocate>) -> Self {
        Self { advocates }
    }
}

#[async_trait]
impl AdvocateStore for InMemoryAdvocateStore {
    async fn find_page(
        &self,
        filter: &AdvocateFilter,
        sort: SortSpec,
        window: PageWindow,
    ) -> Result<Vec<Advocate>> {
        let mut matching: Vec<&Advocate> = self
            .advocates
            .iter()
            .filter(|a| filter.matches(a))
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &AdvocateFilter) -> Result<u64> {
        let total = self.advocates.iter().filter(|a| filter.matches(a)).count();
        Ok(total as u64)
    }
}
