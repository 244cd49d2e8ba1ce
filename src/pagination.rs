//! Exhaustive pagination over collection endpoints.
//!
//! Every collection endpoint paginates the same way: 1-based `page` plus a
//! resource-specific `per_page`. The loop terminates on the first empty
//! page, which matches the original API call sequence (one trailing empty
//! request past the last full page).

use futures::future::try_join_all;
use serde_json::Value;

use crate::client::{ProcoreClient, Scope};
use crate::error::{ProcoreError, Result};

/// Default page size for list operations.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Default cap on pages fetched by one list operation.
pub const MAX_PAGES: u32 = 1000;

/// How list operations fetch their pages.
#[derive(Debug, Clone, Copy, Default)]
pub enum PageFetch {
    /// One page at a time, each waiting on the previous. Matches the
    /// server's rate-limit expectations.
    #[default]
    Sequential,
    /// Up to `in_flight` page requests issued together, results joined in
    /// page order. Useful for large collections.
    Concurrent {
        /// Number of page requests in flight at once.
        in_flight: usize,
    },
}

/// Drives the page loop for one collection endpoint.
pub(crate) struct Pager<'a> {
    client: &'a ProcoreClient,
    path: String,
    scope: Scope,
    per_page: u32,
    params: Vec<(String, String)>,
    filter_deleted: bool,
    max_pages: u32,
}

impl<'a> Pager<'a> {
    pub(crate) fn new(client: &'a ProcoreClient, path: String, scope: Scope) -> Self {
        Self {
            client,
            path,
            scope,
            per_page: DEFAULT_PER_PAGE,
            params: Vec::new(),
            filter_deleted: false,
            max_pages: MAX_PAGES,
        }
    }

    pub(crate) fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub(crate) fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// Drop items carrying `"is_deleted": true` after each fetch, before
    /// accumulation. Termination still counts the raw page.
    pub(crate) fn filter_deleted(mut self, filter: bool) -> Self {
        self.filter_deleted = filter;
        self
    }

    /// Fetch one page, returning the raw item array.
    pub(crate) async fn fetch_page(&self, page: u32) -> Result<Vec<Value>> {
        let mut query = self.params.clone();
        query.push(("page".to_string(), page.to_string()));
        query.push(("per_page".to_string(), self.per_page.to_string()));

        let body = self
            .client
            .get_with_query(&self.path, self.scope, &query)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetch every page per the client's [`PageFetch`] mode.
    pub(crate) async fn collect(&self) -> Result<Vec<Value>> {
        match self.client.page_fetch() {
            PageFetch::Sequential => self.collect_sequential().await,
            PageFetch::Concurrent { in_flight } => {
                self.collect_concurrent(in_flight.max(1)).await
            }
        }
    }

    async fn collect_sequential(&self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            if page > self.max_pages {
                return Err(ProcoreError::PaginationLimit {
                    max_pages: self.max_pages,
                });
            }
            let fetched = self.fetch_page(page).await?;
            if fetched.is_empty() {
                break;
            }
            items.extend(self.strip_deleted(fetched));
            page += 1;
        }
        Ok(items)
    }

    async fn collect_concurrent(&self, in_flight: usize) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut next = 1u32;
        loop {
            if next > self.max_pages {
                return Err(ProcoreError::PaginationLimit {
                    max_pages: self.max_pages,
                });
            }
            let last = next
                .saturating_add(in_flight as u32 - 1)
                .min(self.max_pages);
            let batch: Vec<_> = (next..=last).map(|page| self.fetch_page(page)).collect();
            let pages = try_join_all(batch).await?;

            let mut saw_empty = false;
            for fetched in pages {
                if fetched.is_empty() {
                    saw_empty = true;
                    break;
                }
                items.extend(self.strip_deleted(fetched));
            }
            if saw_empty {
                break;
            }
            next = last + 1;
        }
        Ok(items)
    }

    fn strip_deleted(&self, fetched: Vec<Value>) -> Vec<Value> {
        if !self.filter_deleted {
            return fetched;
        }
        fetched
            .into_iter()
            .filter(|item| item.get("is_deleted").and_then(Value::as_bool) != Some(true))
            .collect()
    }
}
