//! Resource-access layer.
//!
//! Each remote entity type is a small config struct implementing the
//! traits below; the pagination and identifier-resolution protocols are
//! implemented once in the provided methods and configured per resource
//! through paths, key maps, and query parameters.

mod companies;
mod documents;
mod projects;
mod rfis;
mod timecards;
mod users;

pub use companies::Companies;
pub use documents::{FileUpdateParams, Files, Folders};
pub use projects::Projects;
pub use rfis::Rfis;
pub use timecards::{Timecards, TimecardEntry};
pub use users::Users;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ProcoreClient, Scope};
use crate::error::{ProcoreError, Result};
use crate::identifier::{Identifier, KeyMap};
use crate::pagination::{Pager, DEFAULT_PER_PAGE};

/// A resource whose collection endpoint paginates.
///
/// Implementors supply the endpoint path and per-resource query knobs;
/// the provided methods carry the shared pagination protocol.
#[async_trait]
pub trait ListResource: Sync {
    /// Entity name used in lookup errors, e.g. `"company"`.
    const ENTITY: &'static str;

    /// Path of the collection endpoint.
    fn list_path(&self) -> String;

    /// Tenant scope attached to every request for this resource.
    fn scope(&self) -> Scope;

    /// Page size the original integration uses for this resource.
    fn per_page(&self) -> u32 {
        DEFAULT_PER_PAGE
    }

    /// Extra query parameters sent with every page request.
    fn extra_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Whether soft-deleted items are dropped client-side after each page.
    fn filter_deleted(&self) -> bool {
        false
    }

    /// Fetch a single page of items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(&self, client: &ProcoreClient, page: u32) -> Result<Vec<Value>> {
        pager(self, client).fetch_page(page).await
    }

    /// Fetch the entire collection, page by page, honoring the client's
    /// page fetch mode.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or the page cap is
    /// exceeded.
    async fn list(&self, client: &ProcoreClient) -> Result<Vec<Value>> {
        pager(self, client).collect().await
    }
}

/// Build the page loop for a resource's collection endpoint.
fn pager<'a, R>(resource: &R, client: &'a ProcoreClient) -> Pager<'a>
where
    R: ListResource + ?Sized,
{
    Pager::new(client, resource.list_path(), resource.scope())
        .per_page(resource.per_page())
        .params(resource.extra_params())
        .filter_deleted(resource.filter_deleted())
}

/// A resource with a single-item detail endpoint.
#[async_trait]
pub trait ShowResource: ListResource {
    /// Path of the detail endpoint for one item.
    fn show_path(&self, id: u64) -> String;

    /// Query parameters sent with detail requests.
    fn show_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Fetch one item by its numeric ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn show(&self, client: &ProcoreClient, id: u64) -> Result<Value> {
        client
            .get_with_query(&self.show_path(id), self.scope(), &self.show_params())
            .await
    }
}

/// A resource supporting find-by-flexible-identifier.
///
/// Resolution lists the full collection and returns the first item whose
/// key field equals the identifier. Resources whose list endpoint returns
/// abbreviated records override [`detail_path`](Self::detail_path) to
/// follow the summary match with a detail fetch (list-then-show).
#[async_trait]
pub trait FindResource: ListResource {
    /// Field names compared against each identifier kind.
    fn keys(&self) -> KeyMap {
        KeyMap::default()
    }

    /// Detail endpoint consulted after a summary match, when the list
    /// endpoint omits fields.
    fn detail_path(&self, id: u64) -> Option<String> {
        let _ = id;
        None
    }

    /// Query parameters sent with the detail fetch.
    fn detail_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Resolve an identifier to exactly one item.
    ///
    /// Accepts anything convertible to [`Identifier`]: numeric IDs,
    /// names, or email addresses.
    ///
    /// # Errors
    ///
    /// Returns [`ProcoreError::NotFoundItem`] when the collection is
    /// exhausted without a match.
    async fn find<I>(&self, client: &ProcoreClient, identifier: I) -> Result<Value>
    where
        I: Into<Identifier> + Send,
    {
        let identifier = identifier.into();
        let keys = self.keys();

        for item in self.list(client).await? {
            if !keys.matches(&item, &identifier) {
                continue;
            }
            let detail = item
                .get(keys.id)
                .and_then(Value::as_u64)
                .and_then(|id| self.detail_path(id));
            return match detail {
                Some(path) => {
                    client
                        .get_with_query(&path, self.scope(), &self.detail_params())
                        .await
                }
                None => Ok(item),
            };
        }

        Err(ProcoreError::NotFoundItem {
            entity: Self::ENTITY,
            identifier: identifier.to_string(),
        })
    }
}
