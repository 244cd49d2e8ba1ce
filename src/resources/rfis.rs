//! RFIs (requests for information) on a project.

use async_trait::async_trait;

use crate::client::Scope;
use crate::identifier::KeyMap;
use crate::resources::{FindResource, ListResource, ShowResource};

/// RFI access for one project.
///
/// The list endpoint returns abbreviated records, so identifier resolution
/// follows the summary match with a detail fetch (list-then-show). String
/// identifiers compare against the RFI `number`.
#[derive(Debug, Clone, Copy)]
pub struct Rfis {
    /// Company the project belongs to.
    pub company_id: u64,
    /// Project the RFIs belong to.
    pub project_id: u64,
}

#[async_trait]
impl ListResource for Rfis {
    const ENTITY: &'static str = "RFI";

    fn list_path(&self) -> String {
        format!("/rest/v1.0/projects/{}/rfis", self.project_id)
    }

    fn scope(&self) -> Scope {
        Scope::company(self.company_id)
    }
}

#[async_trait]
impl ShowResource for Rfis {
    fn show_path(&self, id: u64) -> String {
        format!("/rest/v1.0/projects/{}/rfis/{id}", self.project_id)
    }
}

#[async_trait]
impl FindResource for Rfis {
    fn keys(&self) -> KeyMap {
        KeyMap::named("number")
    }

    // The summary record omits question/answer threads; fetch the full
    // record once matched.
    fn detail_path(&self, id: u64) -> Option<String> {
        Some(self.show_path(id))
    }
}
