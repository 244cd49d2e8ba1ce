//! Companies the data connection app is installed in.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{ProcoreClient, Scope};
use crate::error::Result;
use crate::resources::{FindResource, ListResource};

/// Company-level access.
///
/// Companies are the tenancy root; most other resources are scoped to one.
///
/// # Example
///
/// ```no_run
/// use procore_api::{Companies, FindResource, ProcoreClient};
///
/// # async fn example(client: &ProcoreClient) -> procore_api::Result<()> {
/// let company = Companies.find(client, "Acme Construction").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Companies;

#[async_trait]
impl ListResource for Companies {
    const ENTITY: &'static str = "company";

    fn list_path(&self) -> String {
        "/rest/v1.0/companies".to_string()
    }

    // Company listing is the one endpoint that needs no tenant header.
    fn scope(&self) -> Scope {
        Scope::default()
    }

    fn per_page(&self) -> u32 {
        10_000
    }

    fn extra_params(&self) -> Vec<(String, String)> {
        vec![("include_free_companies".to_string(), "true".to_string())]
    }
}

#[async_trait]
impl FindResource for Companies {}

impl Companies {
    /// List every project under a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn projects_of(
        &self,
        client: &ProcoreClient,
        company_id: u64,
    ) -> Result<Vec<Value>> {
        let body = client
            .get(
                &format!("/rest/v1.0/companies/{company_id}/projects"),
                Scope::company(company_id),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}
