//! Timecard entries at the project level and pay-period listings.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::client::{ProcoreClient, Scope};
use crate::error::{ProcoreError, Result};
use crate::pagination::Pager;
use crate::resources::ListResource;

/// Input for creating a timecard entry.
///
/// Validated locally before any network call: `hours` is required, and a
/// missing `date` defaults to today.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimecardEntry {
    /// Hours worked. Required.
    pub hours: Option<f64>,
    /// Entry date (`YYYY-MM-DD`). Defaults to today.
    pub date: Option<String>,
    /// Party the entry applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_id: Option<u64>,
    /// Cost code the hours book against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_code_id: Option<u64>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Timecard access for one project.
#[derive(Debug, Clone, Copy)]
pub struct Timecards {
    /// Company the project belongs to.
    pub company_id: u64,
    /// Project the timecards belong to.
    pub project_id: u64,
}

#[async_trait]
impl ListResource for Timecards {
    const ENTITY: &'static str = "timecard";

    fn list_path(&self) -> String {
        format!("/rest/v1.0/projects/{}/timecard_entries", self.project_id)
    }

    fn scope(&self) -> Scope {
        Scope::company(self.company_id)
    }

    fn extra_params(&self) -> Vec<(String, String)> {
        vec![("project_id".to_string(), self.project_id.to_string())]
    }
}

impl Timecards {
    /// List all timecard data for the company's current pay period.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn for_pay_period(&self, client: &ProcoreClient) -> Result<Vec<Value>> {
        Pager::new(
            client,
            format!("/rest/v1.0/companies/{}/timesheets", self.company_id),
            Scope::company(self.company_id),
        )
        .collect()
        .await
    }

    /// Create a timecard entry.
    ///
    /// Fails fast with [`ProcoreError::WrongParams`] when `hours` is
    /// missing, before issuing any network request.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid input or request failure.
    pub async fn create(&self, client: &ProcoreClient, entry: TimecardEntry) -> Result<Value> {
        let hours = entry.hours.ok_or_else(|| {
            ProcoreError::WrongParams("timecard entry requires 'hours'".to_string())
        })?;
        let date = entry
            .date
            .unwrap_or_else(|| Utc::now().date_naive().to_string());

        let mut body = json!({
            "timecard_entry": {
                "hours": hours,
                "date": date,
            }
        });
        let fields = &mut body["timecard_entry"];
        if let Some(party_id) = entry.party_id {
            fields["party_id"] = json!(party_id);
        }
        if let Some(cost_code_id) = entry.cost_code_id {
            fields["cost_code_id"] = json!(cost_code_id);
        }
        if let Some(description) = entry.description {
            fields["description"] = json!(description);
        }

        client
            .post(&self.list_path(), self.scope(), &[], Some(&body), None)
            .await
    }
}
