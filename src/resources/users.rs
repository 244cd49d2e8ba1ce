//! Directory users at the company or project level.

use async_trait::async_trait;

use crate::client::Scope;
use crate::identifier::{EmailKey, KeyMap};
use crate::resources::{FindResource, ListResource, ShowResource};

/// Directory access for users.
///
/// With `project_id` set, operations address the project directory;
/// otherwise the company directory. Email identifiers resolve via the
/// nested `contact.email` field, so
/// `users.find(&client, "jane@example.com")` works even when the `name`
/// field does not match.
#[derive(Debug, Clone, Copy)]
pub struct Users {
    /// Company the directory belongs to.
    pub company_id: u64,
    /// Project scope; `None` addresses the company-level directory.
    pub project_id: Option<u64>,
}

impl Users {
    /// Company-level directory access.
    #[must_use]
    pub fn company(company_id: u64) -> Self {
        Self {
            company_id,
            project_id: None,
        }
    }

    /// Project-level directory access.
    #[must_use]
    pub fn project(company_id: u64, project_id: u64) -> Self {
        Self {
            company_id,
            project_id: Some(project_id),
        }
    }
}

#[async_trait]
impl ListResource for Users {
    const ENTITY: &'static str = "user";

    fn list_path(&self) -> String {
        match self.project_id {
            Some(project_id) => format!("/rest/v1.0/projects/{project_id}/users"),
            None => format!("/rest/v1.1/companies/{}/users", self.company_id),
        }
    }

    fn scope(&self) -> Scope {
        Scope::company(self.company_id)
    }

    fn per_page(&self) -> u32 {
        1000
    }

    // Only company vendors actually read this, but sending it on the other
    // directory listings is harmless.
    fn extra_params(&self) -> Vec<(String, String)> {
        vec![("company_id".to_string(), self.company_id.to_string())]
    }
}

#[async_trait]
impl ShowResource for Users {
    fn show_path(&self, id: u64) -> String {
        match self.project_id {
            Some(project_id) => format!("/rest/v1.0/projects/{project_id}/users/{id}"),
            None => format!("/rest/v1.3/companies/{}/users/{id}", self.company_id),
        }
    }
}

#[async_trait]
impl FindResource for Users {
    fn keys(&self) -> KeyMap {
        KeyMap {
            email: Some(EmailKey::Nested("contact", "email")),
            ..KeyMap::default()
        }
    }
}
