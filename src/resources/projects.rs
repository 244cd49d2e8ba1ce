//! Projects within a company.

use async_trait::async_trait;

use crate::client::Scope;
use crate::resources::{FindResource, ListResource};

/// Project-level access for one company.
#[derive(Debug, Clone, Copy)]
pub struct Projects {
    /// Company the projects belong to.
    pub company_id: u64,
}

#[async_trait]
impl ListResource for Projects {
    const ENTITY: &'static str = "project";

    fn list_path(&self) -> String {
        "/rest/v1.1/projects".to_string()
    }

    // The project listing takes the company as a query parameter rather
    // than a tenant header.
    fn scope(&self) -> Scope {
        Scope::default()
    }

    fn extra_params(&self) -> Vec<(String, String)> {
        vec![("company_id".to_string(), self.company_id.to_string())]
    }
}

#[async_trait]
impl FindResource for Projects {}
