//! Procore API client library.
//!
//! A Rust library for the Procore construction-management REST API. The
//! remote payloads are passed through as opaque JSON; what the library
//! provides is the shared access machinery every resource needs:
//!
//! - a transport layer that attaches bearer-token and tenant-scoping
//!   headers and maps failures onto a typed error taxonomy,
//! - an exhaustive pagination protocol (sequential by default, optionally
//!   concurrent),
//! - find-by-flexible-identifier resolution, where an [`Identifier`] is a
//!   numeric ID, a name-like string, or an email address,
//! - a fuzzy search variant for documents.
//!
//! # Quick Start
//!
//! ```no_run
//! use procore_api::{Companies, FindResource, ListResource, ProcoreClient, Projects};
//!
//! #[tokio::main]
//! async fn main() -> procore_api::Result<()> {
//!     // Runs the OAuth2 client-credentials exchange once
//!     let client = ProcoreClient::from_env().await?;
//!
//!     // Find a company by ID or by name
//!     let company = Companies.find(&client, "Acme Construction").await?;
//!     let company_id = company["id"].as_u64().unwrap_or_default();
//!
//!     // List every project in it
//!     let projects = Projects { company_id }.list(&client).await?;
//!     println!("found {} projects", projects.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Resource types are small config structs implementing three traits:
//!
//! - [`ListResource`] - exhaustive pagination over a collection endpoint
//! - [`ShowResource`] - single-item detail fetches
//! - [`FindResource`] - identifier resolution, list-then-show where the
//!   listing is abbreviated
//!
//! The pagination and resolution protocols are implemented once in the
//! traits' provided methods; each resource only supplies paths, key maps,
//! and query parameters.
//!
//! # Configuration
//!
//! [`ProcoreConfig::from_env`] reads `PROCORE_CLIENT_ID`,
//! `PROCORE_CLIENT_SECRET`, and optionally `PROCORE_BASE_URL` and
//! `PROCORE_REDIRECT_URI`. Retry behavior and concurrent page fetching
//! are explicit opt-ins on [`ProcoreConfig`].

mod client;
mod config;
mod error;
mod fuzzy;
mod identifier;
mod pagination;
mod resources;

// Re-export core types
pub use client::{FilePart, FileUpdate, ProcoreClient, Scope};
pub use config::{ProcoreConfig, RetryPolicy};
pub use error::{ProcoreError, Result};
pub use identifier::{EmailKey, Identifier, KeyMap};
pub use pagination::{PageFetch, DEFAULT_PER_PAGE, MAX_PAGES};

// Re-export resource traits
pub use resources::{FindResource, ListResource, ShowResource};

// Re-export resources
pub use resources::{
    Companies, FileUpdateParams, Files, Folders, Projects, Rfis, TimecardEntry, Timecards, Users,
};
