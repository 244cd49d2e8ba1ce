//! Error types for Procore API operations.

use thiserror::Error;

/// Errors that can occur during Procore API operations.
///
/// Each HTTP failure variant carries the raw response body so callers can
/// inspect the server's diagnostics.
#[derive(Debug, Error)]
pub enum ProcoreError {
    /// Configuration is missing or incomplete.
    #[error("Procore configuration required: {0}")]
    ConfigMissing(String),

    /// Wrong client secret and/or access token (HTTP 401).
    #[error("401: wrong client secret and/or access token")]
    UnauthorizedClient { body: String },

    /// The app or permission template lacks access to the endpoint (HTTP 403).
    #[error("403: insufficient privilege for this endpoint")]
    NoPrivilege { body: String },

    /// Client ID or endpoint does not exist (HTTP 404).
    #[error("404: client ID or endpoint does not exist")]
    NotFoundClient { body: String },

    /// A field that needs a unique value already exists (HTTP 422).
    #[error("422: a field that needs a unique value already exists")]
    UnprocessableContent { body: String },

    /// Expired access token (HTTP 498).
    #[error("498: expired access token")]
    ExpiredToken { body: String },

    /// Remote server failure (HTTP 500).
    #[error("500: internal server error")]
    InternalServer { body: String },

    /// Any other non-2xx response.
    #[error("Procore API error {status}: {body}")]
    Api { status: u16, body: String },

    /// A local lookup exhausted the collection without a match.
    #[error("could not find {entity} '{identifier}'")]
    NotFoundItem {
        entity: &'static str,
        identifier: String,
    },

    /// Request parameters failed local validation before any network call.
    #[error("wrong parameters: {0}")]
    WrongParams(String),

    /// A pagination loop exceeded its page cap.
    #[error("pagination exceeded {max_pages} pages without terminating")]
    PaginationLimit { max_pages: u32 },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local I/O error (file uploads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcoreError {
    /// The raw response body for HTTP failure variants, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::UnauthorizedClient { body }
            | Self::NoPrivilege { body }
            | Self::NotFoundClient { body }
            | Self::UnprocessableContent { body }
            | Self::ExpiredToken { body }
            | Self::InternalServer { body }
            | Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The HTTP status that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnauthorizedClient { .. } => Some(401),
            Self::NoPrivilege { .. } => Some(403),
            Self::NotFoundClient { .. } => Some(404),
            Self::UnprocessableContent { .. } => Some(422),
            Self::ExpiredToken { .. } => Some(498),
            Self::InternalServer { .. } => Some(500),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a non-success HTTP status to its error kind, carrying the raw body.
pub(crate) fn status_error(status: u16, body: String) -> ProcoreError {
    match status {
        401 => ProcoreError::UnauthorizedClient { body },
        403 => ProcoreError::NoPrivilege { body },
        404 => ProcoreError::NotFoundClient { body },
        422 => ProcoreError::UnprocessableContent { body },
        498 => ProcoreError::ExpiredToken { body },
        500 => ProcoreError::InternalServer { body },
        status => ProcoreError::Api { status, body },
    }
}

/// Result type alias for Procore operations.
pub type Result<T> = core::result::Result<T, ProcoreError>;
