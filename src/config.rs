//! Client configuration.
//!
//! All connection policy is explicit here; nothing is read from ambient
//! process state except through [`ProcoreConfig::from_env`].

use std::env;
use std::time::Duration;

use crate::error::{ProcoreError, Result};
use crate::pagination::PageFetch;

const DEFAULT_BASE_URL: &str = "https://api.procore.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a [`ProcoreClient`](crate::ProcoreClient).
///
/// # Example
///
/// ```no_run
/// use procore_api::ProcoreConfig;
///
/// let config = ProcoreConfig::new("client-id", "client-secret", "https://sandbox.procore.com");
/// ```
#[derive(Debug, Clone)]
pub struct ProcoreConfig {
    /// OAuth2 app client identifier.
    pub client_id: String,
    /// OAuth2 app client secret.
    pub client_secret: String,
    /// Redirect URI for the token exchange. Empty for the client
    /// credentials grant.
    pub redirect_uri: String,
    /// Base URL for REST endpoints and the token exchange.
    pub base_url: String,
    /// Per-request timeout applied by the underlying HTTP client.
    pub timeout: Duration,
    /// Retry behavior. Off by default to preserve call parity.
    pub retry: RetryPolicy,
    /// How list operations fetch pages.
    pub page_fetch: PageFetch,
}

impl ProcoreConfig {
    /// Create a configuration with default policy (no retries, sequential
    /// page fetches, 300 second timeout).
    pub fn new(client_id: &str, client_secret: &str, base_url: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: String::new(),
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            page_fetch: PageFetch::default(),
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Uses `PROCORE_CLIENT_ID` and `PROCORE_CLIENT_SECRET` for the token
    /// exchange, and optionally `PROCORE_BASE_URL` (defaults to
    /// `https://api.procore.com`) and `PROCORE_REDIRECT_URI`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcoreError::ConfigMissing`] if a required variable is
    /// not set.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("PROCORE_CLIENT_ID").map_err(|_| {
            ProcoreError::ConfigMissing("PROCORE_CLIENT_ID environment variable not set".into())
        })?;
        let client_secret = env::var("PROCORE_CLIENT_SECRET").map_err(|_| {
            ProcoreError::ConfigMissing(
                "PROCORE_CLIENT_SECRET environment variable not set".into(),
            )
        })?;
        let base_url =
            env::var("PROCORE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(&client_id, &client_secret, &base_url);
        if let Ok(redirect_uri) = env::var("PROCORE_REDIRECT_URI") {
            config.redirect_uri = redirect_uri;
        }
        Ok(config)
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the page fetch mode.
    #[must_use]
    pub fn with_page_fetch(mut self, page_fetch: PageFetch) -> Self {
        self.page_fetch = page_fetch;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Retry behavior for transport failures.
///
/// Both knobs default to off so that the sequence of requests matches the
/// remote API's expectations exactly unless a caller opts in.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    /// Bounded retries with exponential backoff for idempotent GETs that
    /// fail with a transient transport error (connect/timeout).
    pub max_transient_retries: u32,
    /// Re-run the token exchange and retry once when a request fails with
    /// an expired token (HTTP 498).
    pub refresh_on_expired: bool,
}
