//! Procore API client.
//!
//! Low-level HTTP transport that handles the OAuth2 token exchange,
//! authentication and tenant-scoping headers, JSON/multipart encoding, and
//! the error-taxonomy mapping. Resource operations are implemented via the
//! traits in [`crate::resources`].

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use crate::config::{ProcoreConfig, RetryPolicy};
use crate::error::{status_error, ProcoreError, Result};
use crate::pagination::PageFetch;

const USER_AGENT: &str = concat!("procore-api/", env!("CARGO_PKG_VERSION"));
const COMPANY_HEADER: &str = "Procore-Company-Id";
const BACKOFF_START_MS: u64 = 250;

/// Tenant scope for a request.
///
/// Most endpoints require a `Procore-Company-Id` header identifying the
/// company the request applies to.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope {
    /// Company to scope the request to, sent as `Procore-Company-Id`.
    pub company_id: Option<u64>,
}

impl Scope {
    /// Scope a request to a company.
    #[must_use]
    pub fn company(company_id: u64) -> Self {
        Self {
            company_id: Some(company_id),
        }
    }
}

/// One binary attachment for a multipart request.
///
/// The bytes are read eagerly so no file handle outlives the call that
/// produced it; retried requests rebuild the form from these bytes.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name, e.g. `file[data]`.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Read a file from disk into a part.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(field: &str, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self {
            field: field.to_string(),
            file_name,
            bytes,
        })
    }
}

/// How a PATCH on a file-bearing resource treats the attached file.
#[derive(Debug, Clone)]
pub enum FileUpdate {
    /// No file is involved; the body is sent as JSON.
    NoFiles,
    /// Patch metadata with multipart form fields, leaving the attached
    /// file untouched.
    KeepExisting,
    /// Replace the attached file content with the given parts.
    Replace(Vec<FilePart>),
}

#[derive(Debug)]
struct AuthCredentials {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

/// Low-level Procore API client.
///
/// Holds the access token for the session. The token is replaced wholesale
/// by [`reset_access_token`](Self::reset_access_token); requests snapshot
/// it before use, so an in-flight request completes with the token it
/// started with.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the token.
///
/// # Example
///
/// ```no_run
/// use procore_api::{ProcoreClient, ProcoreConfig};
///
/// # async fn example() -> procore_api::Result<()> {
/// // Run the client-credentials token exchange once at startup
/// let client = ProcoreClient::connect(ProcoreConfig::from_env()?).await?;
///
/// // Or wrap a token acquired elsewhere
/// let client = ProcoreClient::with_token("token", "https://sandbox.procore.com")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProcoreClient {
    http: Client,
    base_url: Arc<Url>,
    auth: Option<Arc<AuthCredentials>>,
    token: Arc<RwLock<Arc<str>>>,
    retry: RetryPolicy,
    page_fetch: PageFetch,
}

impl std::fmt::Debug for ProcoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcoreClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ProcoreClient {
    /// Create a client and acquire an access token via the OAuth2
    /// client-credentials exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the token exchange
    /// fails.
    pub async fn connect(config: ProcoreConfig) -> Result<Self> {
        let auth = AuthCredentials {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        };
        let client = Self::build(&config, Some(auth), "")?;
        client.reset_access_token().await?;
        Ok(client)
    }

    /// Create a client from environment variables and acquire a token.
    ///
    /// See [`ProcoreConfig::from_env`] for the variables used.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or the token
    /// exchange fails.
    pub async fn from_env() -> Result<Self> {
        Self::connect(ProcoreConfig::from_env()?).await
    }

    /// Create a client around a pre-acquired access token.
    ///
    /// Such a client cannot refresh its token;
    /// [`reset_access_token`](Self::reset_access_token) returns
    /// [`ProcoreError::ConfigMissing`].
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_token(token: &str, base_url: &str) -> Result<Self> {
        let config = ProcoreConfig::new("", "", base_url);
        Self::build(&config, None, token)
    }

    /// Create a client around a pre-acquired token with explicit policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_token_and_config(token: &str, config: &ProcoreConfig) -> Result<Self> {
        Self::build(config, None, token)
    }

    fn build(config: &ProcoreConfig, auth: Option<AuthCredentials>, token: &str) -> Result<Self> {
        // Ensure base URL ends with / so joins keep any path prefix
        let base_url_str = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .build()
            .map_err(ProcoreError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            auth: auth.map(Arc::new),
            token: Arc::new(RwLock::new(Arc::from(token))),
            retry: config.retry,
            page_fetch: config.page_fetch,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured page fetch mode for list operations.
    pub(crate) fn page_fetch(&self) -> PageFetch {
        self.page_fetch
    }

    /// Re-run the token exchange and replace the held access token.
    ///
    /// In-flight requests keep the token they snapshotted; only requests
    /// issued after this call see the new one.
    ///
    /// # Errors
    ///
    /// Returns [`ProcoreError::ConfigMissing`] if the client was built
    /// around a pre-acquired token, or any exchange failure.
    #[tracing::instrument(skip(self))]
    pub async fn reset_access_token(&self) -> Result<()> {
        let auth = self.auth.as_deref().ok_or_else(|| {
            ProcoreError::ConfigMissing(
                "client credentials are required to refresh the access token".into(),
            )
        })?;
        let token = self.fetch_access_token(auth).await?;
        *self.token.write().await = token;
        Ok(())
    }

    async fn fetch_access_token(&self, auth: &AuthCredentials) -> Result<Arc<str>> {
        let url = self.base_url.join("oauth/token")?;
        let form = [
            ("grant_type", "client_credentials"),
            ("redirect_uri", auth.redirect_uri.as_str()),
        ];
        let response = self
            .http
            .post(url)
            .basic_auth(&auth.client_id, Some(&auth.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(ProcoreError::Http)?;
        let response = Self::check(response).await?;
        let body: TokenResponse = response.json().await.map_err(ProcoreError::Http)?;
        Ok(Arc::from(body.access_token))
    }

    async fn token_snapshot(&self) -> Arc<str> {
        self.token.read().await.clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn apply_scope(request: RequestBuilder, scope: Scope) -> RequestBuilder {
        match scope.company_id {
            Some(company_id) => request.header(COMPANY_HEADER, company_id.to_string()),
            None => request,
        }
    }

    /// Make a GET request.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any non-2xx response.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str, scope: Scope) -> Result<Value> {
        self.get_with_query(path, scope, &[] as &[(&str, &str)])
            .await
    }

    /// Make a GET request with query parameters.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any non-2xx response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        scope: Scope,
        query: &Q,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let response = self
            .execute(true, |token| {
                Self::apply_scope(self.http.get(url.clone()).bearer_auth(token), scope)
                    .query(query)
            })
            .await?;
        Ok(response.json().await.map_err(ProcoreError::Http)?)
    }

    /// Make a POST request.
    ///
    /// With `files` absent the body is serialized as JSON with
    /// `Content-Type: application/json`. With `files` present the request
    /// is multipart form data instead: the body's top-level fields are sent
    /// as flat form fields alongside the file parts, so callers flatten
    /// nested data into bracketed keys (e.g. `file[name]`) beforehand.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any non-2xx response.
    #[tracing::instrument(skip(self, body, files))]
    pub async fn post(
        &self,
        path: &str,
        scope: Scope,
        params: &[(String, String)],
        body: Option<&Value>,
        files: Option<&[FilePart]>,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let response = self
            .execute(false, |token| {
                let request = Self::apply_scope(
                    self.http.post(url.clone()).bearer_auth(token),
                    scope,
                )
                .query(params);
                match files {
                    None => json_body(request, body),
                    Some(files) => request.multipart(build_form(body, files)),
                }
            })
            .await?;
        Ok(response.json().await.map_err(ProcoreError::Http)?)
    }

    /// Make a PATCH request.
    ///
    /// Dispatch follows `upload`: [`FileUpdate::NoFiles`] sends the body as
    /// JSON; [`FileUpdate::KeepExisting`] sends multipart form fields with
    /// no file part (metadata-only patch of a file-bearing resource);
    /// [`FileUpdate::Replace`] sends multipart form fields plus the
    /// replacement file parts.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any non-2xx response.
    #[tracing::instrument(skip(self, body, upload))]
    pub async fn patch(
        &self,
        path: &str,
        scope: Scope,
        params: &[(String, String)],
        body: Option<&Value>,
        upload: &FileUpdate,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let response = self
            .execute(false, |token| {
                let request = Self::apply_scope(
                    self.http.patch(url.clone()).bearer_auth(token),
                    scope,
                )
                .query(params);
                match upload {
                    FileUpdate::NoFiles => json_body(request, body),
                    FileUpdate::KeepExisting => request.multipart(build_form(body, &[])),
                    FileUpdate::Replace(files) => request.multipart(build_form(body, files)),
                }
            })
            .await?;
        Ok(response.json().await.map_err(ProcoreError::Http)?)
    }

    /// Make a DELETE request, returning the response status.
    ///
    /// # Errors
    ///
    /// Returns the mapped error for any non-2xx response.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        path: &str,
        scope: Scope,
        params: &[(String, String)],
    ) -> Result<StatusCode> {
        let url = self.endpoint(path)?;
        let response = self
            .execute(false, |token| {
                Self::apply_scope(self.http.delete(url.clone()).bearer_auth(token), scope)
                    .query(params)
            })
            .await?;
        Ok(response.status())
    }

    /// Send a request, applying the retry policy.
    ///
    /// `build` is invoked once per attempt with a fresh token snapshot.
    /// Transient transport failures are retried with backoff only for
    /// idempotent requests; an expired-token response triggers at most one
    /// refresh-and-retry when enabled.
    async fn execute<F>(&self, idempotent: bool, build: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let mut transient_left = if idempotent {
            self.retry.max_transient_retries
        } else {
            0
        };
        let mut backoff = std::time::Duration::from_millis(BACKOFF_START_MS);
        let mut refreshed = false;

        loop {
            let token = self.token_snapshot().await;
            match build(&token).send().await {
                Err(err) if transient_left > 0 && is_transient(&err) => {
                    transient_left -= 1;
                    tracing::warn!(error = %err, "transient transport error, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => return Err(ProcoreError::Http(err)),
                Ok(response) => match Self::check(response).await {
                    Err(err) => {
                        let expired = matches!(err, ProcoreError::ExpiredToken { .. });
                        if expired
                            && self.retry.refresh_on_expired
                            && !refreshed
                            && self.auth.is_some()
                        {
                            refreshed = true;
                            tracing::warn!("access token expired, refreshing and retrying");
                            self.reset_access_token().await?;
                            continue;
                        }
                        return Err(err);
                    }
                    Ok(response) => return Ok(response),
                },
            }
        }
    }

    /// Check response status and convert failures to the error taxonomy.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), body))
    }
}

/// Attach a JSON body, or just the content type when there is none.
fn json_body(request: RequestBuilder, body: Option<&Value>) -> RequestBuilder {
    match body {
        Some(body) => request.json(body),
        None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Build a multipart form from flat body fields plus file parts.
///
/// Only string values are sent verbatim; everything else is serialized
/// compactly, which matches how bracketed form keys carry list-valued
/// nested fields when the API accepts them.
fn build_form(body: Option<&Value>, files: &[FilePart]) -> Form {
    let mut form = Form::new();
    if let Some(Value::Object(fields)) = body {
        for (key, value) in fields {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            form = form.text(key.clone(), text);
        }
    }
    for part in files {
        form = form.part(
            part.field.clone(),
            Part::bytes(part.bytes.clone()).file_name(part.file_name.clone()),
        );
    }
    form
}
