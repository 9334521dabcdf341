//! Authenticated GitHub API client.
//!
//! The transport is a trait so the client and everything above it can be
//! exercised against canned responses; the production implementation wraps a
//! blocking reqwest client with no retries and default timeouts.

use crate::credentials::Credentials;
use crate::error::GooseError;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default API base for repository metadata lookups.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Raw outcome of an outbound call: status code plus body text. The caller
/// decides what a given status means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Whether the remote accepted the call (HTTP 200).
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, GooseError> {
        serde_json::from_str(&self.body)
            .map_err(|e| GooseError::transport(format!("response body is not JSON: {e}"), e))
    }
}

/// Blocking transport for outbound GitHub calls.
pub trait StatusTransport: Send + Sync + std::fmt::Debug {
    fn post(&self, url: &str, body: &Value) -> Result<ApiResponse, GooseError>;
    fn get(&self, url: &str) -> Result<ApiResponse, GooseError>;
}

/// Production transport backed by `reqwest::blocking`. Attaches a Basic auth
/// header when credentials are present; otherwise warns once per call and
/// proceeds unauthenticated.
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            credentials,
        }
    }

    fn apply_auth(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.credentials {
            Some(creds) => req.header(reqwest::header::AUTHORIZATION, creds.auth_header()),
            None => {
                warn!("not authenticating request, unknown github credentials");
                req
            }
        }
    }

    fn read(resp: reqwest::blocking::Response) -> Result<ApiResponse, GooseError> {
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| GooseError::transport(format!("failed to read response body: {e}"), e))?;
        Ok(ApiResponse { status, body })
    }
}

impl StatusTransport for HttpTransport {
    fn post(&self, url: &str, body: &Value) -> Result<ApiResponse, GooseError> {
        let resp = self
            .apply_auth(self.http.post(url))
            .json(body)
            .send()
            .map_err(|e| GooseError::transport(format!("POST {url} failed: {e}"), e))?;
        Self::read(resp)
    }

    fn get(&self, url: &str) -> Result<ApiResponse, GooseError> {
        let resp = self
            .apply_auth(self.http.get(url))
            .send()
            .map_err(|e| GooseError::transport(format!("GET {url} failed: {e}"), e))?;
        Self::read(resp)
    }
}

/// Thin authenticated wrapper over the transport, shared by the reporter and
/// the per-event handlers.
#[derive(Debug, Clone)]
pub struct GithubClient {
    transport: Arc<dyn StatusTransport>,
    api_base: String,
}

impl GithubClient {
    /// Client with the production transport and default API base.
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(credentials)), DEFAULT_API_BASE)
    }

    /// Client over an injected transport. Used by tests and by deployments
    /// targeting an enterprise API base.
    pub fn with_transport(
        transport: Arc<dyn StatusTransport>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            api_base: api_base.into(),
        }
    }

    /// POST a JSON body, returning the raw response. No retries.
    pub fn post(&self, url: &str, body: &Value) -> Result<ApiResponse, GooseError> {
        debug!("github request: {body} to {url}");
        self.transport.post(url, body)
    }

    /// GET a URL and parse the body as JSON.
    pub fn get_json(&self, url: &str) -> Result<Value, GooseError> {
        self.transport.get(url)?.json()
    }

    /// Default branch name from the repository metadata endpoint.
    pub fn default_branch(&self, owner: &str, repo: &str) -> Result<String, GooseError> {
        let url = format!("{}/repos/{owner}/{repo}", self.api_base);
        let data = self.get_json(&url)?;
        data.get("default_branch")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                GooseError::api(format!("no default_branch in metadata for {owner}/{repo}"))
            })
    }

    /// Fetch a pull-request payload at a caller-supplied URL, untyped beyond
    /// "a JSON mapping".
    pub fn pull_request(&self, pr_url: &str) -> Result<Value, GooseError> {
        self.get_json(pr_url)
    }
}
