//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable per-request timeout and User-Agent
//! - GitHub JSON media type and optional bearer token on every request
//! - Status mapping into `ResolveError` (no automatic retries)

use crate::error::ResolveError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default timeout for each HTTP request (10 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("github-ci/", env!("CARGO_PKG_VERSION"));

/// GitHub REST media type
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    authenticated: bool,
}

impl HttpClient {
    /// Create a new anonymous HTTP client with default settings
    pub fn new() -> Result<Self, ResolveError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, None)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(
        timeout: Duration,
        user_agent: &str,
        token: Option<&str>,
    ) -> Result<Self, ResolveError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ResolveError::network("HTTP client", format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ResolveError::network(
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            authenticated: token.is_some(),
        })
    }

    /// Returns true if requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Perform a GET request
    ///
    /// Returns `Ok(None)` for 404 so callers can treat absence as a value.
    pub async fn get_optional(
        &self,
        url: &str,
        repository: &str,
    ) -> Result<Option<Response>, ResolveError> {
        debug!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::timeout(repository)
            } else {
                ResolveError::network(repository, e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url, "not found");
            return Ok(None);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ResolveError::rate_limit_exceeded(repository));
        }

        if !status.is_success() {
            return Err(ResolveError::network(
                repository,
                format!("HTTP {}", status),
            ));
        }

        Ok(Some(response))
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        repository: &str,
    ) -> Result<Option<T>, ResolveError> {
        match self.get_optional(url, repository).await? {
            Some(response) => Self::parse_json(response, repository).await.map(Some),
            None => Ok(None),
        }
    }

    /// Decode a JSON response body
    pub async fn parse_json<T: serde::de::DeserializeOwned>(
        response: Response,
        repository: &str,
    ) -> Result<T, ResolveError> {
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::timeout(repository)
            } else {
                ResolveError::invalid_response(repository, format!("failed to parse JSON: {}", e))
            }
        })
    }
}
