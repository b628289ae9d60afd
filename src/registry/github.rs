//! GitHub REST API implementation of `RemoteApi`
//!
//! Endpoints:
//! - `GET /repos/{owner}/{repo}/tags?per_page=100&page=N`
//! - `GET /repos/{owner}/{repo}/releases/latest`
//! - `GET /repos/{owner}/{repo}/git/ref/{tags|heads}/{name}`
//!
//! Pagination follows the `rel="next"` entry of the `Link` response header.

use super::{HttpClient, RemoteApi, RemoteTag, TagPage};
use crate::error::ResolveError;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

/// Default GitHub API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Tags requested per page
pub const PAGE_SIZE: u32 = 100;

// <https://api.github.com/repositories/1/tags?per_page=100&page=2>; rel="next"
static LINK_NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]*)>\s*;\s*rel="next""#).unwrap());

static PAGE_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]page=(\d+)").unwrap());

/// Tag listing entry
#[derive(Debug, Deserialize)]
struct TagResponse {
    name: String,
    commit: CommitResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
}

/// Latest release response
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    tag_name: Option<String>,
}

/// Git ref response
#[derive(Debug, Deserialize)]
struct RefResponse {
    object: GitObject,
}

/// Annotated tag object response
#[derive(Debug, Deserialize)]
struct AnnotatedTagResponse {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

/// GitHub client
pub struct GitHubClient {
    client: HttpClient,
    base_url: String,
}

impl GitHubClient {
    /// Create a client against the public GitHub API
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_API_URL)
    }

    /// Create a client against a custom API base URL
    pub fn with_base_url(client: HttpClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, owner, repo)
    }

    /// Follow an annotated tag object to the commit it points at
    async fn peel_tag(
        &self,
        owner: &str,
        repo: &str,
        object: GitObject,
    ) -> Result<String, ResolveError> {
        if object.kind != "tag" {
            return Ok(object.sha);
        }

        let repository = format!("{}/{}", owner, repo);
        let url = format!("{}/git/tags/{}", self.repo_url(owner, repo), object.sha);
        let tag: Option<AnnotatedTagResponse> =
            self.client.get_json_optional(&url, &repository).await?;

        // A tag object SHA is not a commit and must never be written as a pin.
        tag.map(|t| t.object.sha).ok_or_else(|| {
            ResolveError::invalid_response(
                &repository,
                format!("annotated tag object {} not found", object.sha),
            )
        })
    }
}

/// Extract the next page number from a `Link` header value
pub(crate) fn parse_next_page(link: &str) -> Option<u32> {
    let next_url = LINK_NEXT_RE.captures(link)?.get(1)?.as_str();
    PAGE_PARAM_RE
        .captures(next_url)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

#[async_trait]
impl RemoteApi for GitHubClient {
    async fn list_tags(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<TagPage, ResolveError> {
        let repository = format!("{}/{}", owner, repo);
        let url = format!(
            "{}/tags?per_page={}&page={}",
            self.repo_url(owner, repo),
            PAGE_SIZE,
            page
        );

        let response = self
            .client
            .get_optional(&url, &repository)
            .await?
            .ok_or_else(|| ResolveError::network(&repository, "repository not found"))?;

        let next_page = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_page);

        let tags: Vec<TagResponse> = HttpClient::parse_json(response, &repository).await?;
        debug!(%repository, page, count = tags.len(), ?next_page, "listed tags");

        Ok(TagPage {
            tags: tags
                .into_iter()
                .map(|t| RemoteTag::new(t.name, t.commit.sha))
                .collect(),
            next_page,
        })
    }

    async fn latest_release(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>, ResolveError> {
        let repository = format!("{}/{}", owner, repo);
        let url = format!("{}/releases/latest", self.repo_url(owner, repo));

        let release: Option<ReleaseResponse> =
            self.client.get_json_optional(&url, &repository).await?;

        Ok(release
            .and_then(|r| r.tag_name)
            .filter(|tag| !tag.is_empty()))
    }

    async fn get_ref(
        &self,
        owner: &str,
        repo: &str,
        qualified_ref: &str,
    ) -> Result<Option<String>, ResolveError> {
        let repository = format!("{}/{}", owner, repo);
        let short = qualified_ref.strip_prefix("refs/").unwrap_or(qualified_ref);
        let url = format!("{}/git/ref/{}", self.repo_url(owner, repo), short);

        let git_ref: Option<RefResponse> =
            self.client.get_json_optional(&url, &repository).await?;

        match git_ref {
            Some(r) => self.peel_tag(owner, repo, r.object).await.map(Some),
            None => Ok(None),
        }
    }
}
