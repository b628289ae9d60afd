//! Remote repository API for resolving action versions
//!
//! This module provides:
//! - HTTP client shared foundation
//! - The `RemoteApi` seam consumed by the resolver
//! - GitHub REST implementation with Link-header pagination

mod client;
mod github;

pub use client::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use github::{GitHubClient, DEFAULT_API_URL, PAGE_SIZE};

use crate::error::ResolveError;
use async_trait::async_trait;

/// A tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTag {
    /// Tag name (`v4.1.7`)
    pub name: String,
    /// Commit SHA
    pub commit_sha: String,
}

impl RemoteTag {
    /// Creates a new tag entry
    pub fn new(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_sha: commit_sha.into(),
        }
    }
}

/// One page of a tag listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPage {
    /// Tags on this page
    pub tags: Vec<RemoteTag>,
    /// Next page number, if the provider reports one
    pub next_page: Option<u32>,
}

/// Operations the resolver needs from a repository host
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// List one page of tags (pages start at 1)
    async fn list_tags(&self, owner: &str, repo: &str, page: u32)
        -> Result<TagPage, ResolveError>;

    /// Tag name of the latest release, or `None` if the repository has none
    async fn latest_release(&self, owner: &str, repo: &str)
        -> Result<Option<String>, ResolveError>;

    /// Commit SHA for a fully qualified ref (`refs/tags/v4`), or `None` if absent
    async fn get_ref(
        &self,
        owner: &str,
        repo: &str,
        qualified_ref: &str,
    ) -> Result<Option<String>, ResolveError>;
}
