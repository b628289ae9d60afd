//! Version resolution against a remote repository host
//!
//! This module provides:
//! - The `Resolver` seam consumed by the upgrade engine
//! - `ActionResolver`, which answers lookups from paginated tag listings,
//!   the latest-release shortcut and ref lookups, memoized in `ResultCache`

mod cache;

pub use cache::{CacheStats, ResultCache, VersionKey, VersionResult};

use crate::error::ResolveError;
use crate::registry::{RemoteApi, RemoteTag};
use crate::version;
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::Mutex;
use tracing::debug;

/// Version lookups used by the upgrade engine
///
/// Tuple results are `(tag, commit_sha)`.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a tag, branch or major-only ref to a commit SHA
    async fn get_commit_hash(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<String, ResolveError>;

    /// Latest tag satisfying `pattern`
    async fn get_latest_version(
        &self,
        owner: &str,
        repo: &str,
        current_version: &str,
        pattern: &str,
    ) -> Result<(String, String), ResolveError>;

    /// Latest tag overall
    async fn get_latest_version_unconstrained(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<(String, String), ResolveError>;

    /// First tag pointing at `commit_sha`, if any
    async fn get_tag_for_commit(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> Result<Option<String>, ResolveError>;

    /// Latest `vN` or `vN.*` tag for a major version
    async fn get_latest_minor_version(
        &self,
        owner: &str,
        repo: &str,
        major: &str,
    ) -> Result<(String, String), ResolveError>;

    /// Cache counters so far
    async fn cache_stats(&self) -> CacheStats;
}

/// Pick the greatest tag by version order; the first one wins ties
fn select_latest<'a>(tags: impl IntoIterator<Item = &'a RemoteTag>) -> Option<&'a RemoteTag> {
    tags.into_iter().fold(None, |latest, tag| match latest {
        Some(current) if version::compare(&tag.name, &current.name) != Ordering::Greater => {
            Some(current)
        }
        _ => Some(tag),
    })
}

/// `Resolver` backed by a `RemoteApi`
pub struct ActionResolver<A: RemoteApi> {
    api: A,
    cache: Mutex<ResultCache>,
}

impl<A: RemoteApi> ActionResolver<A> {
    /// Create a resolver with an empty cache
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: Mutex::new(ResultCache::new()),
        }
    }

    /// The underlying remote API
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Drop all cached results
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Fetch every tag of a repository
    ///
    /// Any page failure aborts the listing; partial results are never used.
    async fn fetch_all_tags(&self, owner: &str, repo: &str) -> Result<Vec<RemoteTag>, ResolveError> {
        let mut tags = Vec::new();
        let mut page = 1;

        loop {
            let result = self.api.list_tags(owner, repo, page).await?;
            tags.extend(result.tags);

            match result.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        debug!(owner, repo, count = tags.len(), "fetched all tags");
        Ok(tags)
    }

    /// Unconstrained lookup through the latest-release endpoint
    async fn try_latest_release(&self, owner: &str, repo: &str) -> Option<(String, String)> {
        let tag = match self.api.latest_release(owner, repo).await {
            Ok(Some(tag)) => tag,
            Ok(None) => {
                debug!(owner, repo, "no releases, falling back to tags");
                return None;
            }
            Err(e) => {
                debug!(owner, repo, error = %e, "latest release lookup failed");
                return None;
            }
        };

        match self.get_commit_hash(owner, repo, &tag).await {
            Ok(hash) => Some((tag, hash)),
            Err(e) => {
                debug!(owner, repo, tag = %tag, error = %e, "cannot resolve release tag");
                None
            }
        }
    }

    async fn latest_from_tags(&self, owner: &str, repo: &str) -> Result<(String, String), ResolveError> {
        let tags = self.fetch_all_tags(owner, repo).await?;
        select_latest(&tags)
            .map(|t| (t.name.clone(), t.commit_sha.clone()))
            .ok_or_else(|| ResolveError::no_tags_found(format!("{}/{}", owner, repo)))
    }
}

#[async_trait]
impl<A: RemoteApi> Resolver for ActionResolver<A> {
    async fn get_commit_hash(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<String, ResolveError> {
        if version::is_commit_hash(git_ref) {
            return Ok(git_ref.to_string());
        }

        let git_ref = git_ref.strip_prefix("refs/").unwrap_or(git_ref);

        if version::is_major_version_only(git_ref) {
            match self.get_latest_minor_version(owner, repo, git_ref).await {
                Ok((_, hash)) => return Ok(hash),
                Err(e) => debug!(owner, repo, git_ref, error = %e, "no release under major"),
            }
        }

        match self
            .api
            .get_ref(owner, repo, &format!("refs/tags/{}", git_ref))
            .await
        {
            Ok(Some(sha)) => return Ok(sha),
            Ok(None) => {}
            Err(e) => debug!(owner, repo, git_ref, error = %e, "tag lookup failed"),
        }

        self.api
            .get_ref(owner, repo, &format!("refs/heads/{}", git_ref))
            .await?
            .ok_or_else(|| ResolveError::ref_not_found(format!("{}/{}", owner, repo), git_ref))
    }

    async fn get_latest_version(
        &self,
        owner: &str,
        repo: &str,
        current_version: &str,
        pattern: &str,
    ) -> Result<(String, String), ResolveError> {
        let key = VersionKey::constrained(owner, repo, current_version, pattern);

        if let Some(cached) = self.cache.lock().await.get_constrained(&key) {
            debug!(%key, "cache hit");
            return cached.into_result();
        }

        let result = self.fetch_all_tags(owner, repo).await.and_then(|tags| {
            let matching = tags
                .iter()
                .filter(|t| version::matches_constraint(&t.name, pattern));
            select_latest(matching)
                .map(|t| (t.name.clone(), t.commit_sha.clone()))
                .ok_or_else(|| ResolveError::no_matching_tags(format!("{}/{}", owner, repo), pattern))
        });

        if let Some(entry) = VersionResult::from_result(&result) {
            self.cache.lock().await.set_constrained(key, entry);
        }
        result
    }

    async fn get_latest_version_unconstrained(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<(String, String), ResolveError> {
        let key = VersionKey::unconstrained(owner, repo);

        if let Some(cached) = self.cache.lock().await.get_unconstrained(&key) {
            debug!(%key, "cache hit");
            return cached.into_result();
        }

        let result = match self.try_latest_release(owner, repo).await {
            Some(found) => Ok(found),
            None => self.latest_from_tags(owner, repo).await,
        };

        if let Some(entry) = VersionResult::from_result(&result) {
            self.cache.lock().await.set_unconstrained(key, entry);
        }
        result
    }

    async fn get_tag_for_commit(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> Result<Option<String>, ResolveError> {
        let mut page = 1;

        loop {
            let result = self.api.list_tags(owner, repo, page).await?;
            if let Some(tag) = result.tags.into_iter().find(|t| t.commit_sha == commit_sha) {
                return Ok(Some(tag.name));
            }

            match result.next_page {
                Some(next) if next > page => page = next,
                _ => return Ok(None),
            }
        }
    }

    async fn get_latest_minor_version(
        &self,
        owner: &str,
        repo: &str,
        major: &str,
    ) -> Result<(String, String), ResolveError> {
        let major = version::normalize(major);
        let exact = format!("v{}", major);
        let prefix = format!("v{}.", major);

        let tags = self.fetch_all_tags(owner, repo).await?;
        let matching = tags
            .iter()
            .filter(|t| t.name == exact || t.name.starts_with(&prefix));

        select_latest(matching)
            .map(|t| (t.name.clone(), t.commit_sha.clone()))
            .ok_or_else(|| ResolveError::no_tags_for_major(format!("{}/{}", owner, repo), major))
    }

    async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }
}
