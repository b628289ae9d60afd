//! Memoization of version lookups
//!
//! Constrained and unconstrained lookups live in separate tables. Every
//! `get_*` call counts as exactly one hit or one miss; a cached failure is
//! still a hit.

use crate::error::ResolveError;
use std::collections::HashMap;
use std::fmt;

/// Cache key for a version lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Version the lookup started from (constrained lookups only)
    pub current_version: String,
    /// Constraint pattern (constrained lookups only)
    pub pattern: String,
}

impl VersionKey {
    /// Key for an unconstrained "latest overall" lookup
    pub fn unconstrained(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            current_version: String::new(),
            pattern: String::new(),
        }
    }

    /// Key for a lookup bounded by a constraint
    pub fn constrained(
        owner: impl Into<String>,
        repo: impl Into<String>,
        current_version: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            current_version: current_version.into(),
            pattern: pattern.into(),
        }
    }

    /// Returns true if the key carries a current version or a pattern
    pub fn is_constrained(&self) -> bool {
        !self.current_version.is_empty() || !self.pattern.is_empty()
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constrained() {
            write!(
                f,
                "{}/{}@{} ({})",
                self.owner, self.repo, self.current_version, self.pattern
            )
        } else {
            write!(f, "{}/{}", self.owner, self.repo)
        }
    }
}

/// Outcome of a lookup, success or a definitive failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionResult {
    /// Resolved tag and its commit SHA
    Found { tag: String, hash: String },
    /// A failure describing remote state, replayed on later lookups
    Failed(ResolveError),
}

impl VersionResult {
    /// Convert back into the resolver's return shape
    pub fn into_result(self) -> Result<(String, String), ResolveError> {
        match self {
            VersionResult::Found { tag, hash } => Ok((tag, hash)),
            VersionResult::Failed(err) => Err(err),
        }
    }

    /// Build a cacheable entry from a lookup outcome
    ///
    /// Returns `None` for failures that must not be cached.
    pub fn from_result(result: &Result<(String, String), ResolveError>) -> Option<Self> {
        match result {
            Ok((tag, hash)) => Some(VersionResult::Found {
                tag: tag.clone(),
                hash: hash.clone(),
            }),
            Err(err) if err.is_cacheable() => Some(VersionResult::Failed(err.clone())),
            Err(_) => None,
        }
    }
}

/// Lifetime hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the remote API
    pub misses: u64,
}

impl CacheStats {
    /// Total number of lookups
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }
}

/// In-memory result cache
#[derive(Debug, Default)]
pub struct ResultCache {
    constrained: HashMap<VersionKey, VersionResult>,
    unconstrained: HashMap<VersionKey, VersionResult>,
    stats: CacheStats,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(
        table: &HashMap<VersionKey, VersionResult>,
        stats: &mut CacheStats,
        key: &VersionKey,
    ) -> Option<VersionResult> {
        match table.get(key) {
            Some(result) => {
                stats.hits += 1;
                Some(result.clone())
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Look up a constrained result
    pub fn get_constrained(&mut self, key: &VersionKey) -> Option<VersionResult> {
        Self::lookup(&self.constrained, &mut self.stats, key)
    }

    /// Store a constrained result
    pub fn set_constrained(&mut self, key: VersionKey, result: VersionResult) {
        self.constrained.insert(key, result);
    }

    /// Look up an unconstrained result
    pub fn get_unconstrained(&mut self, key: &VersionKey) -> Option<VersionResult> {
        Self::lookup(&self.unconstrained, &mut self.stats, key)
    }

    /// Store an unconstrained result
    pub fn set_unconstrained(&mut self, key: VersionKey, result: VersionResult) {
        self.unconstrained.insert(key, result);
    }

    /// Drop every entry; the counters are kept
    pub fn clear(&mut self) {
        self.constrained.clear();
        self.unconstrained.clear();
    }

    /// Number of cached entries across both tables
    pub fn len(&self) -> usize {
        self.constrained.len() + self.unconstrained.len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
