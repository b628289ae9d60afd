//! Parsed `owner/repo[/path]@ref` action references

use super::VersionFormat;
use crate::error::ReferenceError;
use crate::version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a reference's ref part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Full 40 character commit SHA
    CommitHash,
    /// Major-only tag such as `v3`
    MajorOnly,
    /// Any other tag or branch name
    Other,
}

/// A GitHub Action reference as written after `uses:`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRef {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Sub-directory inside the repository, for composite actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Tag, branch or commit SHA after the `@`
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl ActionRef {
    /// Parse a `uses` value
    ///
    /// The ref is everything after the last `@`. The owner ends at the first
    /// `/`; the repository ends at the next `/` if there is one, and the
    /// remainder is the action path.
    pub fn parse(uses: &str) -> Result<Self, ReferenceError> {
        let (action_path, git_ref) = uses
            .rsplit_once('@')
            .ok_or_else(|| ReferenceError::InvalidFormat {
                uses: uses.to_string(),
            })?;

        let (owner, rest) = action_path
            .split_once('/')
            .ok_or_else(|| ReferenceError::InvalidPath {
                path: action_path.to_string(),
            })?;

        let (repo, path) = match rest.split_once('/') {
            Some((repo, path)) => (repo, Some(path.to_string())),
            None => (rest, None),
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path,
            git_ref: git_ref.to_string(),
        })
    }

    /// Configuration identity: `owner/repo` or `owner/repo/path`
    pub fn name(&self) -> String {
        match &self.path {
            Some(path) => format!("{}/{}/{}", self.owner, self.repo, path),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }

    /// Render a `uses` value for this action pinned at `git_ref`
    pub fn format_uses(&self, git_ref: &str) -> String {
        format!("{}@{}", self.name(), git_ref)
    }

    /// Classify the ref
    pub fn kind(&self) -> RefKind {
        if version::is_commit_hash(&self.git_ref) {
            RefKind::CommitHash
        } else if version::is_major_version_only(&self.git_ref) {
            RefKind::MajorOnly
        } else {
            RefKind::Other
        }
    }

    /// Returns true if the ref is a commit SHA
    pub fn is_commit_hash(&self) -> bool {
        self.kind() == RefKind::CommitHash
    }

    /// Whether the ref already points at the latest release
    ///
    /// A major-only ref such as `v4` is at latest when the latest tag is
    /// `v4` itself or any `v4.*` tag.
    pub fn is_at_latest(&self, latest_tag: &str, latest_hash: &str) -> bool {
        match self.kind() {
            RefKind::CommitHash => self.git_ref == latest_hash,
            _ if self.git_ref == latest_tag => true,
            RefKind::MajorOnly => {
                let major = format!("v{}", version::normalize(&self.git_ref));
                latest_tag == major || latest_tag.starts_with(&format!("{}.", major))
            }
            RefKind::Other => false,
        }
    }

    /// Whether writing this ref in `format` changes its representation
    pub fn needs_format_change(&self, format: VersionFormat) -> bool {
        let kind = self.kind();
        match format {
            VersionFormat::Hash => kind != RefKind::CommitHash,
            VersionFormat::Major => kind != RefKind::MajorOnly,
            VersionFormat::Tag => kind == RefKind::CommitHash,
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name(), self.git_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "8e5e7e5ab8b370d6c329ec480221332ada57f0ab";

    #[test]
    fn test_parse_simple() {
        let action = ActionRef::parse("actions/checkout@v4").unwrap();
        assert_eq!(action.owner, "actions");
        assert_eq!(action.repo, "checkout");
        assert_eq!(action.path, None);
        assert_eq!(action.git_ref, "v4");
        assert_eq!(action.name(), "actions/checkout");
    }

    #[test]
    fn test_parse_composite_path() {
        let action = ActionRef::parse("github/codeql-action/init@v3").unwrap();
        assert_eq!(action.owner, "github");
        assert_eq!(action.repo, "codeql-action");
        assert_eq!(action.path.as_deref(), Some("init"));
        assert_eq!(action.name(), "github/codeql-action/init");
    }

    #[test]
    fn test_parse_nested_path() {
        let action = ActionRef::parse("owner/repo/a/b/c@main").unwrap();
        assert_eq!(action.repo, "repo");
        assert_eq!(action.path.as_deref(), Some("a/b/c"));
        assert_eq!(action.git_ref, "main");
    }

    #[test]
    fn test_parse_splits_on_last_at() {
        let action = ActionRef::parse("owner/repo@weird@v1").unwrap();
        assert_eq!(action.repo, "repo@weird");
        assert_eq!(action.git_ref, "v1");
    }

    #[test]
    fn test_parse_missing_at() {
        let err = ActionRef::parse("actions/checkout").unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidFormat { .. }));
    }

    #[test]
    fn test_parse_missing_slash() {
        let err = ActionRef::parse("checkout@v4").unwrap_err();
        assert_eq!(
            err,
            ReferenceError::InvalidPath {
                path: "checkout".to_string()
            }
        );
    }

    #[test]
    fn test_round_trip_without_path() {
        for uses in ["actions/checkout@v4", "actions/setup-go@v5.0.1", "a/b@main"] {
            let action = ActionRef::parse(uses).unwrap();
            let again = ActionRef::parse(&format!("{}@{}", action.name(), action.git_ref)).unwrap();
            assert_eq!(again, action);
        }
    }

    #[test]
    fn test_round_trip_with_path() {
        let action = ActionRef::parse("github/codeql-action/analyze@v3.25.0").unwrap();
        let again = ActionRef::parse(&format!(
            "{}/{}/{}@{}",
            action.owner,
            action.repo,
            action.path.as_deref().unwrap(),
            action.git_ref
        ))
        .unwrap();
        assert_eq!(again, action);
        assert_eq!(action.to_string(), "github/codeql-action/analyze@v3.25.0");
    }

    #[test]
    fn test_format_uses() {
        let action = ActionRef::parse("github/codeql-action/init@v2").unwrap();
        assert_eq!(action.format_uses("v3"), "github/codeql-action/init@v3");
    }

    #[test]
    fn test_kind() {
        let hash = ActionRef::parse(&format!("actions/checkout@{}", HASH)).unwrap();
        assert_eq!(hash.kind(), RefKind::CommitHash);
        assert!(hash.is_commit_hash());

        let major = ActionRef::parse("actions/checkout@v4").unwrap();
        assert_eq!(major.kind(), RefKind::MajorOnly);

        let other = ActionRef::parse("actions/checkout@v4.1.0").unwrap();
        assert_eq!(other.kind(), RefKind::Other);

        let branch = ActionRef::parse("actions/checkout@main").unwrap();
        assert_eq!(branch.kind(), RefKind::Other);
    }

    #[test]
    fn test_is_at_latest_hash() {
        let action = ActionRef::parse(&format!("actions/checkout@{}", HASH)).unwrap();
        assert!(action.is_at_latest("v4.1.0", HASH));
        assert!(!action.is_at_latest("v4.1.0", "0000000000000000000000000000000000000000"));
    }

    #[test]
    fn test_is_at_latest_exact_tag() {
        let action = ActionRef::parse("actions/checkout@v4.1.0").unwrap();
        assert!(action.is_at_latest("v4.1.0", "abc"));
        assert!(!action.is_at_latest("v4.2.0", "abc"));
    }

    #[test]
    fn test_is_at_latest_major_only() {
        let action = ActionRef::parse("actions/checkout@v4").unwrap();
        assert!(action.is_at_latest("v4", ""));
        assert!(action.is_at_latest("v4.2.1", ""));
        assert!(!action.is_at_latest("v40.0.0", ""));
        assert!(!action.is_at_latest("v5.0.0", ""));

        let bare = ActionRef::parse("actions/checkout@4").unwrap();
        assert!(bare.is_at_latest("v4.0.0", ""));
    }

    #[test]
    fn test_needs_format_change_hash() {
        let tag = ActionRef::parse("actions/checkout@v4.1.0").unwrap();
        let hash = ActionRef::parse(&format!("actions/checkout@{}", HASH)).unwrap();
        assert!(tag.needs_format_change(VersionFormat::Hash));
        assert!(!hash.needs_format_change(VersionFormat::Hash));
    }

    #[test]
    fn test_needs_format_change_major() {
        let major = ActionRef::parse("actions/checkout@v4").unwrap();
        let full = ActionRef::parse("actions/checkout@v4.1.0").unwrap();
        let hash = ActionRef::parse(&format!("actions/checkout@{}", HASH)).unwrap();
        assert!(!major.needs_format_change(VersionFormat::Major));
        assert!(full.needs_format_change(VersionFormat::Major));
        assert!(hash.needs_format_change(VersionFormat::Major));
    }

    #[test]
    fn test_needs_format_change_tag() {
        let major = ActionRef::parse("actions/checkout@v4").unwrap();
        let hash = ActionRef::parse(&format!("actions/checkout@{}", HASH)).unwrap();
        assert!(!major.needs_format_change(VersionFormat::Tag));
        assert!(hash.needs_format_change(VersionFormat::Tag));
    }
}
