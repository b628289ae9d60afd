//! Upgrade decisions produced by a scan

use super::{ActionRef, VersionFormat};
use crate::version;
use serde::Serialize;
use std::path::PathBuf;

/// A pending rewrite of one `uses:` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDecision {
    /// Workflow file containing the reference
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The `uses` value as currently written
    pub uses: String,
    /// Parsed reference
    pub reference: ActionRef,
    /// Current version (a tag, or the hash itself when it has no tag)
    pub current_version: String,
    /// Resolved target tag
    pub new_tag: String,
    /// Commit SHA of the target tag
    pub new_hash: String,
    /// Representation to write
    pub format: VersionFormat,
    /// Non-fatal resolution warning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl UpdateDecision {
    /// The new ref and optional trailing comment for this decision
    pub fn replacement(&self) -> (String, Option<String>) {
        match self.format {
            VersionFormat::Hash => (self.new_hash.clone(), Some(self.new_tag.clone())),
            VersionFormat::Major => (
                version::to_major_tag(&self.new_tag),
                Some(self.new_tag.clone()),
            ),
            VersionFormat::Tag => (self.new_tag.clone(), None),
        }
    }

    /// The rewritten `uses` value
    pub fn new_uses(&self) -> String {
        let (new_ref, _) = self.replacement();
        self.reference.format_uses(&new_ref)
    }

    /// Trailing comment to write after the new value, if any
    pub fn comment(&self) -> Option<String> {
        self.replacement().1
    }

    /// Returns true if only the representation changes
    pub fn is_format_only(&self) -> bool {
        self.current_version == self.new_tag
    }
}
