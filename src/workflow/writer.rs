//! Applying upgrade decisions to workflow files
//!
//! This module provides:
//! - WorkflowWriter for rewriting `uses:` lines from a batch of decisions
//! - Dry-run mode support (no file modifications)
//! - Comment spacing normalization on every touched file

use super::Workflow;
use crate::domain::UpdateDecision;
use std::path::PathBuf;
use tracing::warn;

/// Writer that applies upgrade decisions to workflows
pub struct WorkflowWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying decisions to one workflow file
#[derive(Debug)]
pub struct WriteResult {
    /// Path to the workflow file
    pub path: PathBuf,
    /// Number of decisions successfully applied
    pub updates_applied: usize,
    /// Number of decisions that failed
    pub updates_failed: usize,
    /// Whether the file was actually written
    pub file_modified: bool,
    /// Errors encountered during update
    pub errors: Vec<String>,
}

impl WriteResult {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            updates_applied: 0,
            updates_failed: 0,
            file_modified: false,
            errors: Vec::new(),
        }
    }

    /// Returns true if any decisions were applied
    pub fn has_updates(&self) -> bool {
        self.updates_applied > 0
    }

    /// Returns true if any errors occurred
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl WorkflowWriter {
    /// Create a new WorkflowWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Apply the decisions that belong to one workflow
    pub fn apply(&self, workflow: &mut Workflow, decisions: &[UpdateDecision]) -> WriteResult {
        let path = workflow.path().to_path_buf();
        let mut result = WriteResult::new(&path);

        for decision in decisions.iter().filter(|d| d.file == path) {
            if self.dry_run {
                result.updates_applied += 1;
                continue;
            }

            let new_uses = decision.new_uses();
            let comment = decision.comment();
            match workflow.update_action_uses(&decision.uses, &new_uses, comment.as_deref()) {
                Ok(()) => result.updates_applied += 1,
                Err(e) => {
                    warn!(error = %e, "failed to apply update");
                    result.updates_failed += 1;
                    result
                        .errors
                        .push(format!("Failed to update {}: {}", decision.uses, e));
                }
            }
        }

        if self.dry_run || !result.has_updates() {
            return result;
        }

        workflow.normalize_comment_spacing();
        let was_modified = workflow.is_modified();
        match workflow.save() {
            Ok(()) => result.file_modified = was_modified,
            Err(e) => result.errors.push(e.to_string()),
        }

        result
    }

    /// Apply decisions across all workflows, skipping files without decisions
    pub fn apply_all(
        &self,
        workflows: &mut [Workflow],
        decisions: &[UpdateDecision],
    ) -> Vec<WriteResult> {
        workflows
            .iter_mut()
            .filter(|w| decisions.iter().any(|d| d.file == w.path()))
            .map(|w| self.apply(w, decisions))
            .collect()
    }
}
