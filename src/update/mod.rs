//! Upgrade decision logic for action references
//!
//! This module provides:
//! - Current-version resolution for commit-hash references
//! - Target lookup, constrained or unconstrained depending on config
//! - The update judgment that combines version and format changes
//! - A sequential scan over workflows that stops at the first failure

use crate::config::Config;
use crate::domain::{ActionRef, UpdateDecision, VersionFormat};
use crate::error::CheckError;
use crate::progress::Progress;
use crate::resolver::Resolver;
use crate::version;
use crate::workflow::{ActionUse, Workflow};
use std::path::Path;
use tracing::{debug, warn};

/// Characters of a commit SHA shown in warnings
const HASH_PREVIEW_LEN: usize = 12;

/// Result of scanning a set of workflows
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Decisions computed before the scan ended
    pub decisions: Vec<UpdateDecision>,
    /// The failure that stopped the scan, if any
    pub error: Option<CheckError>,
}

impl ScanOutcome {
    /// Returns true if the scan stopped on an error
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}

/// Upgrade engine deciding what to rewrite in each `uses:` line
pub struct UpgradeEngine<'a> {
    /// Version lookups
    resolver: &'a dyn Resolver,
    /// Per-action constraints and the desired format
    config: &'a Config,
}

impl<'a> UpgradeEngine<'a> {
    /// Create a new engine
    pub fn new(resolver: &'a dyn Resolver, config: &'a Config) -> Self {
        Self { resolver, config }
    }

    /// Representation the engine writes
    pub fn format(&self) -> VersionFormat {
        self.config.format()
    }

    /// Scan every action of every workflow in order
    ///
    /// The first resolution failure ends the scan; decisions already made
    /// are returned alongside the error.
    pub async fn find_updates(&self, workflows: &[Workflow], progress: &Progress) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for workflow in workflows {
            for action in workflow.find_actions() {
                progress.set_message(&action.uses);
                let result = self.check_action(workflow.path(), &action).await;
                progress.inc();

                match result {
                    Ok(Some(decision)) => outcome.decisions.push(decision),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, "scan aborted");
                        outcome.error = Some(e);
                        return outcome;
                    }
                }
            }
        }

        outcome
    }

    /// Decide whether one `uses:` occurrence needs rewriting
    pub async fn check_action(
        &self,
        file: &Path,
        action: &ActionUse,
    ) -> Result<Option<UpdateDecision>, CheckError> {
        let reference = match ActionRef::parse(&action.uses) {
            Ok(reference) => reference,
            Err(e) => {
                debug!(uses = %action.uses, error = %e, "skipping unparseable reference");
                return Ok(None);
            }
        };
        let name = reference.name();

        let (current_version, warning) = self.resolve_current_version(&reference).await;

        let constraint = self.config.constraint_for(&name);
        let lookup = match constraint {
            Some(pattern) => {
                self.resolver
                    .get_latest_version(&reference.owner, &reference.repo, &current_version, pattern)
                    .await
            }
            None => {
                self.resolver
                    .get_latest_version_unconstrained(&reference.owner, &reference.repo)
                    .await
            }
        };
        let (new_tag, new_hash) = lookup.map_err(|source| CheckError {
            action: name.clone(),
            source,
        })?;

        let format = self.format();
        let format_change = reference.needs_format_change(format);
        let version_change = !reference.is_at_latest(&new_tag, &new_hash)
            && version::should_update(&current_version, &new_tag, constraint.unwrap_or(""));

        if !version_change && !format_change {
            debug!(action = %name, current = %current_version, latest = %new_tag, "up to date");
            return Ok(None);
        }

        debug!(
            action = %name,
            current = %current_version,
            latest = %new_tag,
            version_change,
            format_change,
            "update needed"
        );

        Ok(Some(UpdateDecision {
            file: file.to_path_buf(),
            line: action.line,
            uses: action.uses.clone(),
            reference,
            current_version,
            new_tag,
            new_hash,
            format,
            warning,
        }))
    }

    /// Map a commit-hash ref back to its tag
    ///
    /// An unresolvable hash stays the current version and yields a warning.
    async fn resolve_current_version(&self, reference: &ActionRef) -> (String, Option<String>) {
        if !reference.is_commit_hash() {
            return (reference.git_ref.clone(), None);
        }

        let lookup = self
            .resolver
            .get_tag_for_commit(&reference.owner, &reference.repo, &reference.git_ref)
            .await;

        match lookup {
            Ok(Some(tag)) if !tag.is_empty() => (tag, None),
            other => {
                if let Err(e) = other {
                    debug!(reference = %reference, error = %e, "reverse lookup failed");
                }
                let preview: String = reference.git_ref.chars().take(HASH_PREVIEW_LEN).collect();
                let warning = format!(
                    "cannot resolve hash {} to a tag (may be unreleased commit)",
                    preview
                );
                (reference.git_ref.clone(), Some(warning))
            }
        }
    }
}
