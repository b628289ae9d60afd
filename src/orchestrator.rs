//! Upgrade orchestrator for coordinating the entire run
//!
//! This module provides:
//! - Workflow coordination: config → workflows → client → resolver → scan → write
//! - Explicit construction of the one GitHub client used by the run
//! - Dry-run mode support
//! - Partial results when the scan stops on a failure

use crate::cli::CliArgs;
use crate::config::Config;
use crate::domain::UpdateDecision;
use crate::error::{AppError, CheckError};
use crate::progress::Progress;
use crate::registry::{GitHubClient, HttpClient, DEFAULT_API_URL, DEFAULT_USER_AGENT};
use crate::resolver::{ActionResolver, CacheStats, Resolver};
use crate::update::UpgradeEngine;
use crate::workflow::{load_workflows, WorkflowWriter, WriteResult};
use tracing::debug;

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "GITHUB_API_URL";

/// Orchestrator for coordinating an upgrade run
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    /// GitHub API base URL
    api_url: String,
    /// Bearer token, if any
    token: Option<String>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Decisions computed by the scan
    pub decisions: Vec<UpdateDecision>,
    /// Write results for each touched workflow
    pub write_results: Vec<WriteResult>,
    /// The failure that stopped the scan, if any
    pub error: Option<CheckError>,
    /// Cache counters of the run
    pub cache_stats: CacheStats,
    /// Whether this was a dry-run
    pub dry_run: bool,
}

impl OrchestratorResult {
    /// Returns true if the run failed part-way or a write failed
    pub fn has_errors(&self) -> bool {
        self.error.is_some() || self.write_results.iter().any(|r| r.has_errors())
    }

    /// Number of rewrites actually applied to files
    pub fn applied_count(&self) -> usize {
        self.write_results.iter().map(|r| r.updates_applied).sum()
    }
}

impl Orchestrator {
    /// Create a new orchestrator, reading the API URL and token from the environment
    pub fn new(args: CliArgs) -> Self {
        let api_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = std::env::var(TOKEN_ENV).ok();
        Self::with_api(args, api_url, token)
    }

    /// Create an orchestrator against an explicit API (for testing)
    pub fn with_api(args: CliArgs, api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            args,
            api_url: api_url.into(),
            token,
        }
    }

    /// Run the upgrade
    pub async fn run(&self) -> Result<OrchestratorResult, AppError> {
        self.run_with_progress(self.args.show_progress()).await
    }

    /// Run the upgrade with optional progress display
    ///
    /// Config, workflow loading and client setup failures are returned as
    /// errors. A failure during the scan is reported in the result together
    /// with the decisions made before it, and nothing is written.
    pub async fn run_with_progress(
        &self,
        show_progress: bool,
    ) -> Result<OrchestratorResult, AppError> {
        let mut progress = Progress::new(show_progress);

        // Step 1: Load configuration
        let mut config = Config::load(&self.args.config)?;
        if let Some(format) = self.args.format {
            config = config.with_format(format);
        }
        debug!(format = %config.format(), timeout = ?config.timeout(), "configuration loaded");

        // Step 2: Load workflows
        progress.spinner("Loading workflows...");
        let workflows = load_workflows(&self.args.path);
        progress.finish_and_clear();
        let mut workflows = workflows?;

        // Step 3: Build the client and resolver
        let client =
            HttpClient::with_config(config.timeout(), DEFAULT_USER_AGENT, self.token.as_deref())?;
        debug!(
            api_url = %self.api_url,
            authenticated = client.is_authenticated(),
            "GitHub client ready"
        );
        let resolver = ActionResolver::new(GitHubClient::with_base_url(client, &self.api_url));
        let engine = UpgradeEngine::new(&resolver, &config);

        // Step 4: Scan every action reference
        let total: usize = workflows.iter().map(|w| w.find_actions().len()).sum();
        progress.start(total as u64);
        let outcome = engine.find_updates(&workflows, &progress).await;
        progress.finish_and_clear();

        // Step 5: Apply decisions (unless dry-run or the scan failed)
        let write_results = if !outcome.is_partial() {
            if !self.args.dry_run {
                progress.spinner("Writing updates...");
            }
            let writer = WorkflowWriter::new(self.args.dry_run);
            let results = writer.apply_all(&mut workflows, &outcome.decisions);
            progress.finish_and_clear();
            results
        } else {
            Vec::new()
        };

        Ok(OrchestratorResult {
            decisions: outcome.decisions,
            write_results,
            error: outcome.error,
            cache_stats: resolver.cache_stats().await,
            dry_run: self.args.dry_run,
        })
    }
}
