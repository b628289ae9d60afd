//! JSON output formatter for machine processing

use crate::domain::{UpdateDecision, VersionFormat};
use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput {
    /// Whether this was a dry-run
    dry_run: bool,
    /// Decisions in scan order
    updates: Vec<JsonUpdate>,
    /// Cache counters
    cache: JsonCache,
    /// Scan failure, if the scan stopped early
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Failures while rewriting files
    #[serde(skip_serializing_if = "Vec::is_empty")]
    write_errors: Vec<String>,
}

/// JSON representation of one decision
#[derive(Serialize)]
struct JsonUpdate {
    /// Workflow file
    file: String,
    /// 1-based line number
    line: usize,
    /// Action name (`owner/repo[/path]`)
    action: String,
    /// Current `uses` value
    from: String,
    /// New `uses` value
    to: String,
    /// Current version
    current_version: String,
    /// Target tag
    new_version: String,
    /// Target commit SHA
    new_hash: String,
    /// Representation written
    format: VersionFormat,
    /// Trailing comment written after the value
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    /// Non-fatal resolution warning
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// JSON representation of cache counters
#[derive(Serialize)]
struct JsonCache {
    hits: u64,
    misses: u64,
}

impl From<&UpdateDecision> for JsonUpdate {
    fn from(decision: &UpdateDecision) -> Self {
        Self {
            file: decision.file.display().to_string(),
            line: decision.line,
            action: decision.reference.name(),
            from: decision.uses.clone(),
            to: decision.new_uses(),
            current_version: decision.current_version.clone(),
            new_version: decision.new_tag.clone(),
            new_hash: decision.new_hash.clone(),
            format: decision.format,
            comment: decision.comment(),
            warning: decision.warning.clone(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: result.dry_run,
            updates: result.decisions.iter().map(JsonUpdate::from).collect(),
            cache: JsonCache {
                hits: result.cache_stats.hits,
                misses: result.cache_stats.misses,
            },
            error: result.error.as_ref().map(|e| e.to_string()),
            write_errors: result
                .write_results
                .iter()
                .flat_map(|r| {
                    r.errors
                        .iter()
                        .map(move |e| format!("{}: {}", r.path.display(), e))
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_decision(
        &self,
        decision: &UpdateDecision,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&JsonUpdate::from(decision))
            .map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
