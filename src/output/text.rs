//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One block per decision: location, current value, replacement, warning
//! - Dry-run, applied and aborted headers
//! - Write failures and the GitHub API call summary

use crate::domain::UpdateDecision;
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, result: &OrchestratorResult) -> String {
        let count = result.decisions.len();
        if result.error.is_some() {
            format!("Found {} action(s) to update before the scan stopped:", count)
        } else if result.dry_run {
            format!("Would update {} action(s):", count)
        } else {
            format!("Updated {} action(s):", result.applied_count())
        }
    }

    fn format_write_errors(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for write_result in result.write_results.iter().filter(|r| r.has_errors()) {
            for error in &write_result.errors {
                writeln!(
                    writer,
                    "{} {}: {}",
                    self.paint("✗", |s| s.red().bold()),
                    write_result.path.display(),
                    error
                )?;
            }
        }
        Ok(())
    }

    fn format_written_files(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for write_result in result.write_results.iter().filter(|r| r.file_modified) {
            writeln!(
                writer,
                "  {} {} ({} update(s))",
                self.paint("wrote", |s| s.dimmed()),
                write_result.path.display(),
                write_result.updates_applied
            )?;
        }
        Ok(())
    }

    fn format_cache_stats(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let stats = result.cache_stats;
        if stats.total() > 0 {
            writeln!(writer)?;
            let line = format!(
                "GitHub API: {} call(s), {} from cache",
                stats.misses, stats.hits
            );
            writeln!(writer, "{}", self.paint(&line, |s| s.dimmed()))?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let quiet = self.verbosity == Verbosity::Quiet;

        if result.decisions.is_empty() {
            if result.error.is_none() {
                writeln!(
                    writer,
                    "{} No updates available",
                    self.paint("✓", |s| s.green().bold())
                )?;
            }
        } else if !quiet {
            writeln!(writer, "{}", self.paint(&self.header(result), |s| s.bold()))?;
            writeln!(writer)?;
            for decision in &result.decisions {
                self.format_decision(decision, writer)?;
            }
        }

        self.format_write_errors(result, writer)?;

        if self.verbosity == Verbosity::Verbose {
            self.format_written_files(result, writer)?;
        }

        if !result.dry_run && !result.has_errors() {
            writeln!(
                writer,
                "{} Upgrade completed successfully",
                self.paint("✓", |s| s.green().bold())
            )?;
        }

        if !quiet {
            self.format_cache_stats(result, writer)?;
        }

        Ok(())
    }

    fn format_decision(
        &self,
        decision: &UpdateDecision,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let (new_ref, comment) = decision.replacement();
        let location = format!("{}:{}", decision.file.display(), decision.line);
        let target = format!("{}@{}", decision.reference.name(), new_ref);

        writeln!(writer, "  {}", self.paint(&location, |s| s.bold()))?;
        writeln!(writer, "    {}", self.paint(&decision.uses, |s| s.dimmed()))?;
        match comment {
            Some(comment) => writeln!(
                writer,
                "    → {} {}",
                self.paint(&target, |s| s.green()),
                self.paint(&format!("({})", comment), |s| s.dimmed())
            )?,
            None => writeln!(writer, "    → {}", self.paint(&target, |s| s.green()))?,
        }

        if let Some(ref warning) = decision.warning {
            let line = format!("⚠ Warning: {}", warning);
            writeln!(writer, "    {}", self.paint(&line, |s| s.yellow()))?;
        }

        writeln!(writer)
    }
}
