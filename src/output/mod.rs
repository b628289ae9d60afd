//! Report rendering for upgrade runs
//!
//! The text report is for terminals; `--json` switches to a machine-readable
//! document with the same content.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::cli::CliArgs;
use crate::domain::UpdateDecision;
use crate::orchestrator::OrchestratorResult;
use std::io::Write;

/// How much of the text report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only the outcome line and write failures
    Quiet,
    Normal,
    /// Also lists every rewritten file
    Verbose,
}

impl Verbosity {
    /// `--quiet` wins over `--verbose`
    pub fn from_args(args: &CliArgs) -> Self {
        if args.quiet {
            Verbosity::Quiet
        } else if args.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Renders an orchestrator result
pub trait OutputFormatter {
    /// Write the full report
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Write the entry for a single decision
    fn format_decision(
        &self,
        decision: &UpdateDecision,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Pick the formatter requested on the command line
pub fn create_formatter(args: &CliArgs, color: bool) -> Box<dyn OutputFormatter> {
    if args.json {
        Box::new(JsonFormatter::new())
    } else {
        Box::new(TextFormatter::with_color(Verbosity::from_args(args), color))
    }
}
