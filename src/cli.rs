//! CLI argument parsing module for github-ci

use crate::config::DEFAULT_CONFIG_FILE;
use crate::domain::VersionFormat;
use crate::workflow::DEFAULT_WORKFLOW_DIR;
use clap::Parser;
use std::path::PathBuf;

/// Parse a representation format: tag, hash or major
fn parse_format(s: &str) -> Result<VersionFormat, String> {
    s.parse()
}

/// GitHub Actions reference upgrader
#[derive(Parser, Debug, Clone)]
#[command(
    name = "github-ci",
    version,
    about = "Upgrade GitHub Actions references in workflow files"
)]
pub struct CliArgs {
    /// Workflow directory or single workflow file
    #[arg(default_value = DEFAULT_WORKFLOW_DIR)]
    pub path: PathBuf,

    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    // General options
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Representation to write (tag, hash or major), overrides the config file
    #[arg(long, value_parser = parse_format)]
    pub format: Option<VersionFormat>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Whether the progress spinner should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
