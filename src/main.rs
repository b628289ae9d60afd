//! github-ci - GitHub Actions reference upgrader CLI tool
//!
//! Scans workflow files for `uses:` references and rewrites them to the
//! latest allowed release as a tag, a commit SHA or a major-only tag.

use clap::Parser;
use github_ci::cli::CliArgs;
use github_ci::orchestrator::Orchestrator;
use github_ci::output::create_formatter;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "github_ci=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("github-ci v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Workflows: {}", args.path.display());
        eprintln!("Config: {}", args.config.display());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::new(args.clone());
    let result = orchestrator.run().await?;

    let formatter = create_formatter(&args, io::stdout().is_terminal());

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if let Some(ref error) = result.error {
        eprintln!("Error: {}", error);
        return Ok(ExitCode::FAILURE);
    }

    if result.has_errors() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
