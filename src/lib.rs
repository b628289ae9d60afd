//! github-ci - GitHub Actions reference upgrader library
//!
//! This library provides the core functionality for keeping the `uses:`
//! references of GitHub workflow files up to date:
//! - Loose version algebra over action tags
//! - Parsing of `owner/repo[/path]@ref` references
//! - Memoized resolution against the GitHub REST API
//! - Upgrade decisions in tag, commit-hash or major-tag form
//! - In-place rewriting of workflow files

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod update;
pub mod version;
pub mod workflow;
