//! Core domain models for github-ci
//!
//! This module contains the fundamental types used throughout the application:
//! - Parsed action references and their classification
//! - Representation formats for resolved versions
//! - Upgrade decisions produced by a scan

mod action_ref;
mod decision;
mod version_format;

pub use action_ref::{ActionRef, RefKind};
pub use decision::UpdateDecision;
pub use version_format::VersionFormat;
