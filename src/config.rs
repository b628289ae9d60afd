//! Configuration file loading
//!
//! The file is TOML. A missing file yields the defaults:
//!
//! ```toml
//! timeout = 10
//!
//! [upgrade]
//! format = "tag"
//!
//! [upgrade.actions."actions/checkout"]
//! constraint = "^4.0.0"
//! ```

use crate::domain::VersionFormat;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = ".github-ci.toml";

/// Default per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Per-action settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionConfig {
    /// Version constraint (`""`, `^X[.Y[.Z]]` or `~X[.Y[.Z]]`)
    #[serde(default, alias = "version")]
    pub constraint: String,
}

/// Settings for the upgrade command
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeConfig {
    /// Representation to write
    #[serde(default, alias = "version")]
    pub format: VersionFormat,
    /// Per-action settings keyed by `owner/repo[/path]`
    #[serde(default)]
    pub actions: BTreeMap<String, ActionConfig>,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
    /// Upgrade settings
    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            upgrade: UpgradeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&content, path)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from(path),
            message: e.to_string().trim().to_string(),
        })?;

        for (name, action) in &config.upgrade.actions {
            if !is_valid_constraint(&action.constraint) {
                warn!(
                    action = %name,
                    constraint = %action.constraint,
                    "unrecognized version constraint; no tag will match it"
                );
            }
        }

        Ok(config)
    }

    /// Constraint configured for an action, `None` if it has no entry
    pub fn constraint_for(&self, name: &str) -> Option<&str> {
        self.upgrade
            .actions
            .get(name)
            .map(|a| a.constraint.as_str())
    }

    /// Configured representation format
    pub fn format(&self) -> VersionFormat {
        self.upgrade.format
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Override the configured format
    pub fn with_format(mut self, format: VersionFormat) -> Self {
        self.upgrade.format = format;
        self
    }
}

/// Returns true for `""` or a `^`/`~` prefixed version of one to three components
///
/// Missing minor and patch numbers are padded with `0` before the semver
/// check, since matching only reads the major and minor numbers.
fn is_valid_constraint(constraint: &str) -> bool {
    if constraint.is_empty() {
        return true;
    }

    let Some(rest) = constraint
        .strip_prefix('^')
        .or_else(|| constraint.strip_prefix('~'))
    else {
        return false;
    };

    let version = rest.trim_start_matches(['v', 'V']);
    let padded = match version.split('.').count() {
        1 => format!("{}.0.0", version),
        2 => format!("{}.0", version),
        _ => version.to_string(),
    };
    semver::Version::parse(&padded).is_ok()
}
