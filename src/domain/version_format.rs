//! Representation formats for a resolved version

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an upgraded reference is written back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionFormat {
    /// Full tag (`v4.1.7`)
    #[default]
    Tag,
    /// Commit SHA with the tag as a trailing comment
    Hash,
    /// Major-only tag (`v4`) with the full tag as a trailing comment
    Major,
}

impl VersionFormat {
    /// Returns the lowercase name used in config files and on the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionFormat::Tag => "tag",
            VersionFormat::Hash => "hash",
            VersionFormat::Major => "major",
        }
    }
}

impl fmt::Display for VersionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VersionFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tag" => Ok(VersionFormat::Tag),
            "hash" => Ok(VersionFormat::Hash),
            "major" => Ok(VersionFormat::Major),
            other => Err(format!(
                "invalid format '{}' (expected tag, hash or major)",
                other
            )),
        }
    }
}
