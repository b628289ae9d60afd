//! Workflow files and line-level `uses:` editing
//!
//! This module provides:
//! - Loading a workflow directory (`*.yml`/`*.yaml`, non-recursive) or a single file
//! - Discovery of `uses:` values with 1-based line numbers
//! - In-place rewriting that preserves indentation, quoting and comments
//! - WorkflowWriter for applying a batch of upgrade decisions

mod writer;

pub use writer::{WorkflowWriter, WriteResult};

use crate::error::WorkflowError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Default workflow directory
pub const DEFAULT_WORKFLOW_DIR: &str = ".github/workflows";

// `      - uses: "owner/repo@ref"   # comment`
//  1: everything up to the value, 2/4: quotes, 3: value, 5: trailing comment
static USES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*(?:-\s+)?uses:\s*)(["']?)([^\s"'#]+)(["']?)(\s*#.*)?\s*$"#).unwrap()
});

// Comment that records a version (`# v4.1.7`, `# 4.1`)
static VERSION_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*[vV]?\d").unwrap());

/// A `uses:` occurrence in a workflow file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionUse {
    /// The value after `uses:`, without quotes
    pub uses: String,
    /// 1-based line number
    pub line: usize,
}

/// A workflow file held in memory
#[derive(Debug, Clone)]
pub struct Workflow {
    path: PathBuf,
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
    modified: bool,
}

/// Parsed pieces of a `uses:` line
struct UsesLine<'a> {
    prefix: &'a str,
    open_quote: &'a str,
    value: &'a str,
    close_quote: &'a str,
    comment: Option<&'a str>,
}

impl<'a> UsesLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let caps = USES_RE.captures(line)?;
        Some(Self {
            prefix: caps.get(1)?.as_str(),
            open_quote: caps.get(2).map_or("", |m| m.as_str()),
            value: caps.get(3)?.as_str(),
            close_quote: caps.get(4).map_or("", |m| m.as_str()),
            comment: caps.get(5).map(|m| m.as_str().trim()),
        })
    }

    fn render(&self, value: &str, comment: Option<&str>) -> String {
        let mut out = format!(
            "{}{}{}{}",
            self.prefix, self.open_quote, value, self.close_quote
        );
        if let Some(comment) = comment {
            out.push_str(" # ");
            out.push_str(comment);
        }
        out
    }
}

/// Comment text without the leading `#`
fn comment_text(comment: &str) -> &str {
    comment.trim_start_matches('#').trim()
}

impl Workflow {
    /// Read a workflow file
    pub fn load(path: &Path) -> Result<Self, WorkflowError> {
        let content = fs::read_to_string(path).map_err(|e| WorkflowError::read_error(path, e))?;
        Ok(Self::from_content(path, &content))
    }

    /// Build a workflow from text (used for files already in memory)
    pub fn from_content(path: impl Into<PathBuf>, content: &str) -> Self {
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            path: path.into(),
            lines: content.lines().map(str::to_string).collect(),
            line_ending,
            trailing_newline: content.ends_with('\n'),
            modified: false,
        }
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current text
    pub fn content(&self) -> String {
        let mut content = self.lines.join(self.line_ending);
        if self.trailing_newline {
            content.push_str(self.line_ending);
        }
        content
    }

    /// Returns true if the in-memory text differs from the file
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Every remote `uses:` reference, in file order
    ///
    /// Local (`./`) and `docker://` references are skipped.
    pub fn find_actions(&self) -> Vec<ActionUse> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let parsed = UsesLine::parse(line)?;
                if parsed.value.starts_with("./") || parsed.value.starts_with("docker://") {
                    return None;
                }
                Some(ActionUse {
                    uses: parsed.value.to_string(),
                    line: idx + 1,
                })
            })
            .collect()
    }

    /// Rewrite every `uses:` line whose value is `old_uses`
    ///
    /// `Some(comment)` replaces any trailing comment. `None` drops a comment
    /// that records a version and keeps any other comment. Calling this again
    /// once `new_uses` is in place is a no-op.
    pub fn update_action_uses(
        &mut self,
        old_uses: &str,
        new_uses: &str,
        comment: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let mut replaced = 0;
        let mut found_new = false;

        for line in self.lines.iter_mut() {
            let Some(parsed) = UsesLine::parse(line) else {
                continue;
            };

            if parsed.value == new_uses {
                found_new = true;
            }
            if parsed.value != old_uses {
                continue;
            }

            let kept = parsed
                .comment
                .filter(|c| !VERSION_COMMENT_RE.is_match(c))
                .map(comment_text);
            let rewritten = parsed.render(new_uses, comment.or(kept));

            if rewritten != *line {
                *line = rewritten;
                self.modified = true;
            }
            replaced += 1;
        }

        if replaced == 0 && !found_new {
            return Err(WorkflowError::UsesNotFound {
                path: self.path.clone(),
                uses: old_uses.to_string(),
            });
        }

        debug!(path = %self.path.display(), old_uses, new_uses, replaced, "updated uses");
        Ok(())
    }

    /// Put exactly one space before and after `#` in `uses:` line comments
    pub fn normalize_comment_spacing(&mut self) -> bool {
        let mut changed = false;

        for line in self.lines.iter_mut() {
            let Some(parsed) = UsesLine::parse(line) else {
                continue;
            };
            let Some(comment) = parsed.comment else {
                continue;
            };

            let text = comment_text(comment);
            let normalized = if text.is_empty() {
                parsed.render(parsed.value, None)
            } else {
                parsed.render(parsed.value, Some(text))
            };

            if normalized != *line {
                *line = normalized;
                changed = true;
            }
        }

        if changed {
            self.modified = true;
        }
        changed
    }

    /// Write the file back if it was modified
    pub fn save(&mut self) -> Result<(), WorkflowError> {
        if !self.modified {
            return Ok(());
        }

        fs::write(&self.path, self.content())
            .map_err(|e| WorkflowError::write_error(&self.path, e))?;
        self.modified = false;
        debug!(path = %self.path.display(), "saved workflow");
        Ok(())
    }
}

/// Returns true for `*.yml` / `*.yaml`
fn is_workflow_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yml" || e == "yaml")
}

/// Load a workflow directory or a single workflow file
pub fn load_workflows(path: &Path) -> Result<Vec<Workflow>, WorkflowError> {
    if !path.exists() {
        return Err(WorkflowError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if path.is_file() {
        return Ok(vec![Workflow::load(path)?]);
    }

    let entries = fs::read_dir(path).map_err(|e| WorkflowError::read_error(path, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_workflow_file(p))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(WorkflowError::NoWorkflows {
            path: path.to_path_buf(),
        });
    }

    files.iter().map(|f| Workflow::load(f)).collect()
}
