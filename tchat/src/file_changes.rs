//! Structured file edits embedded in generated text.
//!
//! Text before [`FILE_CHANGES_MARKER`] is a human-readable summary. Text after it is a JSON
//! array of changes, optionally wrapped in a fenced code block.
//!
//! ```rust
//! use tchat::{FileChangeProcessor, FileOperation, MarkerFileChangeProcessor};
//!
//! let text = r#"Added a readme.
//! __CREATE_CODING_FEATURE_FILE_CHANGES__
//! [{"operation": "create", "path": "README.md", "content": "hi"}]"#;
//!
//! let parsed = MarkerFileChangeProcessor.parse(text).unwrap();
//! assert_eq!(parsed.summary, "Added a readme.");
//! assert_eq!(parsed.changes[0].operation, FileOperation::Create);
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ChatError;

pub const FILE_CHANGES_MARKER: &str = "__CREATE_CODING_FEATURE_FILE_CHANGES__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub operation: FileOperation,
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFileChanges {
    pub summary: String,
    pub changes: Vec<FileChange>,
}

/// Best-effort parser and applier. Every failure is a `PartialApply` error.
pub trait FileChangeProcessor: Send + Sync {
    fn parse(&self, text: &str) -> Result<ParsedFileChanges, ChatError>;

    fn apply(&self, root: &Path, changes: &[FileChange]) -> Result<(), ChatError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerFileChangeProcessor;

impl FileChangeProcessor for MarkerFileChangeProcessor {
    fn parse(&self, text: &str) -> Result<ParsedFileChanges, ChatError> {
        let Some((summary, payload)) = text.split_once(FILE_CHANGES_MARKER) else {
            return Ok(ParsedFileChanges {
                summary: text.to_string(),
                changes: Vec::new(),
            });
        };

        let payload = strip_fence(payload.trim());
        let changes = if payload.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Vec<FileChange>>(payload).map_err(|err| {
                ChatError::partial_apply(format!("failed to parse file changes: {err}"))
            })?
        };

        Ok(ParsedFileChanges {
            summary: summary.trim().to_string(),
            changes,
        })
    }

    fn apply(&self, root: &Path, changes: &[FileChange]) -> Result<(), ChatError> {
        let failures = changes
            .iter()
            .filter_map(|change| {
                apply_one(root, change)
                    .err()
                    .map(|reason| format!("{}: {reason}", change.path))
            })
            .collect::<Vec<_>>();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ChatError::partial_apply(format!(
                "failed to apply file changes: {}",
                failures.join("; ")
            )))
        }
    }
}

fn strip_fence(payload: &str) -> &str {
    let Some(rest) = payload.strip_prefix("```") else {
        return payload;
    };

    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn resolve_target(root: &Path, relative: &str) -> Result<PathBuf, String> {
    let path = Path::new(relative);
    if relative.trim().is_empty() {
        return Err("empty path".to_string());
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err("path escapes the project root".to_string()),
            Component::RootDir | Component::Prefix(_) => {
                return Err("absolute paths are not allowed".to_string());
            }
        }
    }

    Ok(root.join(path))
}

fn apply_one(root: &Path, change: &FileChange) -> Result<(), String> {
    let target = resolve_target(root, &change.path)?;

    match change.operation {
        FileOperation::Create | FileOperation::Update => {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|err| err.to_string())?;
            }
            fs::write(&target, &change.content).map_err(|err| err.to_string())
        }
        FileOperation::Delete => fs::remove_file(&target).map_err(|err| err.to_string()),
    }
}
