//! File plan construction.
//!
//! Every stage contributes a fragment of [`FileOperation`]s to a
//! [`PlanBuilder`]. [`PlanBuilder::build`] turns the fragments into one
//! [`MigrationPlan`]:
//!
//! 1. Concatenate fragments in [`Stage`] order, whatever order they were added in.
//! 2. Normalize every destination path relative to the target root.
//! 3. Dedup: exact duplicates collapse, anything else on the same path is a
//!    [`PlanError::Conflict`].
//! 4. Reject content operations nested under a file another operation creates.
//! 5. Hoist directories: every directory (requested or implied by a content
//!    operation) comes before all content operations, parents before children.
//!
//! Building is pure. The plan describes I/O; [`crate::execute`] performs it.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PlanError {
    #[error("plan conflict at {path}: {existing} vs {incoming}")]
    Conflict {
        path: String,
        existing: String,
        incoming: String,
    },
    #[error("invalid target path '{0}': must stay inside the target root")]
    InvalidPath(String),
}

/// One filesystem operation, with its destination relative to the target root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FileOperation {
    CreateDirectory { path: String },
    WriteFile { path: String, content: String },
    CopyFile { source: PathBuf, path: String },
}

impl FileOperation {
    pub fn create_dir(path: impl Into<String>) -> Self {
        FileOperation::CreateDirectory { path: path.into() }
    }

    pub fn write(path: impl Into<String>, content: impl Into<String>) -> Self {
        FileOperation::WriteFile {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn copy(source: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        FileOperation::CopyFile {
            source: source.into(),
            path: path.into(),
        }
    }

    /// Destination path, relative to the target root.
    pub fn path(&self) -> &str {
        match self {
            FileOperation::CreateDirectory { path }
            | FileOperation::WriteFile { path, .. }
            | FileOperation::CopyFile { path, .. } => path,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            FileOperation::CreateDirectory { .. } => OperationKind::CreateDirectory,
            FileOperation::WriteFile { .. } => OperationKind::WriteFile,
            FileOperation::CopyFile { .. } => OperationKind::CopyFile,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FileOperation::CreateDirectory { .. })
    }

    fn with_path(self, path: String) -> Self {
        match self {
            FileOperation::CreateDirectory { .. } => FileOperation::CreateDirectory { path },
            FileOperation::WriteFile { content, .. } => FileOperation::WriteFile { path, content },
            FileOperation::CopyFile { source, .. } => FileOperation::CopyFile { source, path },
        }
    }

    fn describe(&self) -> String {
        match self {
            FileOperation::CreateDirectory { .. } => "create directory".to_string(),
            FileOperation::WriteFile { content, .. } => {
                format!("write {} bytes", content.len())
            }
            FileOperation::CopyFile { source, .. } => format!("copy from {}", source.display()),
        }
    }
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOperation::CreateDirectory { path } => write!(f, "mkdir {path}/"),
            FileOperation::WriteFile { path, .. } => write!(f, "write {path}"),
            FileOperation::CopyFile { source, path } => {
                write!(f, "copy {} -> {path}", source.display())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateDirectory,
    WriteFile,
    CopyFile,
}

/// Contributing stages, in the order their fragments appear in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Config,
    Sidebars,
    Versions,
    Translations,
    Passthrough,
}

/// Collects plan fragments per stage.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    fragments: BTreeMap<Stage, Vec<FileOperation>>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to a stage. Repeated calls for one stage keep call order.
    pub fn add(&mut self, stage: Stage, operations: impl IntoIterator<Item = FileOperation>) {
        self.fragments.entry(stage).or_default().extend(operations);
    }

    pub fn build(self, target_root: &Path) -> Result<MigrationPlan, PlanError> {
        let mut unique: Vec<FileOperation> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for op in self.fragments.into_values().flatten() {
            let path = normalize_path(op.path())?;
            let op = op.with_path(path.clone());
            match seen.get(&path) {
                Some(&idx) if unique[idx] == op => {}
                Some(&idx) => {
                    return Err(PlanError::Conflict {
                        path,
                        existing: unique[idx].describe(),
                        incoming: op.describe(),
                    });
                }
                None => {
                    seen.insert(path, unique.len());
                    unique.push(op);
                }
            }
        }

        let files: HashSet<&str> = unique
            .iter()
            .filter(|op| !op.is_directory())
            .map(FileOperation::path)
            .collect();
        for op in &unique {
            if let Some(parent) = ancestors(op.path()).find(|a| files.contains(a)) {
                return Err(PlanError::Conflict {
                    path: parent.to_string(),
                    existing: "file".to_string(),
                    incoming: format!("parent directory of {}", op.path()),
                });
            }
        }

        let mut directories: Vec<FileOperation> = Vec::new();
        let mut dir_seen: HashSet<String> = HashSet::new();
        let mut content: Vec<FileOperation> = Vec::new();
        for op in unique {
            let mut lineage: Vec<&str> = ancestors(op.path()).collect();
            lineage.reverse();
            for dir in lineage {
                if dir_seen.insert(dir.to_string()) {
                    directories.push(FileOperation::create_dir(dir));
                }
            }
            if op.is_directory() {
                if dir_seen.insert(op.path().to_string()) {
                    directories.push(op);
                }
            } else {
                content.push(op);
            }
        }
        directories.extend(content);

        Ok(MigrationPlan {
            target_root: target_root.to_path_buf(),
            operations: directories,
        })
    }
}

/// Proper ancestors of a normalized relative path, deepest first.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.char_indices()
        .rev()
        .filter(|&(_, c)| c == '/')
        .map(move |(i, _)| &path[..i])
}

/// Normalize a target-relative path to `/`-separated components without
/// `.`, `..` or empty segments.
pub fn normalize_path(path: &str) -> Result<String, PlanError> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(PlanError::InvalidPath(path.to_string()));
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() || path.starts_with('/') {
        return Err(PlanError::InvalidPath(path.to_string()));
    }
    Ok(parts.join("/"))
}

/// An ordered, deduplicated set of operations: all directories, then content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationPlan {
    pub target_root: PathBuf,
    pub operations: Vec<FileOperation>,
}

impl MigrationPlan {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of leading directory operations.
    pub fn structural_len(&self) -> usize {
        self.operations.iter().take_while(|op| op.is_directory()).count()
    }

    pub fn directories(&self) -> &[FileOperation] {
        &self.operations[..self.structural_len()]
    }

    pub fn content(&self) -> &[FileOperation] {
        &self.operations[self.structural_len()..]
    }

    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }

    pub fn find(&self, path: &str) -> Option<&FileOperation> {
        self.operations.iter().find(|op| op.path() == path)
    }

    /// Absolute destination of an operation.
    pub fn resolve(&self, op: &FileOperation) -> PathBuf {
        self.target_root.join(op.path())
    }

    /// SHA-256 over the ordered (kind, path, payload) sequence, as hex.
    ///
    /// Independent of the target root, so two runs over the same legacy
    /// project can be compared.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for op in &self.operations {
            hasher.update(format!("{:?}", op.kind()).as_bytes());
            hasher.update([0]);
            hasher.update(op.path().as_bytes());
            hasher.update([0]);
            match op {
                FileOperation::CreateDirectory { .. } => {}
                FileOperation::WriteFile { content, .. } => {
                    hasher.update(Sha256::digest(content.as_bytes()))
                }
                FileOperation::CopyFile { source, .. } => {
                    hasher.update(source.to_string_lossy().as_bytes())
                }
            }
            hasher.update([0xff]);
        }
        format!("{:x}", hasher.finalize())
    }
}
