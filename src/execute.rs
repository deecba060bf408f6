//! Plan execution.
//!
//! The only stage that writes. All filesystem access goes through the
//! [`FileSystem`] trait so the rest of the crate can be tested against a
//! recording mock.
//!
//! The target root is created first: plan paths are relative to it and a
//! plan may hold nothing but root-level writes. Directories then run
//! sequentially, in plan order (parents before children). Content operations then run in parallel with rayon: their
//! parents already exist and the plan never has two operations on one path.
//! After a failure no new operation starts; nothing is rolled back.

use crate::plan::{FileOperation, MigrationPlan, OperationKind};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Write-capable filesystem operations used by execution.
pub trait FileSystem: Sync {
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;
    fn copy(&self, source: &Path, dest: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        fs::write(path, content)
    }

    fn copy(&self, source: &Path, dest: &Path) -> io::Result<()> {
        fs::copy(source, dest).map(|_| ())
    }
}

#[derive(Error, Debug)]
#[error("operation #{index} ({failed}) failed after {} completed: {source}", .completed.len())]
pub struct ExecutionError {
    pub failed: FileOperation,
    /// Position of the failed operation in the plan.
    pub index: usize,
    /// Operations that succeeded, in plan order.
    pub completed: Vec<FileOperation>,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub directories: usize,
    pub writes: usize,
    pub copies: usize,
}

impl ExecutionReport {
    pub fn total(&self) -> usize {
        self.directories + self.writes + self.copies
    }

    fn record(&mut self, op: &FileOperation) {
        match op.kind() {
            OperationKind::CreateDirectory => self.directories += 1,
            OperationKind::WriteFile => self.writes += 1,
            OperationKind::CopyFile => self.copies += 1,
        }
    }
}

pub fn execute_plan(
    fs: &impl FileSystem,
    plan: &MigrationPlan,
) -> Result<ExecutionReport, ExecutionError> {
    let (directories, content) = plan.operations.split_at(plan.structural_len());
    let mut report = ExecutionReport::default();
    let mut completed: Vec<FileOperation> = Vec::with_capacity(plan.len());

    if let Err(source) = fs.create_dir_all(&plan.target_root) {
        return Err(ExecutionError {
            failed: FileOperation::create_dir(plan.target_root.to_string_lossy()),
            index: 0,
            completed,
            source,
        });
    }

    for (index, op) in directories.iter().enumerate() {
        if let Err(source) = apply(fs, plan, op) {
            return Err(ExecutionError {
                failed: op.clone(),
                index,
                completed,
                source,
            });
        }
        report.record(op);
        completed.push(op.clone());
    }

    let stop = AtomicBool::new(false);
    let results: Vec<Option<io::Result<()>>> = content
        .par_iter()
        .map(|op| {
            if stop.load(Ordering::Relaxed) {
                return None;
            }
            let result = apply(fs, plan, op);
            if result.is_err() {
                stop.store(true, Ordering::Relaxed);
            }
            Some(result)
        })
        .collect();

    let mut failure = None;
    for (offset, (op, result)) in content.iter().zip(results).enumerate() {
        match result {
            Some(Ok(())) => {
                report.record(op);
                completed.push(op.clone());
            }
            Some(Err(source)) if failure.is_none() => {
                failure = Some((directories.len() + offset, op, source));
            }
            _ => {}
        }
    }

    match failure {
        Some((index, op, source)) => Err(ExecutionError {
            failed: op.clone(),
            index,
            completed,
            source,
        }),
        None => Ok(report),
    }
}

fn apply(fs: &impl FileSystem, plan: &MigrationPlan, op: &FileOperation) -> io::Result<()> {
    let dest = plan.resolve(op);
    match op {
        FileOperation::CreateDirectory { .. } => fs.create_dir_all(&dest),
        FileOperation::WriteFile { content, .. } => fs.write(&dest, content.as_bytes()),
        FileOperation::CopyFile { source, .. } => fs.copy(source, &dest),
    }
}
