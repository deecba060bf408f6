//! Shared test utilities for the docusaurus-migrate test suite.
//!
//! Provides fixture lookup and plan extractors that work with
//! [`MigrationPlan`] operations.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = fixture_site("simple_website");
//! let migration = migrate(&site, Path::new("/new"), &MigrateOptions::default()).unwrap();
//!
//! assert_eq!(directory_paths(&migration.plan), ["sidebars", "docs"]);
//! assert!(version_ops(&migration.plan).is_empty());
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::plan::{FileOperation, MigrationPlan};

// =========================================================================
// Fixture setup
// =========================================================================

/// Root of a checked-in fixture project (`fixtures/<name>/`).
pub fn fixture_root(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// The legacy `website/` directory of a fixture project, read in place.
pub fn fixture_site(name: &str) -> PathBuf {
    fixture_root(name).join("website")
}

/// Copy a fixture project into `tmp` and return its `website/` directory.
///
/// Tests that execute a plan get an isolated copy so the target directory
/// can live next to it without touching the source fixtures.
pub fn copy_fixture(name: &str, tmp: &TempDir) -> PathBuf {
    let src = fixture_root(name);
    let dest = tmp.path().join(name);
    for entry in WalkDir::new(&src) {
        let entry = entry.unwrap();
        let target = dest.join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
    dest.join("website")
}

// =========================================================================
// Plan extractors
// =========================================================================

/// Paths of all `CreateDirectory` operations, in plan order.
pub fn directory_paths(plan: &MigrationPlan) -> Vec<&str> {
    plan.operations
        .iter()
        .filter(|op| op.is_directory())
        .map(FileOperation::path)
        .collect()
}

/// Paths of all `WriteFile` operations, in plan order.
pub fn written_paths(plan: &MigrationPlan) -> Vec<&str> {
    plan.operations
        .iter()
        .filter(|op| matches!(op, FileOperation::WriteFile { .. }))
        .map(FileOperation::path)
        .collect()
}

/// Destination paths of all `CopyFile` operations, in plan order.
pub fn copied_paths(plan: &MigrationPlan) -> Vec<&str> {
    plan.operations
        .iter()
        .filter(|op| matches!(op, FileOperation::CopyFile { .. }))
        .map(FileOperation::path)
        .collect()
}

/// Content written to `path`. Panics if the plan doesn't write it.
pub fn written<'a>(plan: &'a MigrationPlan, path: &str) -> &'a str {
    plan.operations
        .iter()
        .find_map(|op| match op {
            FileOperation::WriteFile { path: p, content } if p == path => Some(content.as_str()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("plan does not write {path}"))
}

/// Operations touching any versioned output.
pub fn version_ops(plan: &MigrationPlan) -> Vec<&FileOperation> {
    plan.operations
        .iter()
        .filter(|op| {
            let path = op.path();
            path == "versions.json"
                || path.starts_with("versioned_docs")
                || path.starts_with("versioned_sidebars")
        })
        .collect()
}

/// Operations under the i18n tree.
pub fn i18n_ops(plan: &MigrationPlan) -> Vec<&FileOperation> {
    plan.operations
        .iter()
        .filter(|op| op.path() == "i18n" || op.path().starts_with("i18n/"))
        .collect()
}
