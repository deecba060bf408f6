//! CLI output formatting for the migration stages.
//!
//! # Information-First Display
//!
//! The plan summary groups operations by the top-level target entry they
//! create, so the output reads as an inventory of the new site rather than a
//! list of file operations. The full operation list is available separately.
//!
//! # Output Format
//!
//! ## Plan summary
//!
//! ```text
//! Target → migrated/
//!     docusaurus.config.js
//!     package.json
//!     sidebars.js
//!     docs/ (5 files)
//!     sidebars/ (1 file)
//!
//! Versions
//! 001 1.0.1
//! 002 1.0.0
//!
//! Locales
//! 001 ko
//!
//! 4 directories, 4 writes, 5 copies
//! Fingerprint: 3b0c…
//! ```
//!
//! ## Warnings
//!
//! ```text
//! Warnings (2)
//!     sidebar 'docs': dropped empty category 'Empty'
//!     locale fr: no docs, blog, pages or strings, skipped
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::execute::{ExecutionError, ExecutionReport};
use crate::migrate::Migration;
use crate::plan::{FileOperation, MigrationPlan, OperationKind};
use crate::types::Warning;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// `n directories, n writes, n copies`.
fn kind_counts(directories: usize, writes: usize, copies: usize) -> String {
    format!(
        "{}, {}, {}",
        plural(directories, "directory", "directories"),
        plural(writes, "write", "writes"),
        plural(copies, "copy", "copies")
    )
}

/// Top-level entries of a plan's content, in first-seen order, with the
/// number of files under each directory entry.
fn top_level_entries(plan: &MigrationPlan) -> Vec<(String, Option<usize>)> {
    let mut entries: Vec<(String, Option<usize>)> = Vec::new();
    for op in plan.content() {
        let (head, nested) = match op.path().split_once('/') {
            Some((head, _)) => (head, true),
            None => (op.path(), false),
        };
        match entries.iter_mut().find(|(name, _)| name == head) {
            Some((_, Some(count))) => *count += 1,
            Some(_) => {}
            None => entries.push((head.to_string(), nested.then_some(1))),
        }
    }
    entries
}

fn numbered(title: &str, items: &[String]) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    lines.extend(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{} {}", format_index(i + 1), item)),
    );
    lines
}

// ============================================================================
// Plan output
// ============================================================================

/// Format the plan summary: target inventory, versions, locales and counts.
pub fn format_plan_output(migration: &Migration) -> Vec<String> {
    let plan = &migration.plan;
    let mut lines = vec![format!("Target → {}", plan.target_root.display())];
    for (name, files) in top_level_entries(plan) {
        match files {
            Some(n) => lines.push(format!("{}{name}/ ({})", indent(1), plural(n, "file", "files"))),
            None => lines.push(format!("{}{name}", indent(1))),
        }
    }

    if !migration.versions.is_empty() {
        lines.push(String::new());
        lines.extend(numbered("Versions", &migration.versions));
    }
    if !migration.locales.is_empty() {
        lines.push(String::new());
        lines.extend(numbered("Locales", &migration.locales));
    }

    lines.push(String::new());
    lines.push(kind_counts(
        plan.count(OperationKind::CreateDirectory),
        plan.count(OperationKind::WriteFile),
        plan.count(OperationKind::CopyFile),
    ));
    lines.push(format!("Fingerprint: {}", plan.fingerprint()));
    lines
}

pub fn print_plan_output(migration: &Migration) {
    for line in format_plan_output(migration) {
        println!("{}", line);
    }
}

/// Format every operation, one per line, in execution order.
pub fn format_plan_operations(plan: &MigrationPlan) -> Vec<String> {
    plan.operations
        .iter()
        .enumerate()
        .map(|(i, op)| match op {
            FileOperation::CopyFile { source, path } => format!(
                "{} copy {path}\n{}Source: {}",
                format_index(i + 1),
                indent(1),
                source.display()
            ),
            other => format!("{} {other}", format_index(i + 1)),
        })
        .collect()
}

pub fn print_plan_operations(plan: &MigrationPlan) {
    for line in format_plan_operations(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Warnings
// ============================================================================

pub fn format_warnings(warnings: &[Warning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Warnings ({})", warnings.len())];
    lines.extend(warnings.iter().map(|w| format!("{}{w}", indent(1))));
    lines
}

pub fn print_warnings(warnings: &[Warning]) {
    for line in format_warnings(warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// Execution output
// ============================================================================

pub fn format_execution_report(report: &ExecutionReport, target: &Path) -> Vec<String> {
    vec![
        format!(
            "Migrated {} → {}",
            plural(report.total(), "operation", "operations"),
            target.display()
        ),
        format!(
            "{}{}",
            indent(1),
            kind_counts(report.directories, report.writes, report.copies)
        ),
    ]
}

pub fn print_execution_report(report: &ExecutionReport, target: &Path) {
    for line in format_execution_report(report, target) {
        println!("{}", line);
    }
}

/// Describe a failed execution: the failing operation and what already
/// happened, so the partial target can be inspected.
pub fn format_execution_error(error: &ExecutionError) -> Vec<String> {
    let mut lines = vec![
        format!("Failed at operation {}: {}", format_index(error.index + 1), error.failed),
        format!("{}Cause: {}", indent(1), error.source),
        format!(
            "{}Completed before failure: {}",
            indent(1),
            plural(error.completed.len(), "operation", "operations")
        ),
    ];
    lines.extend(error.completed.iter().map(|op| format!("{}{op}", indent(2))));
    lines
}

pub fn print_execution_error(error: &ExecutionError) {
    for line in format_execution_error(error) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::{MigrateOptions, migrate};
    use crate::plan::{PlanBuilder, Stage};
    use crate::test_helpers::*;
    use std::io;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "copy", "copies"), "1 copy");
        assert_eq!(plural(0, "copy", "copies"), "0 copies");
    }

    #[test]
    fn top_level_entries_group_files() {
        let mut builder = PlanBuilder::new();
        builder.add(
            Stage::Passthrough,
            [
                FileOperation::write("sidebars.js", "x"),
                FileOperation::copy("/a", "docs/a.md"),
                FileOperation::copy("/b", "docs/guides/b.md"),
            ],
        );
        let plan = builder.build(Path::new("/out")).unwrap();
        assert_eq!(
            top_level_entries(&plan),
            vec![("sidebars.js".to_string(), None), ("docs".to_string(), Some(2))]
        );
    }

    // =========================================================================
    // Plan output
    // =========================================================================

    #[test]
    fn simple_plan_summary() {
        let migration = migrate(
            &fixture_site("simple_website"),
            Path::new("/new"),
            &MigrateOptions::default(),
        )
        .unwrap();
        let lines = format_plan_output(&migration);

        assert_eq!(lines[0], "Target → /new");
        assert!(lines.contains(&"    docusaurus.config.js".to_string()));
        assert!(lines.contains(&"    docs/ (5 files)".to_string()));
        assert!(lines.contains(&"    sidebars/ (1 file)".to_string()));
        assert!(!lines.iter().any(|l| l == "Versions"));
        assert!(lines.contains(&"2 directories, 4 writes, 5 copies".to_string()));
        assert!(lines.last().unwrap().starts_with("Fingerprint: "));
    }

    #[test]
    fn complex_plan_lists_versions_and_locales() {
        let migration = migrate(
            &fixture_site("complex_website"),
            Path::new("/new"),
            &MigrateOptions::default(),
        )
        .unwrap();
        let lines = format_plan_output(&migration);
        let versions = lines.iter().position(|l| l == "Versions").unwrap();
        assert_eq!(lines[versions + 1], "001 1.0.1");
        assert_eq!(lines[versions + 2], "002 1.0.0");
        let locales = lines.iter().position(|l| l == "Locales").unwrap();
        assert_eq!(lines[locales + 1], "001 ko");
    }

    #[test]
    fn operations_listed_with_sources() {
        let mut builder = PlanBuilder::new();
        builder.add(Stage::Passthrough, [FileOperation::copy("/legacy/a.md", "docs/a.md")]);
        let plan = builder.build(Path::new("/out")).unwrap();
        assert_eq!(
            format_plan_operations(&plan),
            vec!["001 mkdir docs/", "002 copy docs/a.md\n    Source: /legacy/a.md"]
        );
    }

    // =========================================================================
    // Warnings and execution
    // =========================================================================

    #[test]
    fn warnings_block() {
        assert!(format_warnings(&[]).is_empty());
        let lines = format_warnings(&[Warning::MissingSidebars]);
        assert_eq!(lines[0], "Warnings (1)");
        assert!(lines[1].starts_with("    no sidebars.json"));
    }

    #[test]
    fn execution_report_lines() {
        let report = ExecutionReport {
            directories: 2,
            writes: 1,
            copies: 3,
        };
        assert_eq!(
            format_execution_report(&report, Path::new("/out")),
            vec!["Migrated 6 operations → /out", "    2 directories, 1 write, 3 copies"]
        );
    }

    #[test]
    fn execution_error_lists_completed() {
        let error = ExecutionError {
            failed: FileOperation::write("docs/a.md", "x"),
            index: 1,
            completed: vec![FileOperation::create_dir("docs")],
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let lines = format_execution_error(&error);
        assert_eq!(lines[0], "Failed at operation 002: write docs/a.md");
        assert_eq!(lines[1], "    Cause: denied");
        assert_eq!(lines[2], "    Completed before failure: 1 operation");
        assert_eq!(lines[3], "        mkdir docs/");
    }
}
