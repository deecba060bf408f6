//! Shared types used across the migration stages.
//!
//! Discovery results, source file references and non-fatal warnings flow from
//! the scan stage through every planner, so they live here rather than in any
//! single stage module.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Result of looking up one optional legacy artifact.
///
/// Discovery records *why* something is absent so planners never have to
/// re-probe the filesystem:
/// - `Found`: the artifact exists and was read
/// - `DeclaredButMissing`: something (registry, config) says it should exist, but it doesn't
/// - `NotDeclared`: nothing refers to it and it isn't there
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Artifact<T> {
    Found(T),
    DeclaredButMissing,
    NotDeclared,
}

impl<T> Artifact<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Artifact::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Artifact::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Artifact<U> {
        match self {
            Artifact::Found(value) => Artifact::Found(f(value)),
            Artifact::DeclaredButMissing => Artifact::DeclaredButMissing,
            Artifact::NotDeclared => Artifact::NotDeclared,
        }
    }
}

/// A file discovered in the legacy tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Absolute (or caller-rooted) path of the legacy file.
    pub source: PathBuf,
    /// Path relative to the directory it was discovered under, `/`-separated.
    pub relative: String,
}

/// A non-fatal degradation recorded while planning.
///
/// Warnings never abort a migration; they are reported alongside the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An expression in `siteConfig.js` could not be evaluated and became `null`.
    UnevaluatedExpression { expression: String },
    /// The project has no `sidebars.json`.
    MissingSidebars,
    /// A sidebar category had no resolvable children and was dropped.
    EmptyCategory { sidebar: String, label: String },
    /// A sidebar entry was neither a doc reference nor a category.
    UnresolvableItem { sidebar: String, item: String },
    /// `customDocsPath` points at a directory that doesn't exist.
    DocsMissing { path: String },
    /// A registered version has no sidebar overlay; migrated with docs only.
    VersionSidebarMissing { version: String },
    /// A registered version has no doc snapshot directory.
    VersionDocsMissing { version: String },
    /// A version with neither sidebar nor docs was removed from the target list.
    VersionDropped { version: String },
    /// A locale directory had no docs, blog, pages or strings.
    LocaleWithoutContent { locale: String },
    /// Files in a locale directory that belong to no content type.
    LocaleFilesSkipped { locale: String, files: Vec<String> },
    /// Two legacy strings flattened to one id; the first one is kept.
    DuplicateStringKey { locale: String, key: String },
    /// Content for the default locale lives in the main tree, not under i18n.
    DefaultLocaleSkipped { locale: String },
    /// Legacy React pages were copied but must be ported by hand.
    PagesNeedPorting { count: usize },
    /// A `pages/en/` file maps onto a top-level page that is copied instead.
    PageShadowed { path: String, target: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnevaluatedExpression { expression } => {
                write!(f, "config expression not evaluated, using null: {expression}")
            }
            Warning::MissingSidebars => write!(f, "no sidebars.json found, no sidebars migrated"),
            Warning::EmptyCategory { sidebar, label } => {
                write!(f, "sidebar '{sidebar}': dropped empty category '{label}'")
            }
            Warning::UnresolvableItem { sidebar, item } => {
                write!(f, "sidebar '{sidebar}': dropped unresolvable item {item}")
            }
            Warning::DocsMissing { path } => write!(f, "docs directory not found: {path}"),
            Warning::VersionSidebarMissing { version } => {
                write!(f, "version {version}: no sidebar overlay, migrated docs only")
            }
            Warning::VersionDocsMissing { version } => {
                write!(f, "version {version}: no doc snapshot, target directory left empty")
            }
            Warning::VersionDropped { version } => {
                write!(f, "version {version}: no sidebar or docs, dropped from versions.json")
            }
            Warning::LocaleWithoutContent { locale } => {
                write!(f, "locale {locale}: no docs, blog, pages or strings, skipped")
            }
            Warning::LocaleFilesSkipped { locale, files } => {
                write!(f, "locale {locale}: skipped unrecognized files: {}", files.join(", "))
            }
            Warning::DuplicateStringKey { locale, key } => {
                write!(f, "locale {locale}: duplicate string id '{key}', kept the first")
            }
            Warning::DefaultLocaleSkipped { locale } => {
                write!(f, "locale {locale} is the default locale, skipped")
            }
            Warning::PagesNeedPorting { count } => {
                write!(f, "{count} legacy page(s) copied to src/pages, port them to React by hand")
            }
            Warning::PageShadowed { path, target } => {
                write!(f, "page {path} skipped, {target} comes from the top-level page")
            }
        }
    }
}

/// Pretty-printed JSON file content with a trailing newline.
pub fn json_file(value: &serde_json::Value) -> String {
    format!("{value:#}\n")
}

/// Join path components of a relative path with `/`, independent of platform.
pub fn slash_path(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
