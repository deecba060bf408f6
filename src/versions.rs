//! Versioned docs migration.
//!
//! The version registry is authoritative for which versions exist. Each
//! registered version gets its target directory and doc copies; a sidebar is
//! written only when the legacy overlay exists.
//!
//! ```text
//! versions.json                                    # registry, same order
//! versioned_docs/version-1.0.0/**                  # doc snapshot copies
//! versioned_sidebars/version-1.0.0-sidebars.json   # converted overlay
//! versioned_sidebars.json                          # { "1.0.0": "<overlay file>" }
//! ```
//!
//! A version with neither sidebar nor docs is governed by
//! [`EmptyVersionPolicy`].

use crate::naming;
use crate::plan::FileOperation;
use crate::scan::{LegacyVersion, VERSIONED_DOCS_DIR, VERSIONED_SIDEBARS_DIR, VERSIONS_FILE};
use crate::sidebar::{self, NamedSidebar};
use crate::types::{Artifact, Warning, json_file};
use serde::Serialize;
use serde_json::{Map, Value};

/// Aggregate mapping of version id to its sidebar file.
pub const VERSIONED_SIDEBARS_MAPPING: &str = "versioned_sidebars.json";

/// What to do with a registered version whose sidebar and docs are both absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyVersionPolicy {
    /// Keep it in the version list with an empty docs directory.
    #[default]
    Keep,
    /// Remove it from the version list and emit nothing for it.
    Drop,
}

#[derive(Debug, Default)]
pub struct VersionPlan {
    /// Target version list, registry order.
    pub versions: Vec<String>,
    /// `(version, sidebar file)` for versions that have a sidebar overlay.
    pub sidebar_files: Vec<(String, String)>,
    /// Converted sidebars per version, same order as `sidebar_files`.
    pub sidebars: Vec<(String, Vec<NamedSidebar>)>,
    pub operations: Vec<FileOperation>,
    pub warnings: Vec<Warning>,
}

impl VersionPlan {
    /// Number of doc copies planned for one version.
    pub fn doc_copies(&self, version: &str) -> usize {
        let prefix = format!("{VERSIONED_DOCS_DIR}/{}/", naming::version_dir_name(version));
        self.operations
            .iter()
            .filter(|op| matches!(op, FileOperation::CopyFile { path, .. } if path.starts_with(&prefix)))
            .count()
    }
}

/// Plan the versioned part of the target.
///
/// Without a registry nothing is planned, not even an empty `versions.json`.
pub fn plan_versions(
    registry: &Artifact<Vec<LegacyVersion>>,
    policy: EmptyVersionPolicy,
) -> VersionPlan {
    let mut plan = VersionPlan::default();
    let Some(versions) = registry.found() else {
        return plan;
    };

    for version in versions {
        let id = version.id.as_str();
        if !version.sidebar.is_found() && !version.docs.is_found() && policy == EmptyVersionPolicy::Drop {
            plan.warnings.push(Warning::VersionDropped {
                version: id.to_string(),
            });
            continue;
        }
        plan.versions.push(id.to_string());

        let docs_dir = format!("{VERSIONED_DOCS_DIR}/{}", naming::version_dir_name(id));
        plan.operations.push(FileOperation::create_dir(&docs_dir));
        match &version.docs {
            Artifact::Found(files) => {
                plan.operations.extend(files.iter().map(|file| {
                    FileOperation::copy(file.source.clone(), format!("{docs_dir}/{}", file.relative))
                }));
            }
            _ => plan.warnings.push(Warning::VersionDocsMissing {
                version: id.to_string(),
            }),
        }

        match &version.sidebar {
            Artifact::Found(value) => {
                let sidebars = sidebar::convert_sidebars(value, Some(id), &mut plan.warnings);
                let file = format!(
                    "{VERSIONED_SIDEBARS_DIR}/{}",
                    naming::version_sidebar_file_name(id)
                );
                plan.operations.push(FileOperation::write(
                    &file,
                    json_file(&sidebar::sidebars_value(&sidebars)),
                ));
                plan.sidebar_files.push((id.to_string(), file));
                plan.sidebars.push((id.to_string(), sidebars));
            }
            _ => plan.warnings.push(Warning::VersionSidebarMissing {
                version: id.to_string(),
            }),
        }
    }

    let list = Value::Array(plan.versions.iter().map(|v| Value::from(v.as_str())).collect());
    plan.operations.push(FileOperation::write(VERSIONS_FILE, json_file(&list)));

    let mapping: Map<String, Value> = plan
        .sidebar_files
        .iter()
        .map(|(v, file)| (v.clone(), Value::from(file.as_str())))
        .collect();
    plan.operations.push(FileOperation::write(
        VERSIONED_SIDEBARS_MAPPING,
        json_file(&Value::Object(mapping)),
    ));
    plan
}
