//! Migration orchestration.
//!
//! Drives the fixed pipeline:
//!
//! ```text
//! config ─→ scan ─→ sidebars ─→ versions? ─→ translations? ─→ passthrough
//!                                                               │
//!           validate presets ←─ target config + package.json ←──┘
//!                  │
//!                  └─→ PlanBuilder::build ─→ MigrationPlan ─→ execute
//! ```
//!
//! [`migrate`] only reads; [`execute`] is the only step that writes. A
//! config read failure aborts before anything else runs.

use crate::config::{self, ConfigReadError};
use crate::execute::{self, ExecutionError, ExecutionReport, FileSystem, LocalFileSystem};
use crate::passthrough;
use crate::plan::{MigrationPlan, PlanBuilder, PlanError, Stage};
use crate::preset::{LoadedPresets, PresetError, PresetRegistry};
use crate::scan::{self, ScanError, ScanOptions};
use crate::sidebar;
use crate::target::{self, TargetConfig, TargetContext};
use crate::translations;
use crate::types::Warning;
use crate::versions::{self, EmptyVersionPolicy};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("config error: {0}")]
    Config(#[from] ConfigReadError),
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("preset error: {0}")]
    Preset(#[from] PresetError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Feature flags for one migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrateOptions {
    pub include_versions: bool,
    pub include_translations: bool,
    pub empty_versions: EmptyVersionPolicy,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            include_versions: true,
            include_translations: true,
            empty_versions: EmptyVersionPolicy::Keep,
        }
    }
}

/// Everything a planning run produces.
#[derive(Debug)]
pub struct Migration {
    pub plan: MigrationPlan,
    pub warnings: Vec<Warning>,
    pub target_config: TargetConfig,
    /// The generated `presets`, resolved.
    pub presets: LoadedPresets,
    /// Target version list; empty when versions were not migrated.
    pub versions: Vec<String>,
    /// Migrated locales, default locale excluded.
    pub locales: Vec<String>,
}

/// Build the migration plan for a legacy site directory. Reads only.
pub fn migrate(
    site_dir: &Path,
    new_dir: &Path,
    options: &MigrateOptions,
) -> Result<Migration, MigrateError> {
    let loaded = config::load_legacy_config(site_dir)?;
    let mut warnings: Vec<Warning> = loaded
        .unresolved
        .iter()
        .map(|expression| Warning::UnevaluatedExpression {
            expression: expression.clone(),
        })
        .collect();

    let project = scan::scan(
        site_dir,
        loaded,
        &ScanOptions {
            include_versions: options.include_versions,
            include_translations: options.include_translations,
        },
    )?;
    let mut builder = PlanBuilder::new();

    let sidebars = sidebar::plan_sidebars(&project.sidebars);
    warnings.extend(sidebars.warnings);
    builder.add(Stage::Sidebars, sidebars.operations);

    let mut version_list = Vec::new();
    if options.include_versions {
        let versions = versions::plan_versions(&project.versions, options.empty_versions);
        warnings.extend(versions.warnings);
        builder.add(Stage::Versions, versions.operations);
        version_list = versions.versions;
    }

    let mut locales = Vec::new();
    if options.include_translations {
        let translations = translations::plan_translations(&project.locales);
        warnings.extend(translations.warnings);
        builder.add(Stage::Translations, translations.operations);
        locales = translations.locales;
    }

    let assets = passthrough::plan_passthrough(&project);
    warnings.extend(assets.warnings);
    builder.add(Stage::Passthrough, assets.operations);

    let legacy_config = &project.config.config;
    let target_config = target::build_target_config(
        legacy_config,
        &TargetContext {
            has_blog: assets.has_blog,
            custom_css: assets.custom_css,
            locales: locales.clone(),
        },
    );
    let manifest = target::build_package_manifest(project.package.found(), legacy_config);
    builder.add(
        Stage::Config,
        target::plan_target_files(&target_config, &manifest)?,
    );

    let presets = PresetRegistry::builtin().load_value(&target_config.presets)?;
    let plan = builder.build(new_dir)?;

    Ok(Migration {
        plan,
        warnings,
        target_config,
        presets,
        versions: version_list,
        locales,
    })
}

/// Execute a plan against the real filesystem.
pub fn execute(plan: &MigrationPlan) -> Result<ExecutionReport, ExecutionError> {
    execute_with(&LocalFileSystem, plan)
}

pub fn execute_with(
    fs: &impl FileSystem,
    plan: &MigrationPlan,
) -> Result<ExecutionReport, ExecutionError> {
    execute::execute_plan(fs, plan)
}

/// Plan and execute in one call.
pub fn migrate_docusaurus_project(
    site_dir: &Path,
    new_dir: &Path,
    include_versions: bool,
    include_translations: bool,
) -> Result<(), MigrateError> {
    let options = MigrateOptions {
        include_versions,
        include_translations,
        ..MigrateOptions::default()
    };
    let migration = migrate(site_dir, new_dir, &options)?;
    execute(&migration.plan)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::tests::{MockFileSystem, RecordedOp};
    use crate::plan::{FileOperation, OperationKind};
    use crate::test_helpers::*;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;

    fn plan_fixture(name: &str, options: MigrateOptions) -> Migration {
        migrate(&fixture_site(name), Path::new("/new"), &options).unwrap()
    }

    fn all() -> MigrateOptions {
        MigrateOptions::default()
    }

    fn none() -> MigrateOptions {
        MigrateOptions {
            include_versions: false,
            include_translations: false,
            ..MigrateOptions::default()
        }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    #[test]
    fn simple_website_plan() {
        let migration = plan_fixture("simple_website", all());
        let plan = &migration.plan;

        assert_eq!(
            written_paths(plan),
            ["docusaurus.config.js", "package.json", "sidebars/docs.json", "sidebars.js"]
        );
        assert_eq!(
            copied_paths(plan),
            ["docs/doc1.md", "docs/doc2.md", "docs/doc3.md", "docs/doc4.md", "docs/doc5.md"]
        );
        assert_eq!(directory_paths(plan), ["sidebars", "docs"]);
        assert!(version_ops(plan).is_empty());
        assert!(i18n_ops(plan).is_empty());
        assert!(migration.warnings.is_empty());
    }

    #[test]
    fn simple_website_sidebar_content() {
        let plan = plan_fixture("simple_website", all()).plan;
        let sidebar: Value = serde_json::from_str(written(&plan, "sidebars/docs.json")).unwrap();
        assert_eq!(
            sidebar,
            json!([
                {"type": "category", "label": "Testing", "items": [
                    {"type": "doc", "id": "doc1"},
                    {"type": "doc", "id": "doc2"},
                ]},
                {"type": "category", "label": "Docusaurus", "items": [
                    {"type": "doc", "id": "doc3"},
                    {"type": "doc", "id": "doc4"},
                    {"type": "doc", "id": "doc5"},
                ]},
            ])
        );
    }

    #[test]
    fn complex_website_plan() {
        let migration = plan_fixture("complex_website", all());
        let plan = &migration.plan;

        // One sidebar file per legacy sidebar.
        let sidebar_files: Vec<&str> = written_paths(plan)
            .into_iter()
            .filter(|p| p.starts_with("sidebars/"))
            .collect();
        assert_eq!(sidebar_files, ["sidebars/docs.json", "sidebars/api.json"]);

        // One versioned-docs directory per version with matching copy counts.
        assert_eq!(migration.versions, ["1.0.1", "1.0.0"]);
        for (version, docs) in [("1.0.1", 3), ("1.0.0", 2)] {
            let dir = format!("versioned_docs/version-{version}");
            assert!(plan.find(&dir).is_some_and(FileOperation::is_directory));
            let copies = copied_paths(plan)
                .iter()
                .filter(|p| p.starts_with(&format!("{dir}/")))
                .count();
            assert_eq!(copies, docs, "version {version}");
        }
        let mapping: Value = serde_json::from_str(written(plan, "versioned_sidebars.json")).unwrap();
        assert_eq!(
            mapping,
            json!({
                "1.0.1": "versioned_sidebars/version-1.0.1-sidebars.json",
                "1.0.0": "versioned_sidebars/version-1.0.0-sidebars.json",
            })
        );

        // One i18n subtree per migrated locale.
        assert_eq!(migration.locales, ["ko"]);
        assert!(plan.find("i18n/ko").is_some());
        assert!(plan.find("i18n/ko/code.json").is_some());
        assert!(
            plan.find("i18n/ko/docusaurus-plugin-content-docs/current/doc1.md")
                .is_some()
        );
        assert!(
            plan.find("i18n/ko/docusaurus-plugin-content-docs/current/doc2.md")
                .is_some()
        );
        assert!(migration.warnings.contains(&Warning::LocaleFilesSkipped {
            locale: "fr".into(),
            files: vec!["README.txt".into()],
        }));
        assert!(migration.warnings.contains(&Warning::LocaleWithoutContent {
            locale: "fr".into()
        }));
        assert!(migration.warnings.contains(&Warning::EmptyCategory {
            sidebar: "docs".into(),
            label: "Empty".into()
        }));
    }

    #[test]
    fn complex_website_target_config() {
        let migration = plan_fixture("complex_website", all());
        let config = &migration.target_config;

        assert_eq!(config.title, "Complex Site");
        assert_eq!(config.i18n.as_ref().map(|i| i.locales.clone()), Some(vec!["en".into(), "ko".into()]));
        assert_eq!(config.custom_fields["users"][0]["caption"], "User1");
        assert_eq!(config.custom_fields["fonts"]["myFont"][0], "Times New Roman");
        assert_eq!(
            config.theme_config["footer"]["copyright"],
            "Copyright © ${new Date().getFullYear()} Complex Co."
        );
        assert!(migration.warnings.iter().any(|w| matches!(w, Warning::UnevaluatedExpression { .. })));
        assert_eq!(migration.presets.plugins.len(), 4);
        assert_eq!(migration.presets.themes.len(), 1);

        let manifest: Value = serde_json::from_str(written(&migration.plan, "package.json")).unwrap();
        assert!(manifest["devDependencies"].get("docusaurus").is_none());
        assert_eq!(manifest["dependencies"]["@docusaurus/core"], target::DOCUSAURUS_VERSION);
    }

    #[test]
    fn missing_versions_stay_listed() {
        let migration = plan_fixture("missing_version_website", all());
        let plan = &migration.plan;

        let list: Value = serde_json::from_str(written(plan, "versions.json")).unwrap();
        assert_eq!(list, json!(["1.0.1", "1.0.0", "0.9.0"]));

        let mapping: Value = serde_json::from_str(written(plan, "versioned_sidebars.json")).unwrap();
        assert_eq!(
            mapping,
            json!({"1.0.1": "versioned_sidebars/version-1.0.1-sidebars.json"})
        );
        assert!(plan.find("versioned_docs/version-0.9.0").is_some());
        assert!(migration.warnings.contains(&Warning::VersionSidebarMissing {
            version: "1.0.0".into()
        }));
        assert!(migration.warnings.contains(&Warning::VersionDocsMissing {
            version: "0.9.0".into()
        }));
    }

    #[test]
    fn missing_versions_dropped_by_policy() {
        let migration = plan_fixture(
            "missing_version_website",
            MigrateOptions {
                empty_versions: EmptyVersionPolicy::Drop,
                ..all()
            },
        );
        let list: Value = serde_json::from_str(written(&migration.plan, "versions.json")).unwrap();
        assert_eq!(list, json!(["1.0.1", "1.0.0"]));
        assert!(migration.plan.find("versioned_docs/version-0.9.0").is_none());
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn flags_gate_versions_and_translations() {
        let migration = plan_fixture("complex_website", none());
        assert!(version_ops(&migration.plan).is_empty());
        assert!(i18n_ops(&migration.plan).is_empty());
        assert!(migration.target_config.i18n.is_none());

        let versions_only = plan_fixture(
            "complex_website",
            MigrateOptions {
                include_translations: false,
                ..all()
            },
        );
        assert!(!version_ops(&versions_only.plan).is_empty());
        assert!(i18n_ops(&versions_only.plan).is_empty());
    }

    #[test]
    fn planning_is_deterministic() {
        for name in ["simple_website", "complex_website", "missing_version_website"] {
            let a = plan_fixture(name, all());
            let b = plan_fixture(name, all());
            assert_eq!(a.plan, b.plan, "{name}");
            assert_eq!(a.plan.fingerprint(), b.plan.fingerprint());
        }
    }

    #[test]
    fn directories_precede_content_in_every_plan() {
        let plan = plan_fixture("complex_website", all()).plan;
        let structural = plan.structural_len();
        assert!(plan.content().iter().all(|op| !op.is_directory()));
        for op in plan.content() {
            let parent = op.path().rsplit_once('/').map(|(p, _)| p);
            if let Some(parent) = parent {
                let pos = plan.operations.iter().position(|o| o.path() == parent).unwrap();
                assert!(pos < structural, "{parent} not hoisted");
            }
        }
    }

    #[test]
    fn planning_never_writes_and_execution_writes_everything() {
        let tmp = TempDir::new().unwrap();
        let site = copy_fixture("complex_website", &tmp);
        let new_dir = tmp.path().join("migrated");

        let migration = migrate(&site, &new_dir, &all()).unwrap();
        assert!(!new_dir.exists());

        let fs = MockFileSystem::new();
        assert!(fs.get_operations().is_empty());
        let report = execute_with(&fs, &migration.plan).unwrap();
        let ops = fs.get_operations();
        // Every plan operation plus the target root.
        assert_eq!(ops.len(), migration.plan.len() + 1);
        assert_eq!(ops[0], RecordedOp::CreateDir(new_dir.to_string_lossy().to_string()));
        assert_eq!(report.total(), migration.plan.len());
        assert_eq!(
            ops.iter().filter(|op| matches!(op, RecordedOp::CreateDir(_))).count(),
            migration.plan.count(OperationKind::CreateDirectory) + 1
        );
        assert!(!new_dir.exists());
    }

    #[test]
    fn migrate_docusaurus_project_writes_target_tree() {
        let tmp = TempDir::new().unwrap();
        let site = copy_fixture("complex_website", &tmp);
        let new_dir = tmp.path().join("migrated");

        migrate_docusaurus_project(&site, &new_dir, true, true).unwrap();

        let config = fs::read_to_string(new_dir.join("docusaurus.config.js")).unwrap();
        assert!(config.starts_with("module.exports = {"));
        assert!(new_dir.join("sidebars.js").is_file());
        assert!(new_dir.join("versioned_docs/version-1.0.0/doc1.md").is_file());
        assert!(new_dir.join("i18n/ko/code.json").is_file());
        assert!(new_dir.join("static/img/logo.svg").is_file());
        assert!(new_dir.join("src/css/customTheme.css").is_file());
    }

    #[test]
    fn config_only_site_migrates_into_fresh_directory() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("website");
        fs::create_dir_all(&site).unwrap();
        fs::write(
            site.join("siteConfig.js"),
            "module.exports = { title: 'T', url: 'https://t.dev', baseUrl: '/' };",
        )
        .unwrap();
        let new_dir = tmp.path().join("out/migrated");

        let migration = migrate(&site, &new_dir, &all()).unwrap();
        assert_eq!(migration.plan.structural_len(), 0);

        migrate_docusaurus_project(&site, &new_dir, true, true).unwrap();
        assert!(new_dir.join("docusaurus.config.js").is_file());
        assert!(new_dir.join("package.json").is_file());
        assert!(new_dir.join("sidebars.js").is_file());
    }

    #[test]
    fn missing_config_aborts() {
        let tmp = TempDir::new().unwrap();
        let err = migrate(tmp.path(), &tmp.path().join("new"), &all()).unwrap_err();
        assert!(matches!(err, MigrateError::Config(ConfigReadError::NotFound(_))));
    }
}
