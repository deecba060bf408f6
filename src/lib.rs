//! # Docusaurus Migrate
//!
//! Migrates a Docusaurus v1 site (the `website/` directory layout) to the
//! Docusaurus v2 project layout: site config, sidebars, versioned docs,
//! translations and passthrough assets.
//!
//! # Architecture: Plan, Then Execute
//!
//! A migration is split into a pure planning phase and a single I/O phase:
//!
//! ```text
//! 1. Read      website/        →  LegacyProject     (config + discovery, reads only)
//! 2. Plan      LegacyProject   →  MigrationPlan     (ordered file operations, no I/O)
//! 3. Execute   MigrationPlan   →  new site/         (the only step that writes)
//! ```
//!
//! The plan is an ordinary value: it can be printed, fingerprinted and
//! compared between runs before anything touches the target directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Loads `siteConfig.js`/`.json` into a typed [`config::LegacyConfig`] |
//! | [`scan`] | Discovers sidebars, versions, locales and content files |
//! | [`sidebar`] | Converts legacy navigation trees to the typed target schema |
//! | [`versions`] | Versioned docs and per-version sidebars |
//! | [`translations`] | Locale content re-homed under `i18n/` |
//! | [`passthrough`] | Docs, blog, pages and static copies; custom CSS |
//! | [`target`] | Target `docusaurus.config.js` and `package.json` |
//! | [`preset`] | Preset composition, used to validate the generated config |
//! | [`plan`] | Fragment merging, dedup, path normalization, directory hoisting |
//! | [`execute`] | Runs a plan through a [`execute::FileSystem`] |
//! | [`migrate`] | Orchestrates the pipeline; public entry points |
//! | [`naming`] | Doc id and sidebar name conventions |
//! | [`types`] | Shared types: [`types::Artifact`], [`types::Warning`] |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Absence Is Data
//!
//! Optional legacy artifacts are discovered once into
//! [`types::Artifact`]: `Found`, `DeclaredButMissing` or `NotDeclared`.
//! Planners match on it instead of probing the filesystem again, so a
//! registered version with no sidebar file is a normal input, not an error.
//!
//! ## Collisions Fail the Plan
//!
//! Two operations on one destination are a defect. Exact duplicates collapse;
//! anything else stops planning with [`plan::PlanError::Conflict`] before a
//! single file is written.
//!
//! ## Degrade, Don't Abort
//!
//! Only an unreadable config, an unreadable legacy file or a plan conflict
//! abort a run. Empty categories, missing version overlays and empty locales
//! are recorded as [`types::Warning`]s and reported next to the plan.

pub mod config;
pub mod execute;
pub mod migrate;
pub mod naming;
pub mod output;
pub mod passthrough;
pub mod plan;
pub mod preset;
pub mod scan;
pub mod sidebar;
pub mod target;
pub mod translations;
pub mod types;
pub mod versions;

pub use migrate::{MigrateError, MigrateOptions, Migration, execute, migrate, migrate_docusaurus_project};

#[cfg(test)]
pub(crate) mod test_helpers;
