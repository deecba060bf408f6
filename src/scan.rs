//! Legacy project discovery.
//!
//! Stage 1 of the migration pipeline. Reads the legacy website directory and
//! produces a [`LegacyProject`]: every artifact the planners need, already
//! parsed, with absence recorded as an [`Artifact`] state instead of being
//! re-derived later. Discovery only reads; it never writes.
//!
//! ## Directory Structure
//!
//! ```text
//! project/
//! ├── docs/                               # Docs (or `customDocsPath`)
//! └── website/                            # The site directory passed in
//!     ├── siteConfig.js
//!     ├── sidebars.json
//!     ├── package.json
//!     ├── versions.json                   # Version registry, newest first
//!     ├── versioned_docs/version-1.0.0/   # Per-version doc snapshot
//!     ├── versioned_sidebars/version-1.0.0-sidebars.json
//!     ├── translated_docs/ko/             # *.md, docs/, blog/, pages/, strings.json
//!     ├── i18n/ko.json                    # Legacy strings dictionary
//!     ├── blog/
//!     ├── pages/en/
//!     └── static/
//! ```
//!
//! Version and locale lookups are independent reads, so they run in parallel
//! with rayon; results keep registry/directory order.

use crate::config::{self, LoadedConfig};
use crate::naming;
use crate::types::{Artifact, SourceFile, slash_path};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const SIDEBARS_FILE: &str = "sidebars.json";
pub const VERSIONS_FILE: &str = "versions.json";
pub const VERSIONED_DOCS_DIR: &str = "versioned_docs";
pub const VERSIONED_SIDEBARS_DIR: &str = "versioned_sidebars";
pub const TRANSLATIONS_DIR: &str = "translated_docs";
pub const LEGACY_STRINGS_DIR: &str = "i18n";
pub const LOCALE_STRINGS_FILE: &str = "strings.json";
pub const PACKAGE_FILE: &str = "package.json";
pub const BLOG_DIR: &str = "blog";
pub const PAGES_DIR: &str = "pages";
pub const STATIC_DIR: &str = "static";

const LOCALE_SUBDIRS: &[&str] = &["docs", BLOG_DIR, PAGES_DIR];
const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Version registry {0} must be an array of version strings")]
    InvalidRegistry(PathBuf),
}

/// Which optional parts of the legacy tree to discover.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub include_versions: bool,
    pub include_translations: bool,
}

/// Everything discovered in a legacy project.
#[derive(Debug, Clone)]
pub struct LegacyProject {
    /// The legacy website directory.
    pub site_dir: PathBuf,
    pub config: LoadedConfig,
    /// Raw `sidebars.json`; parsed into a navigation tree by [`crate::sidebar`].
    pub sidebars: Artifact<Value>,
    pub package: Artifact<Value>,
    /// `NotDeclared` when versions were not scanned or `versions.json` is absent.
    pub versions: Artifact<Vec<LegacyVersion>>,
    /// `NotDeclared` when translations were not scanned or the root is absent.
    pub locales: Artifact<Vec<LegacyLocale>>,
    pub docs: Artifact<Vec<SourceFile>>,
    pub blog: Artifact<Vec<SourceFile>>,
    pub pages: Artifact<Vec<SourceFile>>,
    pub static_files: Artifact<Vec<SourceFile>>,
}

/// One entry of the version registry and its optional artifacts.
#[derive(Debug, Clone)]
pub struct LegacyVersion {
    pub id: String,
    pub sidebar: Artifact<Value>,
    pub docs: Artifact<Vec<SourceFile>>,
}

/// One locale directory under the translations root.
///
/// Translated docs are read from `docs/` and from Markdown files placed
/// directly in the locale directory; a `docs/` file wins over a loose file
/// with the same relative path.
#[derive(Debug, Clone)]
pub struct LegacyLocale {
    pub code: String,
    pub docs: Artifact<Vec<SourceFile>>,
    pub blog: Artifact<Vec<SourceFile>>,
    pub pages: Artifact<Vec<SourceFile>>,
    pub strings: Artifact<Value>,
    /// Files in the locale directory that belong to no content type,
    /// relative to it. Reported, never copied.
    pub unrecognized: Vec<String>,
}

impl LegacyLocale {
    /// Whether any recognized content subtype was found.
    pub fn has_content(&self) -> bool {
        self.docs.is_found() || self.blog.is_found() || self.pages.is_found() || self.strings.is_found()
    }
}

/// Discover a legacy project. The config must already be loaded: a project
/// without a readable config is never scanned.
pub fn scan(
    site_dir: &Path,
    config: LoadedConfig,
    options: &ScanOptions,
) -> Result<LegacyProject, ScanError> {
    let project_root = site_dir.parent().unwrap_or(site_dir);
    let docs_declared = config.config.custom_docs_path.is_some();
    let docs = discover_files(&project_root.join(config.config.docs_dir()), docs_declared)?;

    let versions = if options.include_versions {
        scan_versions(site_dir)?
    } else {
        Artifact::NotDeclared
    };
    let locales = if options.include_translations {
        scan_locales(site_dir)?
    } else {
        Artifact::NotDeclared
    };

    Ok(LegacyProject {
        site_dir: site_dir.to_path_buf(),
        sidebars: read_json(&site_dir.join(SIDEBARS_FILE), false)?,
        package: read_json(&site_dir.join(PACKAGE_FILE), false)?,
        versions,
        locales,
        docs,
        blog: discover_files(&site_dir.join(BLOG_DIR), false)?,
        pages: discover_files(&site_dir.join(PAGES_DIR), false)?,
        static_files: discover_files(&site_dir.join(STATIC_DIR), false)?,
        config,
    })
}

/// Read the version registry and every declared version's artifacts.
fn scan_versions(site_dir: &Path) -> Result<Artifact<Vec<LegacyVersion>>, ScanError> {
    let registry_path = site_dir.join(VERSIONS_FILE);
    let Artifact::Found(registry) = read_json(&registry_path, false)? else {
        return Ok(Artifact::NotDeclared);
    };
    let ids = registry
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| ScanError::InvalidRegistry(registry_path.clone()))?;

    let versions = ids
        .into_par_iter()
        .map(|id| {
            let sidebar_path = site_dir
                .join(VERSIONED_SIDEBARS_DIR)
                .join(naming::version_sidebar_file_name(&id));
            let docs_dir = site_dir
                .join(VERSIONED_DOCS_DIR)
                .join(naming::version_dir_name(&id));
            Ok(LegacyVersion {
                sidebar: read_json(&sidebar_path, true)?,
                docs: discover_files(&docs_dir, true)?,
                id,
            })
        })
        .collect::<Result<Vec<_>, ScanError>>()?;
    Ok(Artifact::Found(versions))
}

/// Read every locale directory under the translations root.
fn scan_locales(site_dir: &Path) -> Result<Artifact<Vec<LegacyLocale>>, ScanError> {
    let root = site_dir.join(TRANSLATIONS_DIR);
    if !root.is_dir() {
        return Ok(Artifact::NotDeclared);
    }
    let mut codes: Vec<String> = fs::read_dir(&root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    codes.sort();

    let locales = codes
        .into_par_iter()
        .map(|code| {
            let dir = root.join(&code);
            let strings = match read_json(&dir.join(LOCALE_STRINGS_FILE), false)? {
                Artifact::Found(v) => Artifact::Found(v),
                _ => read_json(&site_dir.join(LEGACY_STRINGS_DIR).join(format!("{code}.json")), false)?,
            };
            let (docs, unrecognized) = locale_docs(&dir)?;
            Ok(LegacyLocale {
                docs,
                blog: discover_files(&dir.join(BLOG_DIR), false)?,
                pages: discover_files(&dir.join(PAGES_DIR), false)?,
                strings,
                unrecognized,
                code,
            })
        })
        .collect::<Result<Vec<_>, ScanError>>()?;
    Ok(Artifact::Found(locales))
}

/// Translated docs of one locale plus the loose files that are not docs.
fn locale_docs(dir: &Path) -> Result<(Artifact<Vec<SourceFile>>, Vec<String>), ScanError> {
    let mut docs = discover_files(&dir.join("docs"), false)?;
    let Artifact::Found(all) = discover_files(dir, false)? else {
        return Ok((docs, Vec::new()));
    };

    let mut unrecognized = Vec::new();
    let mut loose = Vec::new();
    for file in all {
        let in_subdir = file
            .relative
            .split_once('/')
            .is_some_and(|(top, _)| LOCALE_SUBDIRS.contains(&top));
        if in_subdir || file.relative == LOCALE_STRINGS_FILE {
            continue;
        }
        let is_doc = Path::new(&file.relative)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_doc {
            loose.push(file);
        } else {
            unrecognized.push(file.relative);
        }
    }

    if !loose.is_empty() {
        let mut files = match docs {
            Artifact::Found(files) => files,
            _ => Vec::new(),
        };
        for file in loose {
            if files.iter().any(|f| f.relative == file.relative) {
                unrecognized.push(file.relative);
            } else {
                files.push(file);
            }
        }
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        docs = Artifact::Found(files);
    }
    unrecognized.sort();
    Ok((docs, unrecognized))
}

/// Read and leniently parse a JSON artifact.
///
/// `declared` selects the absence state: something referenced the file
/// (`DeclaredButMissing`) or nothing did (`NotDeclared`).
pub fn read_json(path: &Path, declared: bool) -> Result<Artifact<Value>, ScanError> {
    if !path.is_file() {
        return Ok(absent(declared));
    }
    let content = fs::read_to_string(path)?;
    config::parse_lenient_json(&content)
        .map(Artifact::Found)
        .map_err(|message| ScanError::Parse {
            path: path.to_path_buf(),
            message,
        })
}

/// List every non-hidden file under `dir`, sorted by relative path.
pub fn discover_files(dir: &Path, declared: bool) -> Result<Artifact<Vec<SourceFile>>, ScanError> {
    if !dir.is_dir() {
        return Ok(absent(declared));
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map(slash_path)
            .unwrap_or_else(|_| entry.file_name().to_string_lossy().into_owned());
        files.push(SourceFile {
            source: entry.path().to_path_buf(),
            relative,
        });
    }
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(Artifact::Found(files))
}

fn absent<T>(declared: bool) -> Artifact<T> {
    if declared {
        Artifact::DeclaredButMissing
    } else {
        Artifact::NotDeclared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_legacy_config;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn minimal_site(tmp: &TempDir) -> PathBuf {
        let site = tmp.path().join("website");
        write(
            &site.join("siteConfig.js"),
            "module.exports = { title: 'T', url: 'https://t.dev', baseUrl: '/' };",
        );
        site
    }

    fn scan_site(site: &Path, options: ScanOptions) -> LegacyProject {
        let config = load_legacy_config(site).unwrap();
        scan(site, config, &options).unwrap()
    }

    #[test]
    fn missing_optional_artifacts_are_not_declared() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        let project = scan_site(&site, ScanOptions { include_versions: true, include_translations: true });

        assert_eq!(project.sidebars, Artifact::NotDeclared);
        assert!(matches!(project.versions, Artifact::NotDeclared));
        assert!(matches!(project.locales, Artifact::NotDeclared));
        assert_eq!(project.docs, Artifact::NotDeclared);
        assert_eq!(project.blog, Artifact::NotDeclared);
    }

    #[test]
    fn declared_custom_docs_path_missing() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("website");
        write(
            &site.join("siteConfig.js"),
            "module.exports = { title: 'T', url: 'u', baseUrl: '/', customDocsPath: 'documentation' };",
        );
        let project = scan_site(&site, ScanOptions::default());
        assert_eq!(project.docs, Artifact::DeclaredButMissing);
    }

    #[test]
    fn docs_discovered_sorted_and_hidden_skipped() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&tmp.path().join("docs/b.md"), "b");
        write(&tmp.path().join("docs/a.md"), "a");
        write(&tmp.path().join("docs/guides/c.md"), "c");
        write(&tmp.path().join("docs/.DS_Store"), "x");
        write(&tmp.path().join("docs/.hidden/d.md"), "d");

        let project = scan_site(&site, ScanOptions::default());
        let docs = project.docs.found().unwrap();
        let rel: Vec<&str> = docs.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(rel, ["a.md", "b.md", "guides/c.md"]);
    }

    #[test]
    fn versions_not_scanned_without_flag() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&site.join("versions.json"), r#"["1.0.0"]"#);
        let project = scan_site(&site, ScanOptions::default());
        assert!(matches!(project.versions, Artifact::NotDeclared));
    }

    #[test]
    fn registry_drives_version_artifact_states() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&site.join("versions.json"), r#"["2.0.0", "1.0.0"]"#);
        write(&site.join("versioned_docs/version-2.0.0/doc1.md"), "x");
        write(
            &site.join("versioned_sidebars/version-1.0.0-sidebars.json"),
            r#"{"version-1.0.0-docs": {"A": ["version-1.0.0-doc1"]}}"#,
        );

        let project = scan_site(&site, ScanOptions { include_versions: true, include_translations: false });
        let versions = project.versions.found().unwrap();
        let ids: Vec<&str> = versions.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["2.0.0", "1.0.0"]);

        assert!(versions[0].docs.is_found());
        assert_eq!(versions[0].sidebar, Artifact::DeclaredButMissing);
        assert_eq!(versions[1].docs, Artifact::DeclaredButMissing);
        assert!(versions[1].sidebar.is_found());
    }

    #[test]
    fn invalid_registry_is_error() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&site.join("versions.json"), r#"{"latest": "1.0.0"}"#);
        let config = load_legacy_config(&site).unwrap();
        let err = scan(&site, config, &ScanOptions { include_versions: true, include_translations: false })
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidRegistry(_)));
    }

    #[test]
    fn malformed_sidebars_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&site.join("sidebars.json"), "{ docs: ");
        let config = load_legacy_config(&site).unwrap();
        let err = scan(&site, config, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::Parse { .. }));
    }

    #[test]
    fn locales_read_content_and_legacy_strings() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&site.join("translated_docs/ko/docs/doc1.md"), "ko");
        write(&site.join("translated_docs/fr/notes.txt"), "fr");
        write(&site.join("i18n/fr.json"), r#"{"localized-strings": {"next": "Suivant"}}"#);
        write(&site.join("translated_docs/ja/README"), "ja");

        let project = scan_site(&site, ScanOptions { include_versions: false, include_translations: true });
        let locales = project.locales.found().unwrap();
        let codes: Vec<&str> = locales.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, ["fr", "ja", "ko"]);
        assert!(locales[0].strings.is_found());
        assert!(locales[0].has_content());
        assert!(!locales[1].has_content());
        assert!(locales[2].docs.is_found());
        assert_eq!(locales[0].unrecognized, ["notes.txt"]);
        assert_eq!(locales[1].unrecognized, ["README"]);
    }

    #[test]
    fn loose_locale_markdown_is_translated_docs() {
        let tmp = TempDir::new().unwrap();
        let site = minimal_site(&tmp);
        write(&site.join("translated_docs/ko/doc1.md"), "loose");
        write(&site.join("translated_docs/ko/guides/setup.md"), "nested");
        write(&site.join("translated_docs/ko/docs/doc2.md"), "in docs");
        write(&site.join("translated_docs/ko/doc2.md"), "shadowed");
        write(&site.join("translated_docs/ko/logo.png"), "png");
        write(&site.join("i18n/ko.json"), r#"{"localized-strings": {"next": "다음"}}"#);

        let project = scan_site(&site, ScanOptions { include_versions: false, include_translations: true });
        let ko = &project.locales.found().unwrap()[0];
        let docs: Vec<(&str, bool)> = ko
            .docs
            .found()
            .unwrap()
            .iter()
            .map(|f| (f.relative.as_str(), f.source.ends_with("docs/doc2.md")))
            .collect();
        assert_eq!(docs, [("doc1.md", false), ("doc2.md", true), ("guides/setup.md", false)]);
        assert_eq!(ko.unrecognized, ["doc2.md", "logo.png"]);
        assert!(ko.strings.is_found());
    }

    #[test]
    fn complex_fixture_scans() {
        let site = fixture_site("complex_website");
        let project = scan_site(&site, ScanOptions { include_versions: true, include_translations: true });
        assert!(project.sidebars.is_found());
        assert_eq!(project.versions.found().map(Vec::len), Some(2));
        assert!(project.blog.is_found());
        assert!(project.static_files.is_found());
    }
}
