//! Passthrough assets.
//!
//! Docs, blog posts, legacy pages and static files are copied as-is into
//! their target locations. Legacy theme colors become a generated custom
//! CSS file.
//!
//! Pages lose their `en/` prefix. When that would land on a top-level page
//! of the same name, the top-level page is kept and the `en/` one skipped.

use crate::plan::FileOperation;
use crate::scan::{BLOG_DIR, LegacyProject, PAGES_DIR, STATIC_DIR};
use crate::types::{Artifact, SourceFile, Warning};
use serde_json::{Map, Value};

pub const TARGET_DOCS_DIR: &str = "docs";
pub const TARGET_PAGES_DIR: &str = "src/pages";
pub const CUSTOM_CSS_FILE: &str = "src/css/customTheme.css";

/// Prefix v1 puts in front of default-locale pages.
const DEFAULT_PAGES_PREFIX: &str = "en/";

#[derive(Debug, Default)]
pub struct PassthroughPlan {
    pub operations: Vec<FileOperation>,
    pub warnings: Vec<Warning>,
    pub has_docs: bool,
    pub has_blog: bool,
    pub has_pages: bool,
    /// Target path of the generated stylesheet, when colors were set.
    pub custom_css: Option<String>,
}

pub fn plan_passthrough(project: &LegacyProject) -> PassthroughPlan {
    let mut plan = PassthroughPlan::default();

    match &project.docs {
        Artifact::Found(files) => {
            plan.has_docs = true;
            copy_all(&mut plan.operations, files, TARGET_DOCS_DIR, |rel| rel);
        }
        Artifact::DeclaredButMissing => plan.warnings.push(Warning::DocsMissing {
            path: project.config.config.docs_dir().to_string(),
        }),
        Artifact::NotDeclared => {}
    }

    if let Artifact::Found(files) = &project.blog {
        plan.has_blog = true;
        copy_all(&mut plan.operations, files, BLOG_DIR, |rel| rel);
    }

    if let Artifact::Found(files) = &project.pages
        && !files.is_empty()
    {
        plan.has_pages = true;
        let mut copied = 0;
        for file in files {
            let target = match file.relative.strip_prefix(DEFAULT_PAGES_PREFIX) {
                Some(stripped) if files.iter().any(|f| f.relative == stripped) => {
                    plan.warnings.push(Warning::PageShadowed {
                        path: format!("{PAGES_DIR}/{}", file.relative),
                        target: format!("{TARGET_PAGES_DIR}/{stripped}"),
                    });
                    continue;
                }
                Some(stripped) => stripped,
                None => file.relative.as_str(),
            };
            plan.operations.push(FileOperation::copy(
                file.source.clone(),
                format!("{TARGET_PAGES_DIR}/{target}"),
            ));
            copied += 1;
        }
        plan.warnings.push(Warning::PagesNeedPorting { count: copied });
    }

    if let Artifact::Found(files) = &project.static_files {
        copy_all(&mut plan.operations, files, STATIC_DIR, |rel| rel);
    }

    if let Some(css) = generate_custom_css(&project.config.config.colors) {
        plan.operations.push(FileOperation::write(CUSTOM_CSS_FILE, css));
        plan.custom_css = Some(CUSTOM_CSS_FILE.to_string());
    }
    plan
}

fn copy_all(
    ops: &mut Vec<FileOperation>,
    files: &[SourceFile],
    dest: &str,
    rename: impl Fn(&str) -> &str,
) {
    ops.extend(
        files
            .iter()
            .map(|f| FileOperation::copy(f.source.clone(), format!("{dest}/{}", rename(&f.relative)))),
    );
}

/// Generate CSS custom properties from legacy theme colors.
///
/// `primaryColor` becomes `--ifm-color-primary`, `secondaryColor`
/// `--ifm-color-secondary`, any other key its kebab-case form. Non-string
/// values are skipped. `None` when nothing is left.
pub fn generate_custom_css(colors: &Map<String, Value>) -> Option<String> {
    let declarations: Vec<String> = colors
        .iter()
        .filter_map(|(key, value)| {
            let value = value.as_str()?.trim();
            if value.is_empty() {
                return None;
            }
            let name = key.strip_suffix("Color").unwrap_or(key);
            Some(format!("    --ifm-color-{}: {value};", kebab_case(name)))
        })
        .collect();
    if declarations.is_empty() {
        return None;
    }
    Some(format!(":root {{\n{}\n}}\n", declarations.join("\n")))
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
