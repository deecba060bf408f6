//! Translated content migration.
//!
//! Each locale directory under `translated_docs/` is re-homed under the
//! target `i18n/` tree, qualified by content type:
//!
//! ```text
//! i18n/ko/
//! ├── code.json                                   # flattened UI strings
//! ├── docusaurus-plugin-content-docs/current/**   # translated docs
//! ├── docusaurus-plugin-content-blog/**
//! └── docusaurus-plugin-content-pages/**
//! ```
//!
//! Relative structure inside each content type is preserved. Files that fit
//! no content type are reported as a warning and left behind.

use crate::plan::FileOperation;
use crate::scan::LegacyLocale;
use crate::types::{Artifact, SourceFile, Warning, json_file};
use serde_json::{Map, Value, json};

pub const I18N_DIR: &str = "i18n";
pub const DEFAULT_LOCALE: &str = "en";
pub const CODE_FILE: &str = "code.json";
const DOCS_CONTENT: &str = "docusaurus-plugin-content-docs/current";
const BLOG_CONTENT: &str = "docusaurus-plugin-content-blog";
const PAGES_CONTENT: &str = "docusaurus-plugin-content-pages";

#[derive(Debug, Default)]
pub struct TranslationPlan {
    /// Migrated locale codes, directory order.
    pub locales: Vec<String>,
    pub operations: Vec<FileOperation>,
    pub warnings: Vec<Warning>,
}

impl TranslationPlan {
    /// Operations under one locale's i18n subtree.
    pub fn locale_operations(&self, locale: &str) -> impl Iterator<Item = &FileOperation> {
        let prefix = format!("{I18N_DIR}/{locale}");
        self.operations.iter().filter(move |op| {
            op.path() == prefix || op.path().starts_with(&format!("{prefix}/"))
        })
    }
}

pub fn plan_translations(locales: &Artifact<Vec<LegacyLocale>>) -> TranslationPlan {
    let mut plan = TranslationPlan::default();
    let Some(locales) = locales.found() else {
        return plan;
    };

    for locale in locales {
        if locale.code == DEFAULT_LOCALE {
            plan.warnings.push(Warning::DefaultLocaleSkipped {
                locale: locale.code.clone(),
            });
            continue;
        }
        if !locale.unrecognized.is_empty() {
            plan.warnings.push(Warning::LocaleFilesSkipped {
                locale: locale.code.clone(),
                files: locale.unrecognized.clone(),
            });
        }
        if !locale.has_content() {
            plan.warnings.push(Warning::LocaleWithoutContent {
                locale: locale.code.clone(),
            });
            continue;
        }

        let root = format!("{I18N_DIR}/{}", locale.code);
        plan.operations.push(FileOperation::create_dir(&root));
        copy_content(&mut plan.operations, &locale.docs, &format!("{root}/{DOCS_CONTENT}"));
        copy_content(&mut plan.operations, &locale.blog, &format!("{root}/{BLOG_CONTENT}"));
        copy_content(&mut plan.operations, &locale.pages, &format!("{root}/{PAGES_CONTENT}"));
        if let Artifact::Found(strings) = &locale.strings {
            let mut duplicates = Vec::new();
            let code = code_messages(strings, &mut duplicates);
            plan.warnings.extend(duplicates.into_iter().map(|key| Warning::DuplicateStringKey {
                locale: locale.code.clone(),
                key,
            }));
            plan.operations
                .push(FileOperation::write(format!("{root}/{CODE_FILE}"), json_file(&code)));
        }
        plan.locales.push(locale.code.clone());
    }
    plan
}

fn copy_content(ops: &mut Vec<FileOperation>, files: &Artifact<Vec<SourceFile>>, dest: &str) {
    if let Artifact::Found(files) = files {
        ops.push(FileOperation::create_dir(dest));
        ops.extend(
            files
                .iter()
                .map(|f| FileOperation::copy(f.source.clone(), format!("{dest}/{}", f.relative))),
        );
    }
}

/// Flatten a legacy strings dictionary into `{ "a.b": { "message": "..." } }`.
///
/// Non-string leaves are kept as their JSON text. A nested key and a dotted
/// key can flatten to the same id: the first in document order is kept and
/// the id is pushed onto `duplicates`.
pub fn code_messages(strings: &Value, duplicates: &mut Vec<String>) -> Value {
    let mut out = Map::new();
    flatten(strings, "", &mut out, duplicates);
    Value::Object(out)
}

fn flatten(
    value: &Value,
    prefix: &str,
    out: &mut Map<String, Value>,
    duplicates: &mut Vec<String>,
) {
    let message = match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, &key, out, duplicates);
            }
            return;
        }
        Value::String(message) => message.clone(),
        other => other.to_string(),
    };
    if out.contains_key(prefix) {
        duplicates.push(prefix.to_string());
    } else {
        out.insert(prefix.to_string(), json!({"message": message}));
    }
}
