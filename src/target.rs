//! Target configuration and package manifest.
//!
//! The target config is a typed record built from the normalized legacy
//! config plus what the planners discovered. Generated target fields always
//! win; every unknown legacy key is carried verbatim in `customFields`.
//!
//! ## Output
//!
//! ```text
//! docusaurus.config.js   # module.exports = { ... };
//! package.json           # legacy manifest merged under target defaults
//! ```

use crate::config::{HeaderLink, LegacyConfig, merge_json};
use crate::naming;
use crate::plan::FileOperation;
use crate::preset::PRESET_CLASSIC;
use crate::sidebar::SIDEBARS_INDEX;
use crate::translations::DEFAULT_LOCALE;
use crate::types::json_file;
use serde::Serialize;
use serde_json::{Map, Value, json};

pub const CONFIG_FILE: &str = "docusaurus.config.js";
pub const PACKAGE_FILE: &str = "package.json";
pub const DOCUSAURUS_VERSION: &str = "^2.0.0";
pub const REACT_VERSION: &str = "^17.0.2";

/// Legacy package dependency replaced by the v2 packages.
const LEGACY_PACKAGE: &str = "docusaurus";
/// Prefix of the v1 command-line tools (`docusaurus-start`, ...).
const LEGACY_BIN_PREFIX: &str = "docusaurus-";
/// Legacy config key whose object is merged into `customFields`.
const CUSTOM_FIELDS_KEY: &str = "customFields";

/// Facts from the other planners that shape the target config.
#[derive(Debug, Clone, Default)]
pub struct TargetContext {
    pub has_blog: bool,
    /// Target path of the generated stylesheet.
    pub custom_css: Option<String>,
    /// Migrated locales, default locale excluded.
    pub locales: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    pub title: String,
    pub tagline: String,
    pub url: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub on_broken_links: String,
    pub on_broken_markdown_links: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n: Option<I18nConfig>,
    pub presets: Value,
    pub theme_config: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stylesheets: Vec<Value>,
    pub custom_fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nConfig {
    pub default_locale: String,
    pub locales: Vec<String>,
}

pub fn build_target_config(legacy: &LegacyConfig, context: &TargetContext) -> TargetConfig {
    let i18n = (!context.locales.is_empty()).then(|| I18nConfig {
        default_locale: DEFAULT_LOCALE.to_string(),
        locales: std::iter::once(DEFAULT_LOCALE.to_string())
            .chain(context.locales.iter().cloned())
            .collect(),
    });

    TargetConfig {
        title: legacy.title.clone(),
        tagline: legacy.tagline.clone(),
        url: legacy.url.clone(),
        base_url: legacy.base_url.clone(),
        favicon: legacy.favicon.clone(),
        organization_name: legacy.organization_name.clone(),
        project_name: legacy.project_name.clone(),
        on_broken_links: "throw".to_string(),
        on_broken_markdown_links: "warn".to_string(),
        i18n,
        presets: json!([[PRESET_CLASSIC, classic_options(legacy, context)]]),
        theme_config: theme_config(legacy, context),
        scripts: legacy.scripts.clone(),
        stylesheets: legacy.stylesheets.clone(),
        custom_fields: custom_fields(legacy),
    }
}

fn classic_options(legacy: &LegacyConfig, context: &TargetContext) -> Value {
    let mut docs = json!({"path": "docs", "sidebarPath": SIDEBARS_INDEX});
    if let Some(edit_url) = &legacy.edit_url {
        docs["editUrl"] = json!(edit_url);
    }
    let mut options = json!({
        "docs": docs,
        "blog": if context.has_blog { json!({"path": "blog"}) } else { json!(false) },
    });
    if let Some(css) = &context.custom_css {
        options["theme"] = json!({"customCss": format!("./{css}")});
    }
    options
}

fn theme_config(legacy: &LegacyConfig, context: &TargetContext) -> Value {
    let mut navbar = json!({"title": legacy.title});
    if let Some(icon) = &legacy.header_icon {
        navbar["logo"] = json!({"alt": legacy.title, "src": icon});
    }
    navbar["items"] = Value::Array(
        legacy
            .header_links
            .iter()
            .filter_map(|link| navbar_item(link, !context.locales.is_empty()))
            .collect(),
    );

    let mut footer = json!({"style": "dark"});
    if let Some(icon) = &legacy.footer_icon {
        footer["logo"] = json!({"alt": legacy.title, "src": icon});
    }
    if let Some(copyright) = &legacy.copyright {
        footer["copyright"] = json!(copyright);
    }

    let mut theme = json!({"navbar": navbar, "footer": footer});
    if let Some(algolia) = &legacy.algolia {
        theme["algolia"] = algolia.clone();
    }
    if let Some(id) = &legacy.ga_tracking_id {
        theme["googleAnalytics"] = json!({"trackingID": id});
    }
    theme
}

/// Translate one legacy header link. Search links are dropped: the search
/// bar comes from the `algolia` theme config.
fn navbar_item(link: &HeaderLink, has_locales: bool) -> Option<Value> {
    let label = |fallback: &str| link.label.clone().unwrap_or_else(|| fallback.to_string());
    if let Some(doc) = &link.doc {
        let doc_id = naming::target_doc_id(doc, None)?;
        return Some(json!({"type": "doc", "docId": doc_id, "label": label(&doc_id), "position": "left"}));
    }
    if let Some(page) = &link.page {
        return Some(json!({"to": page, "label": label(page), "position": "left"}));
    }
    if let Some(href) = &link.href {
        return Some(json!({"href": href, "label": label(href), "position": "left"}));
    }
    if link.blog {
        return Some(json!({"to": "blog", "label": label("Blog"), "position": "left"}));
    }
    if link.languages && has_locales {
        return Some(json!({"type": "localeDropdown", "position": "right"}));
    }
    None
}

fn custom_fields(legacy: &LegacyConfig) -> Map<String, Value> {
    let mut fields = legacy.custom_fields.clone();
    let explicit = fields.remove(CUSTOM_FIELDS_KEY);
    match explicit {
        Some(explicit @ Value::Object(_)) => match merge_json(Value::Object(fields), explicit) {
            Value::Object(merged) => merged,
            _ => Map::new(),
        },
        Some(other) => {
            fields.insert(CUSTOM_FIELDS_KEY.to_string(), other);
            fields
        }
        None => fields,
    }
}

/// Render the config as a CommonJS module.
pub fn render_config_file(config: &TargetConfig) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(config)?;
    Ok(format!("module.exports = {value:#};\n"))
}

/// The target package manifest: legacy manifest under v2 defaults.
///
/// Target values win ties. The v1 `docusaurus` dependency and scripts that
/// call v1 tools are removed.
pub fn build_package_manifest(legacy: Option<&Value>, config: &LegacyConfig) -> Value {
    let legacy = legacy.filter(|v| v.is_object()).cloned().unwrap_or_else(|| json!({}));
    let name = legacy
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| config.project_name.clone())
        .unwrap_or_else(|| "docusaurus-site".to_string());

    let defaults = json!({
        "name": name,
        "version": legacy.get("version").cloned().unwrap_or_else(|| json!("0.0.0")),
        "private": true,
        "scripts": {
            "docusaurus": "docusaurus",
            "start": "docusaurus start",
            "build": "docusaurus build",
            "swizzle": "docusaurus swizzle",
            "deploy": "docusaurus deploy",
            "serve": "docusaurus serve",
            "clear": "docusaurus clear",
        },
        "dependencies": {
            "@docusaurus/core": DOCUSAURUS_VERSION,
            "@docusaurus/preset-classic": DOCUSAURUS_VERSION,
            "react": REACT_VERSION,
            "react-dom": REACT_VERSION,
        },
    });

    let mut manifest = merge_json(legacy, defaults);
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = manifest.get_mut(section).and_then(Value::as_object_mut) {
            deps.remove(LEGACY_PACKAGE);
        }
    }
    if let Some(scripts) = manifest.get_mut("scripts").and_then(Value::as_object_mut) {
        scripts.retain(|_, cmd| !cmd.as_str().is_some_and(|c| c.trim_start().starts_with(LEGACY_BIN_PREFIX)));
    }
    manifest
}

/// Config and manifest writes.
pub fn plan_target_files(
    config: &TargetConfig,
    manifest: &Value,
) -> Result<Vec<FileOperation>, serde_json::Error> {
    Ok(vec![
        FileOperation::write(CONFIG_FILE, render_config_file(config)?),
        FileOperation::write(PACKAGE_FILE, json_file(manifest)),
    ])
}
