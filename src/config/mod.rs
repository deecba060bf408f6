//! Legacy site configuration.
//!
//! Loads the legacy `siteConfig` from a website directory, evaluates it into a
//! plain JSON value, checks the required fields, and normalizes it into
//! [`LegacyConfig`].
//!
//! ## Config File Location
//!
//! ```text
//! website/
//! ├── siteConfig.json    # Preferred when present (plain or JSON5)
//! └── siteConfig.js      # CommonJS module, evaluated by [`literal`]
//! ```
//!
//! ## Normalization
//!
//! The legacy format is an open-ended object. Known keys land in typed fields;
//! every other key is kept verbatim, in declaration order, in
//! [`LegacyConfig::custom_fields`] so nothing the user wrote is lost.
//!
//! Required keys: `title`, `url`, `baseUrl`.

pub mod literal;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_JSON: &str = "siteConfig.json";
pub const CONFIG_JS: &str = "siteConfig.js";

/// Docs directory used when `customDocsPath` is not set, relative to the
/// project root (the parent of the website directory).
pub const DEFAULT_DOCS_DIR: &str = "docs";

const REQUIRED_FIELDS: &[&str] = &["title", "url", "baseUrl"];

const KNOWN_FIELDS: &[&str] = &[
    "title",
    "tagline",
    "url",
    "baseUrl",
    "organizationName",
    "projectName",
    "favicon",
    "headerIcon",
    "footerIcon",
    "copyright",
    "customDocsPath",
    "editUrl",
    "gaTrackingId",
    "headerLinks",
    "colors",
    "algolia",
    "scripts",
    "stylesheets",
];

#[derive(Error, Debug)]
pub enum ConfigReadError {
    #[error("no siteConfig.js or siteConfig.json found in {0}")]
    NotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {message}")]
    Unparsable { path: PathBuf, message: String },
    #[error("{0} does not export an object")]
    NotAnObject(PathBuf),
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),
    #[error("invalid config value: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Normalized legacy site configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConfig {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    pub url: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Docs location relative to the project root; `docs` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_docs_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ga_tracking_id: Option<String>,
    #[serde(default)]
    pub header_links: Vec<HeaderLink>,
    /// Theme colors, e.g. `primaryColor`, `secondaryColor`.
    #[serde(default)]
    pub colors: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algolia: Option<Value>,
    #[serde(default)]
    pub scripts: Vec<Value>,
    #[serde(default)]
    pub stylesheets: Vec<Value>,
    /// Every key not listed above, verbatim and in declaration order.
    #[serde(flatten)]
    pub custom_fields: Map<String, Value>,
}

impl LegacyConfig {
    /// Docs directory relative to the project root.
    pub fn docs_dir(&self) -> &str {
        self.custom_docs_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_DOCS_DIR)
    }
}

/// A navigation link in the legacy header.
///
/// Exactly one of the target selectors is normally set:
/// `doc`, `page`, `href`, `blog`, `search` or `languages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub blog: bool,
    #[serde(default)]
    pub search: bool,
    #[serde(default)]
    pub languages: bool,
}

/// A loaded and normalized legacy config.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The file the config was read from.
    pub path: PathBuf,
    pub config: LegacyConfig,
    /// Source text of expressions that evaluated to `null`.
    pub unresolved: Vec<String>,
}

/// Load the legacy config from a website directory.
///
/// `siteConfig.json` takes precedence over `siteConfig.js`. Reads only.
pub fn load_legacy_config(site_dir: &Path) -> Result<LoadedConfig, ConfigReadError> {
    let json_path = site_dir.join(CONFIG_JSON);
    let js_path = site_dir.join(CONFIG_JS);
    let path = if json_path.is_file() {
        json_path
    } else if js_path.is_file() {
        js_path
    } else {
        return Err(ConfigReadError::NotFound(site_dir.to_path_buf()));
    };
    let source = fs::read_to_string(&path).map_err(|source| ConfigReadError::Io {
        path: path.clone(),
        source,
    })?;
    parse_legacy_config(&source, &path)
}

/// Parse config source text. The file extension of `path` selects the format.
pub fn parse_legacy_config(source: &str, path: &Path) -> Result<LoadedConfig, ConfigReadError> {
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let (value, unresolved) = if is_json {
        let value = parse_lenient_json(source).map_err(|message| ConfigReadError::Unparsable {
            path: path.to_path_buf(),
            message,
        })?;
        (value, Vec::new())
    } else {
        let evaluated =
            literal::evaluate_module(source).map_err(|e| ConfigReadError::Unparsable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        (evaluated.value, evaluated.unresolved)
    };
    if !value.is_object() {
        return Err(ConfigReadError::NotAnObject(path.to_path_buf()));
    }
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config: normalize(value)?,
        unresolved,
    })
}

/// Validate required fields and convert an evaluated config object.
pub fn normalize(value: Value) -> Result<LegacyConfig, ConfigReadError> {
    let Value::Object(mut map) = value else {
        return Err(ConfigReadError::NotAnObject(PathBuf::new()));
    };
    for field in REQUIRED_FIELDS {
        let present = map
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            return Err(ConfigReadError::MissingField(field));
        }
    }
    // Unevaluated known fields fall back to their defaults.
    map.retain(|key, value| !(value.is_null() && KNOWN_FIELDS.contains(&key.as_str())));
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// Parse strict JSON, falling back to JSON5 for hand-edited files.
pub fn parse_lenient_json(text: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(json_error) => json5::from_str::<Value>(text).map_err(|json5_error| {
            format!("not valid JSON ({json_error}) nor JSON5 ({json5_error})")
        }),
    }
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - Non-object values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved, in their position.
pub fn merge_json(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.get_mut(&key) {
                    Some(base_val) => merge_json(base_val.take(), overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}
