//! Preset composition.
//!
//! A site's `presets` field names bundles that expand into plugin and theme
//! configurations. Accepted shapes, normalized at the boundary into
//! [`PresetEntry`]:
//!
//! - `"name"`
//! - `["name", { ...options }]`
//! - a list of `"name"`, `["name"]`, `["name", options]` or `["name", null]`
//!
//! Each preset hands each component the value under that component's option
//! key. An absent or `null` value passes through as `None` (not an empty
//! object); `false` disables the component. Plugins concatenate across
//! entries in declaration order, then themes likewise. Nested presets are
//! flattened first.
//!
//! The migration uses this only to check that the generated config resolves.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub const PRESET_CLASSIC: &str = "@docusaurus/preset-classic";

#[derive(Error, Debug, PartialEq)]
pub enum PresetError {
    #[error("invalid preset entry: {0}")]
    InvalidEntry(String),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("preset cycle: {0}")]
    Cycle(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresetEntry {
    Bare(String),
    WithOptions(String, Value),
}

impl PresetEntry {
    pub fn name(&self) -> &str {
        match self {
            PresetEntry::Bare(name) | PresetEntry::WithOptions(name, _) => name,
        }
    }

    pub fn options(&self) -> Option<&Value> {
        match self {
            PresetEntry::Bare(_) => None,
            PresetEntry::WithOptions(_, options) => Some(options),
        }
    }

    /// One list element: `"name"`, `["name"]`, `["name", options]`.
    pub fn from_value(value: &Value) -> Result<Self, PresetError> {
        match value {
            Value::String(name) => Ok(PresetEntry::Bare(name.clone())),
            Value::Array(items) => match items.as_slice() {
                [Value::String(name)] | [Value::String(name), Value::Null] => {
                    Ok(PresetEntry::Bare(name.clone()))
                }
                [Value::String(name), options @ Value::Object(_)] => {
                    Ok(PresetEntry::WithOptions(name.clone(), options.clone()))
                }
                _ => Err(PresetError::InvalidEntry(value.to_string())),
            },
            _ => Err(PresetError::InvalidEntry(value.to_string())),
        }
    }
}

/// Normalize a `presets` field into entries.
pub fn parse_presets(value: &Value) -> Result<Vec<PresetEntry>, PresetError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(_) => Ok(vec![PresetEntry::from_value(value)?]),
        Value::Array(items) => match items.as_slice() {
            // A lone pair, not a list of two entries.
            [Value::String(_), Value::Object(_)] => Ok(vec![PresetEntry::from_value(value)?]),
            _ => items.iter().map(PresetEntry::from_value).collect(),
        },
        _ => Err(PresetError::InvalidEntry(value.to_string())),
    }
}

/// A plugin or theme a preset contributes, and the option key feeding it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub name: String,
    pub option_key: String,
}

impl ComponentSpec {
    pub fn new(name: &str, option_key: &str) -> Self {
        Self {
            name: name.to_string(),
            option_key: option_key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetDefinition {
    pub plugins: Vec<ComponentSpec>,
    pub themes: Vec<ComponentSpec>,
    /// Presets this preset includes, expanded before its own components.
    pub presets: Vec<PresetEntry>,
}

/// A resolved plugin or theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentConfig {
    pub name: String,
    pub options: Option<Value>,
}

impl ComponentConfig {
    pub fn new(name: &str, options: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            options,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadedPresets {
    pub plugins: Vec<ComponentConfig>,
    pub themes: Vec<ComponentConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: HashMap<String, PresetDefinition>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the presets the generated config refers to.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            PRESET_CLASSIC,
            PresetDefinition {
                plugins: vec![
                    ComponentSpec::new("@docusaurus/plugin-content-docs", "docs"),
                    ComponentSpec::new("@docusaurus/plugin-content-blog", "blog"),
                    ComponentSpec::new("@docusaurus/plugin-content-pages", "pages"),
                    ComponentSpec::new("@docusaurus/plugin-sitemap", "sitemap"),
                ],
                themes: vec![ComponentSpec::new("@docusaurus/theme-classic", "theme")],
                presets: Vec::new(),
            },
        );
        registry
    }

    pub fn register(&mut self, name: &str, definition: PresetDefinition) {
        self.presets.insert(name.to_string(), definition);
    }

    /// Resolve entries into ordered plugin and theme lists.
    pub fn load(&self, entries: &[PresetEntry]) -> Result<LoadedPresets, PresetError> {
        let mut loaded = LoadedPresets::default();
        let mut stack = Vec::new();
        for entry in entries {
            self.expand(entry, &mut stack, &mut loaded)?;
        }
        Ok(loaded)
    }

    /// Resolve a raw `presets` field.
    pub fn load_value(&self, presets: &Value) -> Result<LoadedPresets, PresetError> {
        self.load(&parse_presets(presets)?)
    }

    fn expand<'a>(
        &'a self,
        entry: &'a PresetEntry,
        stack: &mut Vec<&'a str>,
        loaded: &mut LoadedPresets,
    ) -> Result<(), PresetError> {
        let name = entry.name();
        if stack.contains(&name) {
            let mut chain: Vec<&str> = stack.clone();
            chain.push(name);
            return Err(PresetError::Cycle(chain.join(" -> ")));
        }
        let definition = self
            .presets
            .get(name)
            .ok_or_else(|| PresetError::UnknownPreset(name.to_string()))?;

        stack.push(name);
        for nested in &definition.presets {
            self.expand(nested, stack, loaded)?;
        }
        stack.pop();

        let options = entry.options();
        loaded.plugins.extend(resolve(&definition.plugins, options));
        loaded.themes.extend(resolve(&definition.themes, options));
        Ok(())
    }
}

fn resolve<'a>(
    specs: &'a [ComponentSpec],
    options: Option<&'a Value>,
) -> impl Iterator<Item = ComponentConfig> + 'a {
    specs.iter().filter_map(move |spec| {
        match options.and_then(|o| o.get(&spec.option_key)) {
            None | Some(Value::Null) => Some(ComponentConfig::new(&spec.name, None)),
            Some(Value::Bool(false)) => None,
            Some(value) => Some(ComponentConfig::new(&spec.name, Some(value.clone()))),
        }
    })
}
