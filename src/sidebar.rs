//! Sidebar conversion.
//!
//! Legacy `sidebars.json` maps sidebar names to either an object of
//! `category label → items` or a plain item list. Items are doc ids,
//! `{type: "subcategory", label, ids}`, `{type: "doc", id, label}`,
//! `{type: "category", label, items}`, `{type: "link", label, href}`, or a
//! nested object of labels. The target schema is a list of typed items per
//! sidebar name.
//!
//! Conversion is depth-first and keeps sibling order. It never fails: empty
//! categories and unrecognized entries are dropped with a [`Warning`].
//!
//! Output files:
//!
//! ```text
//! sidebars.js              # module.exports = { "docs": require("./sidebars/docs.json") }
//! sidebars/docs.json       # one file per legacy sidebar, declaration order
//! ```

use crate::naming;
use crate::plan::FileOperation;
use crate::types::{Artifact, Warning, json_file};
use serde_json::{Map, Value, json};

pub const SIDEBARS_INDEX: &str = "sidebars.js";
pub const SIDEBARS_DIR: &str = "sidebars";

/// One target sidebar item.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarItem {
    Doc { id: String, label: Option<String> },
    Category { label: String, items: Vec<SidebarItem> },
    Link { label: String, href: String },
}

impl SidebarItem {
    pub fn doc(id: &str) -> Self {
        SidebarItem::Doc {
            id: id.to_string(),
            label: None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SidebarItem::Doc { id, label: None } => json!({"type": "doc", "id": id}),
            SidebarItem::Doc {
                id,
                label: Some(label),
            } => json!({"type": "doc", "id": id, "label": label}),
            SidebarItem::Category { label, items } => json!({
                "type": "category",
                "label": label,
                "items": items.iter().map(SidebarItem::to_value).collect::<Vec<_>>(),
            }),
            SidebarItem::Link { label, href } => {
                json!({"type": "link", "label": label, "href": href})
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSidebar {
    pub name: String,
    pub items: Vec<SidebarItem>,
}

impl NamedSidebar {
    pub fn items_value(&self) -> Value {
        Value::Array(self.items.iter().map(SidebarItem::to_value).collect())
    }

    /// Number of doc references anywhere in the tree.
    pub fn doc_count(&self) -> usize {
        fn count(items: &[SidebarItem]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    SidebarItem::Doc { .. } => 1,
                    SidebarItem::Category { items, .. } => count(items),
                    SidebarItem::Link { .. } => 0,
                })
                .sum()
        }
        count(&self.items)
    }
}

/// `{ name: items }` for a set of sidebars, in order.
pub fn sidebars_value(sidebars: &[NamedSidebar]) -> Value {
    let map: Map<String, Value> = sidebars
        .iter()
        .map(|s| (s.name.clone(), s.items_value()))
        .collect();
    Value::Object(map)
}

/// Converted main sidebars plus their plan fragment.
#[derive(Debug, Default)]
pub struct SidebarPlan {
    pub sidebars: Vec<NamedSidebar>,
    pub operations: Vec<FileOperation>,
    pub warnings: Vec<Warning>,
}

/// Convert the project's `sidebars.json` and plan the target sidebar files.
///
/// A project without sidebars still gets an empty `sidebars.js` so the
/// generated config's `sidebarPath` resolves.
pub fn plan_sidebars(legacy: &Artifact<Value>) -> SidebarPlan {
    let mut warnings = Vec::new();
    let sidebars = match legacy {
        Artifact::Found(value) => convert_sidebars(value, None, &mut warnings),
        _ => {
            warnings.push(Warning::MissingSidebars);
            Vec::new()
        }
    };

    let mut operations = Vec::with_capacity(sidebars.len() + 1);
    let mut index = String::from("module.exports = {\n");
    for sidebar in &sidebars {
        let file = format!("{SIDEBARS_DIR}/{}.json", naming::sanitize_file_stem(&sidebar.name));
        operations.push(FileOperation::write(&file, json_file(&sidebar.items_value())));
        index.push_str(&format!(
            "  {}: require({}),\n",
            Value::from(sidebar.name.as_str()),
            Value::from(format!("./{file}"))
        ));
    }
    index.push_str("};\n");
    operations.push(FileOperation::write(SIDEBARS_INDEX, index));

    SidebarPlan {
        sidebars,
        operations,
        warnings,
    }
}

/// Convert a legacy sidebars document. `version` enables stripping of the
/// `version-<v>-` prefix from sidebar names and doc ids.
pub fn convert_sidebars(
    value: &Value,
    version: Option<&str>,
    warnings: &mut Vec<Warning>,
) -> Vec<NamedSidebar> {
    let Some(map) = value.as_object() else {
        warnings.push(Warning::UnresolvableItem {
            sidebar: "<root>".to_string(),
            item: compact(value),
        });
        return Vec::new();
    };
    map.iter()
        .map(|(name, body)| {
            let name = naming::target_sidebar_name(name, version);
            let mut converter = Converter {
                sidebar: &name,
                version,
                warnings: &mut *warnings,
            };
            let items = converter.body(body);
            NamedSidebar { name, items }
        })
        .collect()
}

struct Converter<'a> {
    sidebar: &'a str,
    version: Option<&'a str>,
    warnings: &'a mut Vec<Warning>,
}

impl Converter<'_> {
    /// A sidebar body or a category's children.
    fn body(&mut self, value: &Value) -> Vec<SidebarItem> {
        match value {
            Value::Array(items) => self.items(items),
            Value::Object(labels) => self.labeled(labels),
            other => {
                self.unresolvable(other);
                Vec::new()
            }
        }
    }

    fn items(&mut self, values: &[Value]) -> Vec<SidebarItem> {
        values.iter().flat_map(|v| self.item(v)).collect()
    }

    /// `{ "Label": [children] }` objects, one category per key.
    fn labeled(&mut self, labels: &Map<String, Value>) -> Vec<SidebarItem> {
        labels
            .iter()
            .filter_map(|(label, children)| {
                let items = self.body(children);
                self.category(label, items)
            })
            .collect()
    }

    fn item(&mut self, value: &Value) -> Vec<SidebarItem> {
        match value {
            Value::String(id) => self.doc(id, None).into_iter().collect(),
            Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
                Some("doc") => match obj.get("id").and_then(Value::as_str) {
                    Some(id) => self.doc(id, label_of(obj)).into_iter().collect(),
                    None => self.unresolvable(value),
                },
                Some("subcategory") | Some("category") => {
                    let children = obj.get("ids").or_else(|| obj.get("items"));
                    match (label_of(obj), children) {
                        (Some(label), Some(children)) => {
                            let items = self.body(children);
                            self.category(&label, items).into_iter().collect()
                        }
                        _ => self.unresolvable(value),
                    }
                }
                Some("link") => match (label_of(obj), obj.get("href").and_then(Value::as_str)) {
                    (Some(label), Some(href)) => vec![SidebarItem::Link {
                        label,
                        href: href.to_string(),
                    }],
                    _ => self.unresolvable(value),
                },
                Some(_) => self.unresolvable(value),
                None if obj.values().all(|v| v.is_array() || v.is_object()) && !obj.is_empty() => {
                    self.labeled(obj)
                }
                None => self.unresolvable(value),
            },
            _ => self.unresolvable(value),
        }
    }

    fn doc(&mut self, legacy_id: &str, label: Option<String>) -> Option<SidebarItem> {
        match naming::target_doc_id(legacy_id, self.version) {
            Some(id) => Some(SidebarItem::Doc { id, label }),
            None => {
                self.unresolvable(&Value::from(legacy_id));
                None
            }
        }
    }

    fn category(&mut self, label: &str, items: Vec<SidebarItem>) -> Option<SidebarItem> {
        if items.is_empty() {
            self.warnings.push(Warning::EmptyCategory {
                sidebar: self.sidebar.to_string(),
                label: label.to_string(),
            });
            return None;
        }
        Some(SidebarItem::Category {
            label: label.to_string(),
            items,
        })
    }

    fn unresolvable(&mut self, value: &Value) -> Vec<SidebarItem> {
        self.warnings.push(Warning::UnresolvableItem {
            sidebar: self.sidebar.to_string(),
            item: compact(value),
        });
        Vec::new()
    }
}

fn label_of(obj: &Map<String, Value>) -> Option<String> {
    obj.get("label").and_then(Value::as_str).map(str::to_string)
}

fn compact(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 80 {
        let cut: String = text.chars().take(77).collect();
        format!("{cut}...")
    } else {
        text
    }
}
