//! Centralized naming conventions shared by every planner.
//!
//! Legacy sites identify docs and sidebars with ids that carry layout
//! details: file extensions, leading `./`, Windows separators, and for
//! versioned snapshots a `version-<v>-` prefix. The target layout uses bare
//! path-like ids. Everything here is a pure string transform.
//!
//! ## Examples
//!
//! - `"./guides/intro.md"` → `"guides/intro"`
//! - `"version-1.0.0-doc1"` (in version `1.0.0`) → `"doc1"`
//! - `"version-1.0.0-docs"` (sidebar name in version `1.0.0`) → `"docs"`

/// Prefix v1 puts in front of doc ids and sidebar names inside a version snapshot.
pub fn version_prefix(version: &str) -> String {
    format!("version-{version}-")
}

/// Directory name of a version snapshot, in both layouts.
pub fn version_dir_name(version: &str) -> String {
    format!("version-{version}")
}

/// File name of a per-version sidebar file, in both layouts.
pub fn version_sidebar_file_name(version: &str) -> String {
    format!("version-{version}-sidebars.json")
}

/// Rewrite a legacy doc id into the target convention.
///
/// Returns `None` when nothing is left after normalization.
pub fn target_doc_id(legacy_id: &str, version: Option<&str>) -> Option<String> {
    let mut id = legacy_id.trim().replace('\\', "/");
    while let Some(rest) = id.strip_prefix("./") {
        id = rest.to_string();
    }
    let id = id.trim_start_matches('/');
    let id = strip_version_prefix(id, version);
    let id = id
        .strip_suffix(".mdx")
        .or_else(|| id.strip_suffix(".md"))
        .unwrap_or(id);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Rewrite a legacy sidebar name into the target convention.
pub fn target_sidebar_name(legacy_name: &str, version: Option<&str>) -> String {
    strip_version_prefix(legacy_name.trim(), version).to_string()
}

fn strip_version_prefix<'a>(id: &'a str, version: Option<&str>) -> &'a str {
    match version {
        Some(v) => id.strip_prefix(version_prefix(v).as_str()).unwrap_or(id),
        None => id,
    }
}

/// Reduce a sidebar name to a safe file stem: `[A-Za-z0-9._-]`, other
/// characters become `-`.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "sidebar".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_id_unchanged() {
        assert_eq!(target_doc_id("doc1", None).as_deref(), Some("doc1"));
    }

    #[test]
    fn path_like_id_normalized() {
        assert_eq!(
            target_doc_id("./guides/intro.md", None).as_deref(),
            Some("guides/intro")
        );
        assert_eq!(
            target_doc_id("guides\\setup.mdx", None).as_deref(),
            Some("guides/setup")
        );
        assert_eq!(target_doc_id("/api", None).as_deref(), Some("api"));
    }

    #[test]
    fn version_prefix_stripped_only_for_matching_version() {
        assert_eq!(
            target_doc_id("version-1.0.0-doc1", Some("1.0.0")).as_deref(),
            Some("doc1")
        );
        assert_eq!(
            target_doc_id("version-1.0.0-doc1", Some("2.0.0")).as_deref(),
            Some("version-1.0.0-doc1")
        );
        assert_eq!(
            target_doc_id("version-1.0.0-doc1", None).as_deref(),
            Some("version-1.0.0-doc1")
        );
    }

    #[test]
    fn empty_id_is_unresolvable() {
        assert_eq!(target_doc_id("  ", None), None);
        assert_eq!(target_doc_id("./", None), None);
        assert_eq!(target_doc_id("version-1.0.0-", Some("1.0.0")), None);
    }

    #[test]
    fn sidebar_name_prefix_stripped() {
        assert_eq!(target_sidebar_name("version-1.0.0-docs", Some("1.0.0")), "docs");
        assert_eq!(target_sidebar_name("docs", None), "docs");
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_file_stem("docs"), "docs");
        assert_eq!(sanitize_file_stem("My Sidebar/1"), "My-Sidebar-1");
        assert_eq!(sanitize_file_stem(".."), "sidebar");
    }

    #[test]
    fn version_file_names() {
        assert_eq!(version_dir_name("1.0.0"), "version-1.0.0");
        assert_eq!(
            version_sidebar_file_name("1.0.0"),
            "version-1.0.0-sidebars.json"
        );
    }
}
