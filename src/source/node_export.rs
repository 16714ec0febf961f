// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Partial search over a directory of exported node objects.
//!
//! Each `*.json` file holds one node as exported from the server. Attributes are merged
//! with the server's precedence (default < normal < override < automatic) and flattened
//! with `_` between nested keys, the way the search index sees them.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{SourceError, SourceResult};
use crate::reporting::{FieldProjection, PartialSearch, SearchResult, SearchRow};

const NODE_INDEX: &str = "node";
const MATCH_ALL: &str = "*:*";

/// Node object as written by a node export.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeFile {
    name: Option<String>,
    chef_environment: String,
    default: Map<String, Value>,
    normal: Map<String, Value>,
    #[serde(rename = "override")]
    overrides: Map<String, Value>,
    automatic: Map<String, Value>,
}

#[derive(Debug)]
struct ExportedNode {
    name: String,
    chef_environment: String,
    attributes: Value,
    /// Flattened attribute values keyed as in search queries.
    index: BTreeMap<String, Vec<String>>,
}

/// Merge `overlay` into `base`, recursing into objects present on both sides.
fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn flatten(prefix: &str, value: &Value, index: &mut BTreeMap<String, Vec<String>>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}_{key}")
                };
                flatten(&key, value, index);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten(prefix, item, index);
            }
        }
        Value::Null => {}
        Value::String(s) => index.entry(prefix.to_string()).or_default().push(s.clone()),
        other => index
            .entry(prefix.to_string())
            .or_default()
            .push(other.to_string()),
    }
}

impl ExportedNode {
    fn new(file: NodeFile, fallback_name: &str) -> Self {
        let mut attributes = Value::Object(Map::new());
        for layer in [file.default, file.normal, file.overrides, file.automatic] {
            deep_merge(&mut attributes, Value::Object(layer));
        }

        let name = file.name.unwrap_or_else(|| fallback_name.to_string());
        let mut index = BTreeMap::new();
        flatten("", &attributes, &mut index);
        index.insert("name".to_string(), vec![name.clone()]);
        index.insert(
            "chef_environment".to_string(),
            vec![file.chef_environment.clone()],
        );

        Self {
            name,
            chef_environment: file.chef_environment,
            attributes,
            index,
        }
    }

    fn matches(&self, query: &Query) -> bool {
        match query {
            Query::All => true,
            Query::Field { key, value } => self
                .index
                .get(key)
                .is_some_and(|values| value.as_ref().map_or(true, |v| values.contains(v))),
        }
    }

    /// Resolve an attribute path, `Null` if any segment is missing.
    fn lookup(&self, path: &[String]) -> Value {
        match path {
            [field] if field == "name" => Value::String(self.name.clone()),
            [field] if field == "chef_environment" => Value::String(self.chef_environment.clone()),
            _ => path
                .iter()
                .try_fold(&self.attributes, |value, segment| value.get(segment))
                .cloned()
                .unwrap_or(Value::Null),
        }
    }

    fn project(&self, projection: &FieldProjection) -> SearchRow {
        let data: Map<String, Value> = projection
            .iter()
            .map(|(key, path)| (key.clone(), self.lookup(path)))
            .collect();
        SearchRow {
            url: Some(format!("nodes/{}", self.name)),
            data: Some(Value::Object(data)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Query {
    All,
    /// A `None` value matches any value of `key`.
    Field { key: String, value: Option<String> },
}

/// Split `term` at its first `:` not escaped by a backslash.
fn split_field(term: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in term.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ':' => return Some((&term[..i], &term[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Drop the backslash in front of every escaped character.
fn unescape(term: &str) -> String {
    let mut unescaped = String::with_capacity(term.len());
    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => unescaped.extend(chars.next()),
            c => unescaped.push(c),
        }
    }
    unescaped
}

impl Query {
    fn parse(query: &str) -> SourceResult<Self> {
        let query = query.trim();
        if query == MATCH_ALL {
            return Ok(Self::All);
        }
        match split_field(query) {
            Some((key, value))
                if !key.is_empty()
                    && !value.is_empty()
                    && !query.contains(char::is_whitespace) =>
            {
                Ok(Self::Field {
                    key: unescape(key),
                    value: (value != "*").then(|| unescape(value)),
                })
            }
            _ => Err(SourceError::InvalidQuery {
                query: query.to_string(),
            }),
        }
    }
}

/// Search client answering partial searches from exported node files.
#[derive(Debug)]
pub struct NodeExport {
    path: PathBuf,
    nodes: Vec<ExportedNode>,
}

impl NodeExport {
    /// Load every `*.json` node file in `path`.
    ///
    /// # Errors
    /// Returns an error if the directory or any node file cannot be read or parsed.
    pub fn from_dir<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let path = path.as_ref();
        let read_failed = |source: std::io::Error| SourceError::ReadFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(path).map_err(read_failed)? {
            let file = entry.map_err(read_failed)?.path();
            if file.is_file() && file.extension().is_some_and(|ext| ext == "json") {
                files.push(file);
            }
        }

        let mut nodes = files
            .iter()
            .map(|file| Self::load_node(file))
            .collect::<SourceResult<Vec<_>>>()?;
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        info!(path = %path.display(), nodes = nodes.len(), "Loaded node export");
        Ok(Self {
            path: path.to_path_buf(),
            nodes,
        })
    }

    fn load_node(file: &Path) -> SourceResult<ExportedNode> {
        let content = fs::read_to_string(file).map_err(|source| SourceError::ReadFailed {
            path: file.to_path_buf(),
            source,
        })?;
        let node: NodeFile =
            serde_json::from_str(&content).map_err(|source| SourceError::ParseFailed {
                path: file.to_path_buf(),
                source,
            })?;
        let fallback_name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ExportedNode::new(node, &fallback_name))
    }

    /// Number of nodes in the export.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run a partial search against the export.
    ///
    /// # Errors
    /// Returns an error for any index other than `node` or an unsupported query.
    pub fn search(
        &self,
        index: &str,
        query: &str,
        projection: &FieldProjection,
    ) -> SourceResult<SearchResult> {
        if index != NODE_INDEX {
            return Err(SourceError::UnsupportedIndex {
                index: index.to_string(),
            });
        }
        let query = Query::parse(query)?;

        let rows: Vec<SearchRow> = self
            .nodes
            .iter()
            .filter(|node| node.matches(&query))
            .map(|node| node.project(projection))
            .collect();
        debug!(
            path = %self.path.display(),
            ?query,
            matches = rows.len(),
            "Partial search"
        );

        Ok(SearchResult {
            total: rows.len(),
            start: 0,
            rows,
        })
    }
}

impl PartialSearch for NodeExport {
    fn partial_exec(
        &self,
        index: &str,
        query: &str,
        projection: &FieldProjection,
    ) -> anyhow::Result<SearchResult> {
        Ok(self.search(index, query, projection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::projection;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_node(dir: &Path, file: &str, node: &Value) {
        fs::write(dir.join(file), serde_json::to_string_pretty(node).unwrap()).unwrap();
    }

    fn export() -> (TempDir, NodeExport) {
        let dir = TempDir::new().unwrap();
        write_node(
            dir.path(),
            "web-1.json",
            &json!({
                "name": "web-1",
                "chef_environment": "production",
                "normal": {"tags": ["web"]},
                "automatic": {
                    "platform": "ubuntu",
                    "platform_version": "18.04",
                    "chef_packages": {"chef": {"version": "15.2.20"}},
                    "cookbooks": {
                        "apache2": {"version": "5.0.1"},
                        "users": {"version": "3.0.0"}
                    }
                }
            }),
        );
        write_node(
            dir.path(),
            "db-1.json",
            &json!({
                "name": "db-1",
                "default": {"platform": "overridden"},
                "automatic": {
                    "platform": "centos",
                    "cookbooks": {"users": {"version": "3.0.0"}}
                }
            }),
        );
        fs::write(dir.path().join("README.md"), "not a node").unwrap();
        let export = NodeExport::from_dir(dir.path()).unwrap();
        (dir, export)
    }

    #[test]
    fn test_deep_merge_precedence() {
        let mut base = json!({"a": {"b": 1, "c": 2}, "d": 1});
        deep_merge(&mut base, json!({"a": {"c": 3}, "d": {"e": 4}}));
        assert_eq!(base, json!({"a": {"b": 1, "c": 3}, "d": {"e": 4}}));
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(Query::parse("*:*").unwrap(), Query::All);
        assert_eq!(
            Query::parse("cookbooks_users_version:3.0.0").unwrap(),
            Query::Field {
                key: "cookbooks_users_version".to_string(),
                value: Some("3.0.0".to_string()),
            }
        );
        assert_eq!(
            Query::parse(r"cookbooks_chef\-client_version:11.3.0").unwrap(),
            Query::Field {
                key: "cookbooks_chef-client_version".to_string(),
                value: Some("11.3.0".to_string()),
            }
        );
        assert_eq!(
            Query::parse("platform:*").unwrap(),
            Query::Field {
                key: "platform".to_string(),
                value: None,
            }
        );
        assert_eq!(
            Query::parse(r"name:a\:b").unwrap(),
            Query::Field {
                key: "name".to_string(),
                value: Some("a:b".to_string()),
            }
        );
        assert!(Query::parse("name").is_err());
        assert!(Query::parse("name:a OR name:b").is_err());
        assert!(Query::parse(":value").is_err());
    }

    #[test]
    fn test_load_export() {
        let (_dir, export) = export();
        assert_eq!(export.len(), 2);
        assert_eq!(export.nodes[0].name, "db-1");
        assert_eq!(export.nodes[1].name, "web-1");
    }

    #[test]
    fn test_search_all_with_projection() {
        let (_dir, export) = export();
        let fields: &[(&str, &[&str])] = &[
            ("name", &["name"]),
            ("chef_version", &["chef_packages", "chef", "version"]),
            ("os", &["platform"]),
        ];

        let result = export.search("node", "*:*", &projection(fields)).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.rows[0].url.as_deref(), Some("nodes/db-1"));
        assert_eq!(
            result.rows[0].data,
            Some(json!({"name": "db-1", "chef_version": null, "os": "centos"}))
        );
        assert_eq!(
            result.rows[1].data,
            Some(json!({"name": "web-1", "chef_version": "15.2.20", "os": "ubuntu"}))
        );
    }

    #[test]
    fn test_search_by_flattened_attribute() {
        let (_dir, export) = export();
        let fields: &[(&str, &[&str])] = &[("name", &["name"])];
        let projection = projection(fields);

        let names = |query: &str| -> Vec<Value> {
            export
                .search("node", query, &projection)
                .unwrap()
                .rows
                .into_iter()
                .filter_map(|row| row.data?.get("name").cloned())
                .collect()
        };

        assert_eq!(
            names("cookbooks_users_version:3.0.0"),
            vec![json!("db-1"), json!("web-1")]
        );
        assert_eq!(names("cookbooks_apache2_version:5.0.1"), vec![json!("web-1")]);
        assert!(names("cookbooks_apache2_version:1.0.0").is_empty());
        assert_eq!(names("tags:web"), vec![json!("web-1")]);
        assert_eq!(names("chef_environment:production"), vec![json!("web-1")]);
        assert_eq!(names("platform:*"), vec![json!("db-1"), json!("web-1")]);
    }

    #[test]
    fn test_search_errors() {
        let (_dir, export) = export();
        let projection = FieldProjection::new();
        assert!(matches!(
            export.search("role", "*:*", &projection),
            Err(SourceError::UnsupportedIndex { .. })
        ));
        assert!(matches!(
            export.search("node", "garbage", &projection),
            Err(SourceError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_invalid_node_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        assert!(matches!(
            NodeExport::from_dir(dir.path()),
            Err(SourceError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            NodeExport::from_dir("/nonexistent/node/export"),
            Err(SourceError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_name_falls_back_to_file_name() {
        let dir = TempDir::new().unwrap();
        write_node(dir.path(), "anonymous.json", &json!({"automatic": {}}));
        let export = NodeExport::from_dir(dir.path()).unwrap();
        assert_eq!(export.nodes[0].name, "anonymous");
    }
}
