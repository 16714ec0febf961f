// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Builds the node report from a partial search over the `node` index.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use super::records::{CookbookVersion, NodeReportItem};
use super::search::{projection, PartialSearch, SearchRow};

const NODE_FIELDS: &[(&str, &[&str])] = &[
    ("name", &["name"]),
    ("chef_version", &["chef_packages", "chef", "version"]),
    ("os", &["platform"]),
    ("os_version", &["platform_version"]),
    ("cookbooks", &["cookbooks"]),
];

/// Typed view of one search row.
#[derive(Debug, Default, Deserialize)]
struct NodeRowData {
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    chef_version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    os: String,
    #[serde(default, deserialize_with = "lenient_string")]
    os_version: String,
    // Sorted by cookbook name so the report is stable between runs.
    #[serde(default, deserialize_with = "lenient_cookbooks")]
    cookbooks: BTreeMap<String, String>,
}

/// Accepts any JSON value: strings as-is, null as empty, scalars as their text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Accepts any JSON value as a cookbook map of name to version.
///
/// A value that is not an object yields no cookbooks; an entry that is not an object, or
/// has no usable `version`, yields an empty version.
fn lenient_cookbooks<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Object(entries) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(name, entry)| {
            let version = match entry.get("version") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };
            (name, version)
        })
        .collect())
}

impl From<NodeRowData> for NodeReportItem {
    fn from(data: NodeRowData) -> Self {
        Self {
            name: data.name,
            chef_version: data.chef_version,
            os: data.os,
            os_version: data.os_version,
            cookbook_versions: data
                .cookbooks
                .into_iter()
                .map(|(name, version)| CookbookVersion::new(name, version))
                .collect(),
        }
    }
}

/// Convert a search row, or `None` if the row carries no node payload.
fn node_from_row(row: SearchRow) -> Option<NodeReportItem> {
    let data = row.data?;
    if !data.is_object() {
        return None;
    }
    NodeRowData::deserialize(data).ok().map(NodeReportItem::from)
}

/// Query every node and collect its Chef version, platform and applied cookbooks.
///
/// Rows without a data payload are skipped: the server omits the data of nodes the
/// caller cannot read, so fewer items than `total` is expected.
///
/// # Errors
/// Returns an error if the search itself fails.
pub fn nodes(searcher: &dyn PartialSearch) -> Result<Vec<NodeReportItem>> {
    let query = projection(NODE_FIELDS);
    let result = searcher
        .partial_exec("node", "*:*", &query)
        .context("unable to get node(s) information")?;

    Ok(result.rows.into_iter().filter_map(node_from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::search::{FieldProjection, SearchResult};
    use serde_json::json;

    struct FakeSearch(Result<SearchResult, String>);

    impl PartialSearch for FakeSearch {
        fn partial_exec(
            &self,
            index: &str,
            query: &str,
            projection: &FieldProjection,
        ) -> Result<SearchResult> {
            assert_eq!(index, "node");
            assert_eq!(query, "*:*");
            assert_eq!(
                projection["chef_version"],
                vec!["chef_packages", "chef", "version"]
            );
            self.0.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn row(data: Option<serde_json::Value>) -> SearchRow {
        SearchRow { url: None, data }
    }

    #[test]
    fn test_nodes_full_row() {
        let search = FakeSearch(Ok(SearchResult {
            total: 1,
            start: 0,
            rows: vec![row(Some(json!({
                "name": "node1",
                "chef_version": "15.2.20",
                "os": "ubuntu",
                "os_version": "18.04",
                "cookbooks": {
                    "mycookbook": {"version": "1.0.0"},
                    "apache2": {"version": "5.0.1"}
                }
            })))],
        }));

        let nodes = nodes(&search).unwrap();
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(node.name, "node1");
        assert_eq!(node.chef_version, "15.2.20");
        assert_eq!(node.os, "ubuntu");
        assert_eq!(node.os_version, "18.04");
        assert_eq!(
            node.cookbook_versions,
            vec![
                CookbookVersion::new("apache2", "5.0.1"),
                CookbookVersion::new("mycookbook", "1.0.0"),
            ]
        );
    }

    #[test]
    fn test_nodes_missing_and_null_fields() {
        let search = FakeSearch(Ok(SearchResult {
            total: 1,
            start: 0,
            rows: vec![row(Some(json!({
                "name": "node1",
                "chef_version": null,
                "cookbooks": null
            })))],
        }));

        let nodes = nodes(&search).unwrap();
        assert_eq!(
            nodes,
            vec![NodeReportItem {
                name: "node1".to_string(),
                ..NodeReportItem::default()
            }]
        );
    }

    #[test]
    fn test_nodes_cookbook_without_version() {
        let search = FakeSearch(Ok(SearchResult {
            total: 1,
            start: 0,
            rows: vec![row(Some(json!({
                "name": "node1",
                "cookbooks": {"mycookbook": {}}
            })))],
        }));

        let nodes = nodes(&search).unwrap();
        assert_eq!(
            nodes[0].cookbook_versions,
            vec![CookbookVersion::new("mycookbook", "")]
        );
    }

    #[test]
    fn test_nodes_malformed_cookbooks_keep_node() {
        let search = FakeSearch(Ok(SearchResult {
            total: 4,
            start: 0,
            rows: vec![
                row(Some(json!({"name": "null-entry", "cookbooks": {"apache2": null}}))),
                row(Some(json!({"name": "string-entry", "cookbooks": {"apache2": "5.0.1"}}))),
                row(Some(json!({"name": "array-cookbooks", "cookbooks": []}))),
                row(Some(json!({"name": "ok"}))),
            ],
        }));

        let nodes = nodes(&search).unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["null-entry", "string-entry", "array-cookbooks", "ok"]);
        assert_eq!(
            nodes[0].cookbook_versions,
            vec![CookbookVersion::new("apache2", "")]
        );
        assert_eq!(
            nodes[1].cookbook_versions,
            vec![CookbookVersion::new("apache2", "")]
        );
        assert!(nodes[2].cookbook_versions.is_empty());
        assert!(nodes[3].cookbook_versions.is_empty());
    }

    #[test]
    fn test_nodes_skips_rows_without_data() {
        let search = FakeSearch(Ok(SearchResult {
            total: 4,
            start: 0,
            rows: vec![
                row(Some(json!({"name": "node1"}))),
                row(None),
                row(Some(serde_json::Value::Null)),
                row(Some(json!({"name": "node2"}))),
            ],
        }));

        let names: Vec<String> = nodes(&search).unwrap().into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["node1", "node2"]);
    }

    #[test]
    fn test_nodes_search_error() {
        let search = FakeSearch(Err("connection refused".to_string()));
        let err = nodes(&search).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            "unable to get node(s) information: connection refused"
        );
    }

    #[test]
    fn test_nodes_empty_result() {
        let search = FakeSearch(Ok(SearchResult::default()));
        assert!(nodes(&search).unwrap().is_empty());
    }
}
