// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Record types produced by the aggregators and consumed by the formatters.

use serde::Serialize;
use std::fmt;

/// A cookbook identified by name and version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CookbookVersion {
    pub name: String,
    pub version: String,
}

impl CookbookVersion {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for CookbookVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.version)
    }
}

/// One managed host as returned by the node search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeReportItem {
    pub name: String,
    pub chef_version: String,
    pub os: String,
    pub os_version: String,
    pub cookbook_versions: Vec<CookbookVersion>,
}

impl NodeReportItem {
    /// Applied cookbooks rendered as `name(version)`, in stored order.
    #[must_use]
    pub fn cookbooks_list(&self) -> Vec<String> {
        self.cookbook_versions.iter().map(ToString::to_string).collect()
    }

    /// Operating system rendered as `<os> v<os_version>`, or empty when the OS is unknown.
    #[must_use]
    pub fn os_version_pretty(&self) -> String {
        if self.os.is_empty() {
            String::new()
        } else {
            format!("{} v{}", self.os, self.os_version)
        }
    }
}

/// A single lint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookstyleOffense {
    pub cop_name: String,
    pub message: String,
    pub correctable: bool,
}

/// A cookbook file and the offenses found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookbookFile {
    pub path: String,
    pub offenses: Vec<CookstyleOffense>,
}

/// Outcome of one acquisition phase for a cookbook.
///
/// A failed phase carries the rendered error and never any data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum PhaseResult<T> {
    #[default]
    NotRun,
    Succeeded(T),
    Failed(String),
}

impl<T> PhaseResult<T> {
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(error) => Some(error.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl<T> From<anyhow::Result<T>> for PhaseResult<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Succeeded(value),
            // Alternate formatting keeps the whole context chain.
            Err(error) => Self::Failed(format!("{error:#}")),
        }
    }
}

/// One cookbook at one version, with the outcome of every acquisition phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookbookRecord {
    pub name: String,
    pub version: String,
    pub download: PhaseResult<()>,
    pub usage: PhaseResult<Vec<String>>,
    pub cookstyle: PhaseResult<Vec<CookbookFile>>,
}

impl CookbookRecord {
    /// Create a record with no phase run yet.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            download: PhaseResult::NotRun,
            usage: PhaseResult::NotRun,
            cookstyle: PhaseResult::NotRun,
        }
    }

    #[must_use]
    pub fn with_nodes<S: Into<String>>(mut self, nodes: impl IntoIterator<Item = S>) -> Self {
        self.usage = PhaseResult::Succeeded(nodes.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_files(mut self, files: Vec<CookbookFile>) -> Self {
        self.cookstyle = PhaseResult::Succeeded(files);
        self
    }

    #[must_use]
    pub fn with_download_error(mut self, error: impl Into<String>) -> Self {
        self.download = PhaseResult::Failed(error.into());
        self
    }

    #[must_use]
    pub fn with_usage_lookup_error(mut self, error: impl Into<String>) -> Self {
        self.usage = PhaseResult::Failed(error.into());
        self
    }

    #[must_use]
    pub fn with_cookstyle_error(mut self, error: impl Into<String>) -> Self {
        self.cookstyle = PhaseResult::Failed(error.into());
        self
    }

    /// Nodes known to use this cookbook version. Empty unless the usage lookup succeeded.
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        self.usage.value().map(Vec::as_slice).unwrap_or_default()
    }

    /// Files analyzed by cookstyle. Empty unless the lint phase succeeded.
    #[must_use]
    pub fn files(&self) -> &[CookbookFile] {
        self.cookstyle.value().map(Vec::as_slice).unwrap_or_default()
    }

    /// Files with at least one offense, in analysis order.
    pub fn offending_files(&self) -> impl Iterator<Item = &CookbookFile> {
        self.files().iter().filter(|file| !file.offenses.is_empty())
    }

    #[must_use]
    pub fn num_nodes_affected(&self) -> usize {
        self.nodes().len()
    }

    #[must_use]
    pub fn num_offenses(&self) -> usize {
        self.files().iter().map(|file| file.offenses.len()).sum()
    }

    #[must_use]
    pub fn num_correctable(&self) -> usize {
        self.files()
            .iter()
            .flat_map(|file| &file.offenses)
            .filter(|offense| offense.correctable)
            .count()
    }

    /// Phase failures in the order download, usage lookup, cookstyle.
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        [
            self.download.error(),
            self.usage.error(),
            self.cookstyle.error(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Result of the cookbook aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CookbooksStatus {
    pub records: Vec<CookbookRecord>,
    /// Whether lint analysis was requested for this run.
    pub run_cookstyle: bool,
    pub total_cookbooks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offense(cop_name: &str, correctable: bool) -> CookstyleOffense {
        CookstyleOffense {
            cop_name: cop_name.to_string(),
            message: "message".to_string(),
            correctable,
        }
    }

    #[test]
    fn test_cookbook_version_display() {
        let cookbook = CookbookVersion::new("apache2", "5.0.1");
        assert_eq!(cookbook.to_string(), "apache2(5.0.1)");
    }

    #[test]
    fn test_os_version_pretty() {
        let mut node = NodeReportItem {
            name: "node1".to_string(),
            os: "ubuntu".to_string(),
            os_version: "16.04".to_string(),
            ..NodeReportItem::default()
        };
        assert_eq!(node.os_version_pretty(), "ubuntu v16.04");

        node.os.clear();
        assert_eq!(node.os_version_pretty(), "");
    }

    #[test]
    fn test_cookbooks_list_keeps_order() {
        let node = NodeReportItem {
            cookbook_versions: vec![
                CookbookVersion::new("mycookbook", "1.0"),
                CookbookVersion::new("test", "9.9"),
            ],
            ..NodeReportItem::default()
        };
        assert_eq!(node.cookbooks_list(), vec!["mycookbook(1.0)", "test(9.9)"]);
    }

    #[test]
    fn test_counts() {
        let record = CookbookRecord::new("my-cookbook", "1.0")
            .with_nodes(["node-1", "node-2"])
            .with_files(vec![
                CookbookFile {
                    path: "recipes/default.rb".to_string(),
                    offenses: vec![
                        offense("Chef/Deprecations/A", true),
                        offense("Chef/Style/B", false),
                    ],
                },
                CookbookFile {
                    path: "metadata.rb".to_string(),
                    offenses: vec![],
                },
                CookbookFile {
                    path: "attributes/default.rb".to_string(),
                    offenses: vec![offense("Chef/Correctness/C", true)],
                },
            ]);

        assert_eq!(record.num_nodes_affected(), 2);
        assert_eq!(record.num_offenses(), 3);
        assert_eq!(record.num_correctable(), 2);
        assert_eq!(record.files().len(), 3);
        let offending: Vec<&str> = record.offending_files().map(|f| f.path.as_str()).collect();
        assert_eq!(offending, vec!["recipes/default.rb", "attributes/default.rb"]);
    }

    #[test]
    fn test_failed_phases_hold_no_data() {
        let record = CookbookRecord::new("my-cookbook", "1.0")
            .with_nodes(["node-1"])
            .with_usage_lookup_error("search failed");
        assert!(record.nodes().is_empty());
        assert_eq!(record.num_nodes_affected(), 0);
        assert!(record.usage.is_failed());
    }

    #[test]
    fn test_errors_order() {
        let record = CookbookRecord::new("my-cookbook", "1.0")
            .with_cookstyle_error("cookstyle error")
            .with_usage_lookup_error("could not look up usage")
            .with_download_error("could not download");
        assert_eq!(
            record.errors(),
            vec!["could not download", "could not look up usage", "cookstyle error"]
        );
    }

    #[test]
    fn test_no_errors() {
        let record = CookbookRecord::new("my-cookbook", "1.0").with_nodes(Vec::<String>::new());
        assert!(record.errors().is_empty());
    }

    #[test]
    fn test_phase_result_from_anyhow() {
        let ok: PhaseResult<u8> = Ok(1).into();
        assert_eq!(ok, PhaseResult::Succeeded(1));

        let err: PhaseResult<u8> =
            Err(anyhow::anyhow!("root cause").context("outer context")).into();
        assert_eq!(err.error(), Some("outer context: root cause"));
    }
}
