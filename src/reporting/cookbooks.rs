// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Builds the cookbook report: inventory, node usage and cookstyle analysis per cookbook.
//!
//! Each cookbook is processed on its own. A failing download, usage lookup or lint run is
//! stored on that cookbook's record and never aborts the report.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::records::{
    CookbookFile, CookbookRecord, CookbookVersion, CookbooksStatus, PhaseResult,
};
use super::search::{escape_query_term, projection, PartialSearch};

/// Lists and fetches cookbooks.
pub trait CookbookSource {
    /// List every available cookbook version.
    ///
    /// # Errors
    /// Returns an error if the inventory cannot be read.
    fn list_available(&self) -> Result<Vec<CookbookVersion>>;

    /// Fetch a cookbook version into `dest`, returning the cookbook's root directory.
    ///
    /// # Errors
    /// Returns an error if the cookbook cannot be fetched.
    fn download(&self, cookbook: &CookbookVersion, dest: &Path) -> Result<PathBuf>;
}

/// Runs static analysis on a fetched cookbook.
pub trait LintEngine {
    /// Analyze the cookbook rooted at `cookbook_dir`.
    ///
    /// # Errors
    /// Returns an error if the analysis could not be performed.
    fn lint(&self, cookbook_dir: &Path) -> Result<Vec<CookbookFile>>;
}

/// Names of the nodes that have `cookbook` applied at exactly its version.
///
/// Names are returned in search order, without duplicates. The cookbook name and version
/// are escaped, so search syntax characters in them match literally.
///
/// # Errors
/// Returns an error if the search fails.
pub fn cookbook_usage(
    searcher: &dyn PartialSearch,
    cookbook: &CookbookVersion,
) -> Result<Vec<String>> {
    let fields: &[(&str, &[&str])] = &[("name", &["name"])];
    let query = format!(
        "cookbooks_{}_version:{}",
        escape_query_term(&cookbook.name),
        escape_query_term(&cookbook.version)
    );
    let result = searcher
        .partial_exec("node", &query, &projection(fields))
        .with_context(|| format!("unable to look up nodes using {cookbook}"))?;

    let mut seen = HashSet::new();
    Ok(result
        .rows
        .into_iter()
        .filter_map(|row| {
            row.data?
                .get("name")?
                .as_str()
                .filter(|name| !name.is_empty())
                .map(ToString::to_string)
        })
        .filter(|name| seen.insert(name.clone()))
        .collect())
}

/// Compare versions component-wise.
///
/// Numeric components compare numerically and sort before non-numeric ones, which
/// compare as text.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Fetch a cookbook into a fresh temporary directory.
fn download(
    source: &dyn CookbookSource,
    cookbook: &CookbookVersion,
) -> Result<(TempDir, PathBuf)> {
    let dest = TempDir::new().context("unable to create download directory")?;
    let path = source
        .download(cookbook, dest.path())
        .with_context(|| format!("unable to download {cookbook}"))?;
    Ok((dest, path))
}

/// Run every phase for one cookbook, recording each failure on the returned record.
fn cookbook_record(
    cookbook: &CookbookVersion,
    source: &dyn CookbookSource,
    searcher: &dyn PartialSearch,
    linter: Option<&dyn LintEngine>,
) -> CookbookRecord {
    let mut record = CookbookRecord::new(cookbook.name.as_str(), cookbook.version.as_str());

    let Some(linter) = linter else {
        record.usage = cookbook_usage(searcher, cookbook).into();
        return record;
    };

    let (dest, path) = match download(source, cookbook) {
        Ok(downloaded) => downloaded,
        Err(e) => {
            // Nothing else is looked up for a cookbook that could not be fetched.
            record.download = PhaseResult::Failed(format!("{e:#}"));
            return record;
        }
    };
    record.download = PhaseResult::Succeeded(());
    record.usage = cookbook_usage(searcher, cookbook).into();
    record.cookstyle = linter
        .lint(&path)
        .with_context(|| format!("unable to run cookstyle on {cookbook}"))
        .into();

    let _ = dest.close();
    record
}

/// Collect every available cookbook version together with the nodes using it.
///
/// When `linter` is given, each cookbook is also downloaded and analyzed, and the status is
/// marked as a cookstyle run. Records are ordered by name, then version.
///
/// # Errors
/// Returns an error only if the cookbook inventory cannot be listed.
pub fn cookbooks(
    source: &dyn CookbookSource,
    searcher: &dyn PartialSearch,
    linter: Option<&dyn LintEngine>,
) -> Result<CookbooksStatus> {
    let mut inventory = source
        .list_available()
        .context("unable to retrieve cookbooks")?;
    inventory.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| compare_versions(&a.version, &b.version))
            .then_with(|| a.version.cmp(&b.version))
    });
    inventory.dedup();

    let records = inventory
        .iter()
        .map(|cookbook| cookbook_record(cookbook, source, searcher, linter))
        .collect();

    Ok(CookbooksStatus {
        records,
        run_cookstyle: linter.is_some(),
        total_cookbooks: inventory.len(),
    })
}
