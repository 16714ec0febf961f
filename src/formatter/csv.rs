// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! CSV reports.

use ::csv::{Terminator, WriterBuilder};

use super::{join_or, write_record_errors, FormattedResult};
use crate::reporting::{CookbooksStatus, NodeReportItem};

const COOKSTYLE_HEADERS: [&str; 7] = [
    "Cookbook Name",
    "Version",
    "File",
    "Offense",
    "Automatically Correctable",
    "Message",
    "Nodes",
];
const COOKBOOK_HEADERS: [&str; 3] = ["Cookbook Name", "Version", "Nodes"];
const NODE_HEADERS: [&str; 4] = ["Node Name", "Chef Version", "Operating System", "Cookbooks"];

/// Encode `rows` as CSV with one `\n` after every record.
fn write_csv(rows: &[Vec<String>]) -> Result<String, String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    let bytes = writer.into_inner().map_err(|e| e.error().to_string())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render CSV rows, reporting an encoding failure on the error stream.
fn csv_result(rows: &[Vec<String>], mut errors: String) -> FormattedResult {
    match write_csv(rows) {
        Ok(report) => FormattedResult::new(report, errors),
        Err(e) => {
            errors.push_str(&format!(" - unable to write CSV report: {e}\n"));
            FormattedResult::new(String::new(), errors)
        }
    }
}

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(ToString::to_string).collect()
}

/// Render the cookbook report as CSV.
///
/// With cookstyle, one row per offense; otherwise one row per cookbook.
#[must_use]
pub fn cookbooks_report_csv(status: &CookbooksStatus) -> FormattedResult {
    if status.records.is_empty() {
        return FormattedResult::default();
    }

    let mut rows = vec![if status.run_cookstyle {
        header(&COOKSTYLE_HEADERS)
    } else {
        header(&COOKBOOK_HEADERS)
    }];
    let mut errors = String::new();

    for record in &status.records {
        let nodes = join_or(record.nodes(), " ", "None");

        if status.run_cookstyle {
            for file in record.offending_files() {
                for offense in &file.offenses {
                    rows.push(vec![
                        record.name.clone(),
                        record.version.clone(),
                        file.path.clone(),
                        offense.cop_name.clone(),
                        if offense.correctable { "Y" } else { "N" }.to_string(),
                        offense.message.clone(),
                        nodes.clone(),
                    ]);
                }
            }
        } else {
            rows.push(vec![record.name.clone(), record.version.clone(), nodes]);
        }

        write_record_errors(&mut errors, record);
    }

    csv_result(&rows, errors)
}

/// Render the node report as CSV, one row per node.
#[must_use]
pub fn nodes_report_csv(records: &[NodeReportItem]) -> FormattedResult {
    if records.is_empty() {
        return FormattedResult::default();
    }

    let mut rows = vec![header(&NODE_HEADERS)];
    rows.extend(records.iter().map(|record| {
        vec![
            record.name.clone(),
            record.chef_version.clone(),
            record.os_version_pretty(),
            join_or(&record.cookbooks_list(), " ", "None"),
        ]
    }));

    csv_result(&rows, String::new())
}
