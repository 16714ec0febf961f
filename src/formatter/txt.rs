// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Plain text reports.

use std::fmt::Write;

use super::{join_or, write_record_errors, FormattedResult};
use crate::reporting::{CookbooksStatus, NodeReportItem};

const UNKNOWN_PLACEHOLDER: &str = "unknown";

fn string_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN_PLACEHOLDER
    } else {
        value
    }
}

/// Render the cookbook report as text, one block per cookbook.
#[must_use]
pub fn cookbooks_report_txt(status: &CookbooksStatus) -> FormattedResult {
    if status.records.is_empty() {
        return FormattedResult::default();
    }

    let mut report = String::new();
    let mut errors = String::new();

    for record in &status.records {
        let _ = writeln!(report, "> Cookbook: {} ({})", record.name, record.version);
        let _ = writeln!(
            report,
            "  Nodes affected: {}",
            join_or(record.nodes(), ", ", "none")
        );

        if status.run_cookstyle {
            let _ = writeln!(report, "  Violations: {}", record.num_offenses());
            let _ = writeln!(report, "  Auto correctable: {}", record.num_correctable());
            report.push_str("  Files and offenses:");
            for file in record.offending_files() {
                let _ = write!(report, "\n   - {}:", file.path);
                for offense in &file.offenses {
                    let _ = write!(
                        report,
                        "\n\t{} ({}) {}",
                        offense.cop_name, offense.correctable, offense.message
                    );
                }
            }
            if record.num_offenses() == 0 {
                report.push_str(" none\n");
            } else {
                report.push('\n');
            }
        }

        write_record_errors(&mut errors, record);
    }

    FormattedResult::new(report, errors)
}

/// Render a one line summary per cookbook: violations, auto-correctable offenses and
/// affected nodes.
#[must_use]
pub fn cookbooks_report_summary(status: &CookbooksStatus) -> FormattedResult {
    if status.records.is_empty() {
        return FormattedResult::default();
    }

    let mut report = String::new();
    let mut errors = String::new();
    for record in &status.records {
        let _ = writeln!(
            report,
            "{} ({}): {} violations, {} auto-correctable, {} nodes affected",
            record.name,
            record.version,
            record.num_offenses(),
            record.num_correctable(),
            record.num_nodes_affected()
        );
        write_record_errors(&mut errors, record);
    }

    FormattedResult::new(report, errors)
}

/// Render the node report as text, one block per node.
#[must_use]
pub fn nodes_report_txt(records: &[NodeReportItem]) -> FormattedResult {
    if records.is_empty() {
        return FormattedResult::default();
    }

    let mut report = String::new();
    for record in records {
        let _ = writeln!(report, "> Node: {}", record.name);
        let _ = writeln!(
            report,
            "  Chef Version: {}",
            string_or_unknown(&record.chef_version)
        );
        let _ = writeln!(
            report,
            "  Operating System: {}",
            string_or_unknown(&record.os_version_pretty())
        );
        let _ = writeln!(
            report,
            "  Cookbooks Applied: {}",
            join_or(&record.cookbooks_list(), ", ", "none")
        );
    }

    FormattedResult::new(report, String::new())
}
