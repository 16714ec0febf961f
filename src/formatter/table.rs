// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Table output for interactive use.

use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use super::FormattedResult;
use crate::reporting::NodeReportItem;

/// Width the table content is wrapped to.
pub(crate) const TABLE_WIDTH: u16 = 120;

/// Create a table with the default preset styling.
///
/// Every row is framed so wrapped cells stay readable. Terminal styling is disabled to keep
/// the output independent of where it is written to.
fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH)
        .force_no_tty();
    table
}

/// Render the node report as a table, one row per node.
#[must_use]
pub fn nodes_report_table(records: &[NodeReportItem]) -> FormattedResult {
    if records.is_empty() {
        return FormattedResult::default();
    }

    let mut table = default_table_preset();
    table.set_header(
        ["Node Name", "Chef Version", "OS", "OS Version", "Cookbooks"]
            .into_iter()
            .map(|title| Cell::new(title).add_attribute(Attribute::Bold)),
    );
    for record in records {
        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.chef_version),
            Cell::new(&record.os),
            Cell::new(&record.os_version),
            Cell::new(record.cookbooks_list().join(" ")),
        ]);
    }

    FormattedResult::new(format!("{table}\n"), String::new())
}
