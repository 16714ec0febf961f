// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Renders report records as tables, CSV or plain text.
//!
//! Every formatter returns the rendered report together with the text of the errors
//! recorded on the records. Empty input renders as two empty strings.

mod csv;
mod table;
mod txt;

pub use self::csv::{cookbooks_report_csv, nodes_report_csv};
pub use self::table::nodes_report_table;
pub use self::txt::{cookbooks_report_summary, cookbooks_report_txt, nodes_report_txt};

use std::fmt::Write;

use crate::reporting::CookbookRecord;

/// A rendered report and the errors collected while rendering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedResult {
    pub report: String,
    pub errors: String,
}

impl FormattedResult {
    #[must_use]
    pub fn new(report: String, errors: String) -> Self {
        Self { report, errors }
    }
}

/// Join `items` with `separator`, or return `placeholder` if there are none.
pub(crate) fn join_or<S: AsRef<str>>(items: &[S], separator: &str, placeholder: &str) -> String {
    if items.is_empty() {
        return placeholder.to_string();
    }
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(separator)
}

/// Append one ` - <name> (<version>): <error>` line per error of `record`.
pub(crate) fn write_record_errors(out: &mut String, record: &CookbookRecord) {
    for error in record.errors() {
        let _ = writeln!(out, " - {} ({}): {}", record.name, record.version, error);
    }
}
