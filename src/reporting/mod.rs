// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Report aggregation: turns search, inventory and lint results into report records.

mod cookbooks;
mod nodes;
mod records;
mod search;

pub use cookbooks::{cookbook_usage, cookbooks, CookbookSource, LintEngine};
pub use nodes::nodes;
pub use records::{
    CookbookFile, CookbookRecord, CookbookVersion, CookbooksStatus, CookstyleOffense,
    NodeReportItem, PhaseResult,
};
pub use search::{
    escape_query_term, projection, FieldProjection, PartialSearch, SearchResult, SearchRow,
};
