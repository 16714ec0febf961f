// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Reports on the nodes and cookbooks of a Chef Infra Server.
//!
//! This crate provides functionality to:
//! - Collect node inventory (Chef version, platform, applied cookbooks) from a partial search
//! - Collect cookbook usage and cookstyle offenses, isolating failures per cookbook
//! - Render both reports as tables, CSV or plain text

pub mod formatter;
pub mod reporting;
pub mod source;

// Re-export key types for convenience
pub use formatter::FormattedResult;
pub use reporting::{CookbookRecord, CookbooksStatus, NodeReportItem};
