// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Interface to the server's partial search API.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps each result key to the attribute path it is read from.
pub type FieldProjection = BTreeMap<String, Vec<String>>;

/// Response of a partial search.
///
/// `total` is the number of matches reported by the server. It can be larger than
/// `rows.len()` when the caller is not allowed to read every match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub rows: Vec<SearchRow>,
}

/// One entity of a partial search, holding the projected fields in `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRow {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// A client able to run projected queries against a search index.
pub trait PartialSearch {
    /// Run `query` against `index`, returning only the projected fields of each match.
    ///
    /// # Errors
    /// Returns an error if the query cannot be executed.
    fn partial_exec(
        &self,
        index: &str,
        query: &str,
        projection: &FieldProjection,
    ) -> Result<SearchResult>;
}

/// Characters with a meaning in search query syntax.
const QUERY_SPECIAL_CHARS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

/// Escape `term` with backslashes so it matches literally inside a query.
#[must_use]
pub fn escape_query_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if QUERY_SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build a projection from `(key, path)` pairs.
#[must_use]
pub fn projection(fields: &[(&str, &[&str])]) -> FieldProjection {
    fields
        .iter()
        .map(|(key, path)| {
            (
                (*key).to_string(),
                path.iter().map(|segment| (*segment).to_string()).collect(),
            )
        })
        .collect()
}
