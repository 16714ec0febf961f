// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Errors raised by the local data sources.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for data source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while reading node exports, cookbooks or running cookstyle.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path:?}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported search index: {index}")]
    UnsupportedIndex { index: String },
    #[error("Invalid search query: {query}")]
    InvalidQuery { query: String },
    #[error("Cookbook not found: {cookbook}")]
    CookbookNotFound { cookbook: String },
    #[error("Failed to copy {from:?} to {to:?}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to walk directory: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("Command failed: {command} (cookbook: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {timeout:?}: {command} (cookbook: {path:?})")]
    CommandTimeout {
        command: String,
        path: PathBuf,
        timeout: Duration,
    },
    #[error("Lint failed for cookbook {path:?}: {reason}")]
    LintFailed { path: PathBuf, reason: String },
}
