// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Lint engine running the `cookstyle` executable.

use serde::Deserialize;
use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{SourceError, SourceResult};
use super::process::wait_with_timeout;
use crate::reporting::{CookbookFile, CookstyleOffense, LintEngine};

/// Default timeout for a single cookstyle run (5 minutes).
pub const DEFAULT_COOKSTYLE_TIMEOUT: Duration = Duration::from_secs(300);

const COOKSTYLE_COMMAND: &str = "cookstyle";

#[derive(Debug, Deserialize)]
struct Output {
    #[serde(default)]
    files: Vec<FileOutput>,
}

#[derive(Debug, Deserialize)]
struct FileOutput {
    path: String,
    #[serde(default)]
    offenses: Vec<OffenseOutput>,
}

#[derive(Debug, Deserialize)]
struct OffenseOutput {
    cop_name: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    correctable: bool,
}

impl From<FileOutput> for CookbookFile {
    fn from(file: FileOutput) -> Self {
        Self {
            path: file.path,
            offenses: file
                .offenses
                .into_iter()
                .map(|offense| CookstyleOffense {
                    cop_name: offense.cop_name,
                    message: offense.message,
                    correctable: offense.correctable,
                })
                .collect(),
        }
    }
}

/// Parse the output of `cookstyle --format json`.
fn parse_output(output: &str, cookbook_dir: &Path) -> SourceResult<Vec<CookbookFile>> {
    let output: Output =
        serde_json::from_str(output).map_err(|source| SourceError::ParseFailed {
            path: cookbook_dir.to_path_buf(),
            source,
        })?;
    Ok(output.files.into_iter().map(CookbookFile::from).collect())
}

/// Runs cookstyle on downloaded cookbooks.
#[derive(Debug, Clone)]
pub struct Cookstyle {
    program: OsString,
    leading_args: Vec<OsString>,
    timeout: Duration,
}

impl Default for Cookstyle {
    fn default() -> Self {
        Self {
            program: COOKSTYLE_COMMAND.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_COOKSTYLE_TIMEOUT,
        }
    }
}

impl Cookstyle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `program` with `leading_args` instead of `cookstyle`.
    #[must_use]
    pub fn with_command<I, S>(mut self, program: impl Into<OsString>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.program = program.into();
        self.leading_args = leading_args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Run cookstyle inside `cookbook_dir` and collect the offenses of every inspected file.
    ///
    /// Paths are relative to the cookbook root. Exit status 1 means offenses were found
    /// and is not an error.
    ///
    /// # Errors
    /// Returns an error if cookstyle is missing, fails, times out or prints invalid output.
    pub fn run(&self, cookbook_dir: &Path) -> SourceResult<Vec<CookbookFile>> {
        let command = self.command_name();
        let failed = |source: std::io::Error| SourceError::CommandFailed {
            command: command.clone(),
            path: cookbook_dir.to_path_buf(),
            source,
        };

        // Output goes to files so a large report cannot block the process on a full pipe.
        let mut stdout = tempfile::tempfile().map_err(failed)?;
        let mut stderr = tempfile::tempfile().map_err(failed)?;

        let mut child = match Command::new(&self.program)
            .args(&self.leading_args)
            .args(["--format", "json", "."])
            .current_dir(cookbook_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout.try_clone().map_err(failed)?))
            .stderr(Stdio::from(stderr.try_clone().map_err(failed)?))
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::CommandNotFound {
                    command: command.clone(),
                });
            }
            Err(e) => return Err(failed(e)),
        };

        debug!(cookbook = %cookbook_dir.display(), "Running cookstyle");
        let status = wait_with_timeout(&mut child, self.timeout, &command, cookbook_dir)?;

        match status.code() {
            Some(0 | 1) => parse_output(&read_all(&mut stdout).map_err(failed)?, cookbook_dir),
            code => {
                let stderr = read_all(&mut stderr).unwrap_or_default();
                warn!(cookbook = %cookbook_dir.display(), ?code, "cookstyle failed");
                Err(SourceError::LintFailed {
                    path: cookbook_dir.to_path_buf(),
                    reason: format!(
                        "{command} exited with status {}: {}",
                        code.unwrap_or(-1),
                        stderr.trim()
                    ),
                })
            }
        }
    }
}

fn read_all(file: &mut File) -> std::io::Result<String> {
    file.rewind()?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

impl LintEngine for Cookstyle {
    fn lint(&self, cookbook_dir: &Path) -> anyhow::Result<Vec<CookbookFile>> {
        Ok(self.run(cookbook_dir)?)
    }
}
