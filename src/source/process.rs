// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Waiting on external commands with a deadline.

use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Child, ExitStatus};
use std::time::Duration;
use wait_timeout::ChildExt;

use super::error::{SourceError, SourceResult};

/// Wait for a child process to complete with a timeout.
///
/// If the timeout is reached, the process is killed.
///
/// # Returns
/// - `Ok(ExitStatus)` if the process exited within the timeout
/// - `Err(SourceError::CommandTimeout)` if the process timed out
/// - `Err(SourceError::CommandFailed)` if waiting failed or the process was killed by a signal
pub(crate) fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
    cookbook_path: &Path,
) -> SourceResult<ExitStatus> {
    let failed = |source: std::io::Error| SourceError::CommandFailed {
        command: command.to_string(),
        path: cookbook_path.to_path_buf(),
        source,
    };

    match child.wait_timeout(timeout).map_err(failed)? {
        Some(status) if status.code().is_some() => Ok(status),
        Some(status) => Err(failed(std::io::Error::other(match status.signal() {
            Some(signal) => format!("Process terminated by signal: {signal}"),
            None => "Unknown process termination".to_string(),
        }))),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(SourceError::CommandTimeout {
                command: command.to_string(),
                path: cookbook_path.to_path_buf(),
                timeout,
            })
        }
    }
}
