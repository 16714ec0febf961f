// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Cookbook inventory backed by a local directory of versioned cookbooks.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::error::{SourceError, SourceResult};
use crate::reporting::{CookbookSource, CookbookVersion};

/// Split a `<name>-<version>` directory name.
///
/// The version is the part after the last `-` and must start with a digit.
fn parse_cookbook_dir(dir_name: &str) -> Option<CookbookVersion> {
    let (name, version) = dir_name.rsplit_once('-')?;
    let versioned = version.chars().next().is_some_and(|c| c.is_ascii_digit());
    (!name.is_empty() && versioned).then(|| CookbookVersion::new(name, version))
}

/// Directory holding one sub-directory per cookbook version, named `<name>-<version>`.
#[derive(Debug, Clone)]
pub struct CookbookRepository {
    root: PathBuf,
}

impl CookbookRepository {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every cookbook version found in the repository.
    ///
    /// Entries that are not `<name>-<version>` directories are ignored.
    ///
    /// # Errors
    /// Returns an error if the repository directory cannot be read.
    pub fn cookbooks(&self) -> SourceResult<Vec<CookbookVersion>> {
        let read_failed = |source: std::io::Error| SourceError::ReadFailed {
            path: self.root.clone(),
            source,
        };

        let mut cookbooks = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(read_failed)? {
            let path = entry.map_err(read_failed)?.path();
            let parsed = path
                .is_dir()
                .then(|| path.file_name().and_then(|n| n.to_str()))
                .flatten()
                .and_then(parse_cookbook_dir);
            match parsed {
                Some(cookbook) => cookbooks.push(cookbook),
                None => debug!(path = %path.display(), "Skipping non-cookbook entry"),
            }
        }

        info!(root = %self.root.display(), cookbooks = cookbooks.len(), "Listed cookbooks");
        Ok(cookbooks)
    }

    /// Copy a cookbook version into `dest`, returning the copy's root directory.
    ///
    /// # Errors
    /// Returns an error if the cookbook does not exist or cannot be copied.
    pub fn copy_to(&self, cookbook: &CookbookVersion, dest: &Path) -> SourceResult<PathBuf> {
        let dir_name = format!("{}-{}", cookbook.name, cookbook.version);
        let source = self.root.join(&dir_name);
        if !source.is_dir() {
            return Err(SourceError::CookbookNotFound {
                cookbook: cookbook.to_string(),
            });
        }

        let target = dest.join(&dir_name);
        for entry in WalkDir::new(&source).follow_links(true) {
            let entry = entry.map_err(|e| SourceError::WalkDirFailed {
                path: source.clone(),
                source: e,
            })?;
            // Every walked entry lives below `source`.
            let Ok(relative) = entry.path().strip_prefix(&source) else {
                continue;
            };
            let to = target.join(relative);
            let copy_failed = |e: std::io::Error| SourceError::CopyFailed {
                from: entry.path().to_path_buf(),
                to: to.clone(),
                source: e,
            };
            if entry.file_type().is_dir() {
                fs::create_dir_all(&to).map_err(copy_failed)?;
            } else {
                fs::copy(entry.path(), &to).map_err(copy_failed)?;
            }
        }

        debug!(cookbook = %cookbook, target = %target.display(), "Copied cookbook");
        Ok(target)
    }
}

impl CookbookSource for CookbookRepository {
    fn list_available(&self) -> anyhow::Result<Vec<CookbookVersion>> {
        Ok(self.cookbooks()?)
    }

    fn download(&self, cookbook: &CookbookVersion, dest: &Path) -> anyhow::Result<PathBuf> {
        Ok(self.copy_to(cookbook, dest)?)
    }
}
