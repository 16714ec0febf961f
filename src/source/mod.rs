// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Local implementations of the search, cookbook and lint collaborators.

mod cookbook_repo;
mod cookstyle;
mod error;
mod node_export;
mod process;

pub use cookbook_repo::CookbookRepository;
pub use cookstyle::{Cookstyle, DEFAULT_COOKSTYLE_TIMEOUT};
pub use error::{SourceError, SourceResult};
pub use node_export::NodeExport;
