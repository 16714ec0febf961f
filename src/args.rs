// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chef-analyze")]
#[command(version)]
#[command(about = "Analyze Chef Infra Server nodes and cookbooks before an upgrade")]
pub(crate) struct Args {
    /// Increase log verbosity (can be repeated). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate reports from exported server data.
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
pub(crate) enum ReportCommand {
    /// Generate a node oriented report.
    Nodes(NodesArgs),
    /// Generate a cookbook oriented report, optionally with cookstyle analysis.
    Cookbooks(CookbooksArgs),
}

#[derive(ClapArgs)]
pub(crate) struct NodesArgs {
    /// Directory of exported node JSON files.
    #[arg(long, env = "CHEF_ANALYZE_NODE_EXPORT")]
    pub node_export: PathBuf,

    #[arg(long, value_enum, default_value_t = NodesFormat::Table)]
    pub format: NodesFormat,

    /// File to write the report to instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs)]
pub(crate) struct CookbooksArgs {
    /// Directory of exported node JSON files, used to find the nodes using each cookbook.
    #[arg(long, env = "CHEF_ANALYZE_NODE_EXPORT")]
    pub node_export: PathBuf,

    #[arg(
        long,
        env = "CHEF_ANALYZE_COOKBOOK_REPO",
        long_help = "Directory of cookbooks, one sub-directory per cookbook version.\n\
                Sub-directories must be named <name>-<version>; other entries are ignored."
    )]
    pub cookbook_repo: PathBuf,

    /// Run cookstyle on every cookbook and report its offenses.
    #[arg(long)]
    pub run_cookstyle: bool,

    /// Seconds a single cookstyle run may take.
    #[arg(long, default_value_t = 300)]
    pub cookstyle_timeout: u64,

    #[arg(long, value_enum, default_value_t = CookbooksFormat::Txt)]
    pub format: CookbooksFormat,

    /// File to write the report to instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum NodesFormat {
    Table,
    Csv,
    Txt,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum CookbooksFormat {
    Csv,
    Txt,
    /// One line per cookbook with its violation and node counts.
    Summary,
}
