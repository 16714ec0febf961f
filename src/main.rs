// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{Args, Command, CookbooksArgs, CookbooksFormat, NodesArgs, NodesFormat, ReportCommand};
use chef_analyze::formatter::{
    cookbooks_report_csv, cookbooks_report_summary, cookbooks_report_txt, nodes_report_csv,
    nodes_report_table, nodes_report_txt, FormattedResult,
};
use chef_analyze::reporting::{cookbooks, nodes, LintEngine};
use chef_analyze::source::{CookbookRepository, Cookstyle, NodeExport};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    match args.command {
        Command::Report(ReportCommand::Nodes(args)) => report_nodes(&args),
        Command::Report(ReportCommand::Cookbooks(args)) => report_cookbooks(&args),
    }
}

fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_node_export(path: &Path) -> Result<NodeExport> {
    NodeExport::from_dir(path)
        .with_context(|| format!("Failed to load node export: {}", path.display()))
}

fn report_nodes(args: &NodesArgs) -> Result<()> {
    let searcher = load_node_export(&args.node_export)?;
    let records = nodes(&searcher)?;
    info!(nodes = records.len(), "Node report generated");

    let result = match args.format {
        NodesFormat::Table => nodes_report_table(&records),
        NodesFormat::Csv => nodes_report_csv(&records),
        NodesFormat::Txt => nodes_report_txt(&records),
    };
    write_result(&result, args.output.as_deref())
}

fn report_cookbooks(args: &CookbooksArgs) -> Result<()> {
    let searcher = load_node_export(&args.node_export)?;
    let repository = CookbookRepository::new(&args.cookbook_repo);
    let cookstyle = args
        .run_cookstyle
        .then(|| Cookstyle::new().with_timeout(Duration::from_secs(args.cookstyle_timeout)));

    let status = cookbooks(
        &repository,
        &searcher,
        cookstyle.as_ref().map(|c| c as &dyn LintEngine),
    )?;
    info!(
        cookbooks = status.total_cookbooks,
        cookstyle = status.run_cookstyle,
        "Cookbook report generated"
    );

    let result = match args.format {
        CookbooksFormat::Csv => cookbooks_report_csv(&status),
        CookbooksFormat::Txt => cookbooks_report_txt(&status),
        CookbooksFormat::Summary => cookbooks_report_summary(&status),
    };
    write_result(&result, args.output.as_deref())
}

/// Write the report to `output` (or stdout) and any record errors to stderr.
///
/// # Errors
/// Returns an error if the report cannot be written.
fn write_result(result: &FormattedResult, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            info!(file = %path.display(), "Writing report to file");
            fs::write(path, &result.report)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(result.report.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write report to stdout")?;
        }
    }

    if !result.errors.is_empty() {
        eprintln!("\nErrors occurred while generating the report:\n{}", result.errors);
    }
    Ok(())
}
