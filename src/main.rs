use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use grafana_dashboard_tools::config::Config;
use grafana_dashboard_tools::logging;
use grafana_dashboard_tools::normalize::{self, NormalizeOptions};
use grafana_dashboard_tools::report::{self, BatchSummary};

/// Grafana Dashboard Cleanup Utility
///
/// Strips volatile fields, assigns deterministic UIDs and pins display
/// defaults on exported dashboard JSON files, rewriting them in place.
#[derive(Parser, Debug)]
#[command(name = "cleanup-grafana-dashboards")]
#[command(version, about)]
struct Cli {
    /// Dashboard JSON files to process
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Project identifier used for UID generation
    #[arg(long)]
    project_id: Option<String>,

    /// Remove Prometheus datasource references and all datasource template variables
    #[arg(long)]
    remove_prometheus_datasources: bool,

    /// Overwrite dashboard tags (comma-separated)
    #[arg(long, value_name = "TAGS")]
    set_tags: Option<String>,

    /// Set showPoints to 'never' on every timeseries panel
    #[arg(long)]
    disable_points: bool,

    /// Configuration file (defaults to ./dashboard-tools.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    logging::init_logging("cleanup-grafana-dashboards");

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let mut options = NormalizeOptions::from_config(&config.normalize);
    if let Some(project_id) = cli.project_id {
        options.project_id = project_id;
    }
    options.tags = cli.set_tags.as_deref().map(normalize::parse_tags);
    options.remove_prometheus_datasources = cli.remove_prometheus_datasources;
    options.disable_points = cli.disable_points;

    for line in report::run_banner(&options, cli.files.len()) {
        println!("{}", line);
    }
    println!();

    let mut summary = BatchSummary::new(&options);
    for path in &cli.files {
        let file_report = normalize::process_file(path, &options);
        if let Some(changes) = &file_report.changes {
            for line in report::change_lines(changes, path, &options) {
                println!("{}", line);
            }
        }
        summary.record(&file_report);
    }

    println!("\n{}", "=".repeat(60));
    print!("{}", summary);
    info!(
        processed = summary.succeeded,
        modified = summary.modified,
        failed = summary.failed,
        "Dashboard cleanup finished"
    );

    Ok(ExitCode::from(summary.exit_code()))
}
