//! Replaces local dashboard files with the version currently stored in a
//! Grafana instance, matching them by UID.
//!
//! Usage:
//!   update-dashboards-from-grafana --grafana-url http://localhost:3000 dashboards/**/*.json

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use grafana_dashboard_tools::config::Config;
use grafana_dashboard_tools::grafana::{self, GrafanaClient};
use grafana_dashboard_tools::logging;

#[derive(Parser, Debug)]
#[command(name = "update-dashboards-from-grafana", version, about = "Export and replace Grafana dashboards")]
struct Cli {
    /// Dashboard JSON files to update
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Grafana URL (default: http://localhost:3000, or GRAFANA_URL)
    #[arg(long)]
    grafana_url: Option<String>,

    /// Configuration file (defaults to ./dashboard-tools.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    logging::init_logging("update-dashboards-from-grafana");
    let cli = Cli::parse();

    let mut grafana_config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .grafana;
    grafana_config.override_url(cli.grafana_url);

    let client = GrafanaClient::new(&grafana_config).context("Failed to build HTTP client")?;

    match grafana::sync_dashboards(&client, &cli.files) {
        Ok(summary) => {
            if let Some(line) = summary.done_line() {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Sync aborted: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
