//! Prints every Prometheus metric name queried by the given dashboards,
//! sorted and deduplicated, one per line.
//!
//! Usage:
//!   extract-metric-names dashboards/pulsar/*.json > metrics.txt

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, warn};

use grafana_dashboard_tools::error::DashboardError;
use grafana_dashboard_tools::logging;
use grafana_dashboard_tools::metric_names;

#[derive(Parser, Debug)]
#[command(name = "extract-metric-names", version, about = "List metric names used by Grafana dashboards")]
struct Cli {
    /// Dashboard JSON files to scan
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging("extract-metric-names");
    let cli = Cli::parse();

    let mut all_metrics = BTreeSet::new();
    for path in &cli.files {
        if !path.exists() {
            warn!("File {} does not exist", path.display());
            continue;
        }

        let metrics = match metric_names::extract_from_file(path) {
            Ok(metrics) => metrics,
            Err(DashboardError::Json(_)) => {
                error!("{} is not a valid JSON file", path.display());
                BTreeSet::new()
            }
            Err(e) => {
                error!("Error processing {}: {}", path.display(), e);
                BTreeSet::new()
            }
        };
        eprintln!("Found {} unique metrics in {}", metrics.len(), path.display());
        all_metrics.extend(metrics);
    }

    for metric in &all_metrics {
        println!("{}", metric);
    }
    Ok(())
}
