//! Generates the victoria-metrics-k8s-stack `values.yaml` fragment that
//! provisions the given dashboards from their GitHub raw URLs.
//!
//! Usage:
//!   generate-k8s-stack-values pulsar/*.json bookkeeper/*.json >> values.yaml

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use grafana_dashboard_tools::config::Config;
use grafana_dashboard_tools::logging;
use grafana_dashboard_tools::provisioning;

#[derive(Parser, Debug)]
#[command(name = "generate-k8s-stack-values", version, about = "Print Helm values provisioning Grafana dashboards")]
struct Cli {
    /// Dashboard JSON files; each file's directory names its provider
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// GitHub repository hosting the dashboards (owner/name)
    #[arg(long)]
    repo: Option<String>,

    /// Branch the raw URLs point at
    #[arg(long)]
    branch: Option<String>,

    /// Configuration file (defaults to ./dashboard-tools.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging("generate-k8s-stack-values");
    let cli = Cli::parse();

    let mut helm = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .helm;
    if let Some(repo) = cli.repo {
        helm.github_repo = repo;
    }
    if let Some(branch) = cli.branch {
        helm.github_branch = branch;
    }

    let values = provisioning::build_values(&cli.files, &helm);
    let yaml = provisioning::render_values(&values).context("Failed to render Helm values")?;
    println!("{}", yaml);
    Ok(())
}
