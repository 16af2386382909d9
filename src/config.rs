use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::constants;
use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalize: NormalizeConfig,
    pub helm: HelmConfig,
    pub grafana: GrafanaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub project_id: String,
    pub top_level_fields: Vec<String>,
    pub recursive_fields: Vec<String>,
    pub refresh: String,
    pub time_from: String,
    pub time_to: String,
    pub timezone: String,
    pub standardize_variables: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            project_id: constants::DEFAULT_PROJECT_ID.to_string(),
            top_level_fields: to_owned_list(constants::TOP_LEVEL_FIELDS),
            recursive_fields: to_owned_list(constants::RECURSIVE_FIELDS),
            refresh: constants::DEFAULT_REFRESH.to_string(),
            time_from: constants::DEFAULT_TIME_FROM.to_string(),
            time_to: constants::DEFAULT_TIME_TO.to_string(),
            timezone: constants::DEFAULT_TIMEZONE.to_string(),
            standardize_variables: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    pub github_repo: String,
    pub github_branch: String,
    pub grafana_dashboards_path: String,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            github_repo: constants::DEFAULT_GITHUB_REPO.to_string(),
            github_branch: constants::DEFAULT_GITHUB_BRANCH.to_string(),
            grafana_dashboards_path: constants::DEFAULT_GRAFANA_DASHBOARDS_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrafanaConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub api_token: Option<String>,
}

impl Default for GrafanaConfig {
    fn default() -> Self {
        Self {
            url: constants::DEFAULT_GRAFANA_URL.to_string(),
            timeout_seconds: constants::DEFAULT_GRAFANA_TIMEOUT_SECONDS,
            api_token: None,
        }
    }
}

impl GrafanaConfig {
    /// A URL given on the command line wins over the file and environment.
    pub fn override_url(&mut self, url: Option<String>) {
        if let Some(url) = url {
            self.url = url;
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Loads configuration from `path`, or from `dashboard-tools.toml` in the
    /// working directory when present, then applies environment overrides.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file just yields the built-in configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using built-in defaults", constants::DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = env::var("GRAFANA_URL") {
            if !url.trim().is_empty() {
                self.grafana.url = url;
            }
        }
        if let Ok(token) = env::var("GRAFANA_API_TOKEN") {
            if !token.trim().is_empty() {
                self.grafana.api_token = Some(token);
            }
        }
    }
}
