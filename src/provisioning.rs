//! Helm values for provisioning the dashboards through the
//! victoria-metrics-k8s-stack chart.
//!
//! Each dashboard file becomes a URL entry under a provider named after the
//! directory holding it; every provider maps to one Grafana folder.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

use crate::config::HelmConfig;
use crate::constants::{GITHUB_RAW_BASE_URL, ROOT_PROVIDER_NAME};
use crate::error::Result;
use crate::paths::url_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelmValues {
    #[serde(rename = "victoria-metrics-k8s-stack")]
    pub stack: StackValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackValues {
    pub grafana: GrafanaValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrafanaValues {
    pub dashboard_providers: DashboardProviders,
    /// provider name -> dashboard name -> source
    pub dashboards: IndexMap<String, IndexMap<String, DashboardSource>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardProviders {
    #[serde(rename = "dashboardproviders.yaml")]
    pub providers_file: ProvidersFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersFile {
    pub api_version: u32,
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: String,
    pub org_id: u32,
    pub folder: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub disable_deletion: bool,
    pub editable: bool,
    pub allow_ui_updates: bool,
    pub options: ProviderOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOptions {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSource {
    pub url: String,
}

/// Provider for a dashboard file: its directory's name, or `dashboards`
/// for files given without a directory.
pub fn provider_name(file_path: &Path) -> String {
    file_path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ROOT_PROVIDER_NAME.to_string())
}

/// Grafana folder title: first letter upper-cased, the rest lower-cased.
pub fn folder_name(provider: &str) -> String {
    let mut chars = provider.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn raw_url(config: &HelmConfig, file_path: &Path) -> String {
    format!(
        "{}/{}/{}/{}",
        GITHUB_RAW_BASE_URL,
        config.github_repo,
        config.github_branch,
        url_path(file_path)
    )
}

/// Groups dashboard files by provider, in first-seen order.
pub fn build_values<P: AsRef<Path>>(files: &[P], config: &HelmConfig) -> HelmValues {
    let mut dashboards: IndexMap<String, IndexMap<String, DashboardSource>> = IndexMap::new();

    for file in files {
        let file = file.as_ref();
        let provider = provider_name(file);
        let name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let url = raw_url(config, file);
        dashboards
            .entry(provider)
            .or_default()
            .insert(name, DashboardSource { url });
    }

    let providers = dashboards
        .keys()
        .map(|provider| Provider {
            name: provider.clone(),
            org_id: 1,
            folder: folder_name(provider),
            kind: "file".to_string(),
            disable_deletion: false,
            editable: true,
            allow_ui_updates: true,
            options: ProviderOptions {
                path: format!(
                    "{}/{}",
                    config.grafana_dashboards_path.trim_end_matches('/'),
                    provider
                ),
            },
        })
        .collect();

    HelmValues {
        stack: StackValues {
            grafana: GrafanaValues {
                dashboard_providers: DashboardProviders {
                    providers_file: ProvidersFile { api_version: 1, providers },
                },
                dashboards,
            },
        },
    }
}

pub fn render_values(values: &HelmValues) -> Result<String> {
    Ok(serde_yaml::to_string(values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        assert_eq!(provider_name(Path::new("dashboards/pulsar/broker.json")), "pulsar");
        assert_eq!(provider_name(Path::new("broker.json")), "dashboards");
        assert_eq!(provider_name(Path::new("./broker.json")), "dashboards");
    }

    #[test]
    fn test_folder_name_capitalizes() {
        assert_eq!(folder_name("pulsar"), "Pulsar");
        assert_eq!(folder_name("bookKeeper"), "Bookkeeper");
        assert_eq!(folder_name(""), "");
    }

    #[test]
    fn test_raw_url_is_normalized() {
        let config = HelmConfig::default();
        assert_eq!(
            raw_url(&config, Path::new("./pulsar//broker.json")),
            "https://raw.githubusercontent.com/lhotari/pulsar-grafana-dashboards/master/pulsar/broker.json"
        );
    }

    #[test]
    fn test_repeated_file_keeps_first_position() {
        let files = ["pulsar/broker.json", "pulsar/proxy.json", "./pulsar/broker.json"];
        let values = build_values(&files, &HelmConfig::default());
        let pulsar = &values.stack.grafana.dashboards["pulsar"];
        assert_eq!(pulsar.keys().collect::<Vec<_>>(), vec!["broker", "proxy"]);
        assert_eq!(pulsar.len(), 2);
    }

    #[test]
    fn test_values_group_by_directory() {
        let files = ["pulsar/broker.json", "bookkeeper/bookie.json", "pulsar/proxy.json"];
        let values = build_values(&files, &HelmConfig::default());
        let grafana = &values.stack.grafana;

        let providers = &grafana.dashboard_providers.providers_file.providers;
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].name, "pulsar");
        assert_eq!(providers[0].folder, "Pulsar");
        assert_eq!(providers[1].options.path, "/var/lib/grafana/dashboards/bookkeeper");

        let pulsar = &grafana.dashboards["pulsar"];
        assert_eq!(pulsar.keys().collect::<Vec<_>>(), vec!["broker", "proxy"]);
    }
}
