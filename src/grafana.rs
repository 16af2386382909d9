//! Pulls dashboards edited in a live Grafana back into their local files.
//!
//! Local files are matched to remote dashboards by UID. Only two API calls
//! are used: the dashboard search and the fetch-by-UID endpoint.

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::GrafanaConfig;
use crate::document;
use crate::error::{DashboardError, Result};

/// One entry of `GET /api/search?type=dash-db`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The slice of the Grafana HTTP API the sync needs.
pub trait GrafanaPort {
    fn search_dashboards(&self) -> Result<Vec<SearchHit>>;

    /// Full `GET /api/dashboards/uid/{uid}` response (`dashboard` plus `meta`).
    fn fetch_dashboard(&self, uid: &str) -> Result<Value>;
}

pub struct GrafanaClient {
    base_url: String,
    api_token: Option<String>,
    client: Client,
}

impl GrafanaClient {
    pub fn new(config: &GrafanaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("grafana-dashboard-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            client,
        })
    }

    fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Api {
                message: format!("GET {} returned {}", url, status),
            });
        }
        Ok(response)
    }
}

impl GrafanaPort for GrafanaClient {
    fn search_dashboards(&self) -> Result<Vec<SearchHit>> {
        Ok(self.get("/api/search?type=dash-db")?.json()?)
    }

    fn fetch_dashboard(&self, uid: &str) -> Result<Value> {
        Ok(self.get(&format!("/api/dashboards/uid/{}", uid))?.json()?)
    }
}

/// Top-level `uid` of a local dashboard file, if it has a usable one.
pub fn read_local_uid(path: &Path) -> Option<String> {
    let dashboard = match document::read_dashboard(path) {
        Ok(dashboard) => dashboard,
        Err(DashboardError::Json(_)) => {
            warn!("{} is not a valid JSON file", path.display());
            return None;
        }
        Err(e) => {
            error!("Error reading {}: {}", path.display(), e);
            return None;
        }
    };

    match dashboard.get("uid").and_then(Value::as_str) {
        Some(uid) if !uid.is_empty() => Some(uid.to_string()),
        _ => {
            warn!("{} doesn't contain a dashboard UID at the top level", path.display());
            None
        }
    }
}

/// Maps UIDs to the local files carrying them. A later file wins a UID
/// claimed twice.
pub fn collect_local_uids(files: &[PathBuf]) -> HashMap<String, PathBuf> {
    let mut uid_to_file = HashMap::new();
    for path in files {
        if !path.exists() {
            warn!("File {} does not exist", path.display());
            continue;
        }
        if let Some(uid) = read_local_uid(path) {
            uid_to_file.insert(uid, path.clone());
        }
    }
    uid_to_file
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Local files with a UID, i.e. candidates for replacement.
    pub candidates: usize,
    pub replaced: usize,
    /// Matching dashboards that could not be fetched or written.
    pub failed: usize,
}

impl SyncSummary {
    /// Closing report line; `None` when no local file carried a UID, since
    /// the sync stopped before contacting Grafana.
    pub fn done_line(&self) -> Option<String> {
        (self.candidates > 0).then(|| {
            format!("Done! Replaced {} dashboard files out of {}", self.replaced, self.candidates)
        })
    }
}

/// Extracts the dashboard model from a fetch-by-UID response and drops the
/// instance-specific `version` and `id`. `None` when the model is missing
/// or empty.
pub fn exportable_dashboard(response: Value) -> Option<Value> {
    let Value::Object(mut envelope) = response else {
        return None;
    };
    match envelope.shift_remove("dashboard") {
        Some(Value::Object(mut dashboard)) if !dashboard.is_empty() => {
            dashboard.shift_remove("version");
            dashboard.shift_remove("id");
            Some(Value::Object(dashboard))
        }
        _ => None,
    }
}

/// Overwrites each local file whose UID exists in Grafana with the remote
/// dashboard.
///
/// Fails only when the dashboard search itself fails; problems with a single
/// dashboard are logged and counted.
pub fn sync_dashboards(grafana: &dyn GrafanaPort, files: &[PathBuf]) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();
    if files.is_empty() {
        info!("No input files provided");
        return Ok(summary);
    }
    info!("Processing {} input files", files.len());

    let uid_to_file = collect_local_uids(files);
    summary.candidates = uid_to_file.len();
    if uid_to_file.is_empty() {
        info!("No valid dashboard files with UIDs found");
        return Ok(summary);
    }
    info!("Found {} valid dashboard files with UIDs", uid_to_file.len());

    let hits = grafana.search_dashboards().map_err(|e| {
        error!("Error fetching dashboards from Grafana: {}", e);
        e
    })?;

    for hit in hits {
        let Some(uid) = hit.uid.as_deref() else {
            continue;
        };
        let Some(path) = uid_to_file.get(uid) else {
            continue;
        };
        info!(
            "Exporting dashboard: {} (UID: {})",
            hit.title.as_deref().unwrap_or("<untitled>"),
            uid
        );

        let response = match grafana.fetch_dashboard(uid) {
            Ok(response) => response,
            Err(e) => {
                error!("Error exporting dashboard {}: {}", uid, e);
                summary.failed += 1;
                continue;
            }
        };

        let Some(dashboard) = exportable_dashboard(response) else {
            warn!("No dashboard content found for UID {}", uid);
            continue;
        };

        match document::write_dashboard(path, &dashboard) {
            Ok(()) => {
                summary.replaced += 1;
                info!("Successfully replaced {}", path.display());
            }
            Err(e) => {
                error!("Error writing dashboard {} to file: {}", uid, e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
