//! Dashboard normalization.
//!
//! A dashboard goes through a fixed sequence of idempotent passes:
//!
//! 1. top-level field strip
//! 2. deterministic UID assignment
//! 3. template variable standardization
//! 4. display defaults and tags
//! 5. Prometheus datasource strip (optional)
//! 6. timeseries point override (optional)
//! 7. recursive field strip
//!
//! The file is rewritten only when a pass reports a change, so a second run
//! over the same file leaves it untouched.

pub mod datasources;
pub mod defaults;
pub mod fields;
pub mod panels;
pub mod templating;

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::config::NormalizeConfig;
use crate::document;
use crate::error::{DashboardError, Result};
use crate::uid::generate_uid;

pub use defaults::{DefaultsUpdate, DisplayDefaults};

/// Everything that decides how a dashboard is normalized.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub project_id: String,
    pub top_level_fields: Vec<String>,
    pub recursive_fields: Vec<String>,
    pub defaults: DisplayDefaults,
    pub tags: Option<Vec<String>>,
    pub standardize_variables: bool,
    pub remove_prometheus_datasources: bool,
    pub disable_points: bool,
}

impl NormalizeOptions {
    pub fn from_config(config: &NormalizeConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            top_level_fields: config.top_level_fields.clone(),
            recursive_fields: config.recursive_fields.clone(),
            defaults: DisplayDefaults::from_config(config),
            tags: None,
            standardize_variables: config.standardize_variables,
            remove_prometheus_datasources: false,
            disable_points: false,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::from_config(&NormalizeConfig::default())
    }
}

/// Parses a `--set-tags` value: comma separated, blanks ignored.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidChange {
    Unchanged,
    Assigned { uid: String },
    Changed { old: String, new: String },
}

impl UidChange {
    pub fn is_updated(&self) -> bool {
        !matches!(self, UidChange::Unchanged)
    }
}

/// What each pass did to one dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChanges {
    pub top_level_removed: Vec<(String, bool)>,
    pub uid: UidChange,
    pub variables_standardized: usize,
    pub defaults: DefaultsUpdate,
    pub datasources_removed: bool,
    pub points_disabled: usize,
    pub recursive_removed: Vec<(String, usize)>,
}

impl DocumentChanges {
    pub fn is_modified(&self) -> bool {
        self.top_level_removed.iter().any(|(_, removed)| *removed)
            || self.uid.is_updated()
            || self.variables_standardized > 0
            || self.defaults.any()
            || self.datasources_removed
            || self.points_disabled > 0
            || self.recursive_removed.iter().any(|(_, count)| *count > 0)
    }
}

/// Runs every enabled pass over `dashboard` in place.
///
/// `file_path` is only used to derive the UID. Fails when the document root
/// is not a JSON object.
pub fn normalize_document(
    dashboard: &mut Value,
    file_path: &Path,
    options: &NormalizeOptions,
) -> Result<DocumentChanges> {
    let (top_level_removed, uid, variables_standardized, defaults) = {
        let root = document::root_object(dashboard)?;
        let old_uid = root.get("uid").cloned();

        let top_level_removed = fields::remove_top_level_fields(root, &options.top_level_fields);

        let new_uid = generate_uid(&options.project_id, file_path);
        let uid = match old_uid {
            Some(Value::String(old)) if old == new_uid => UidChange::Unchanged,
            old => {
                root.insert("uid".to_string(), Value::String(new_uid.clone()));
                match old {
                    None | Some(Value::Null) => UidChange::Assigned { uid: new_uid },
                    Some(Value::String(old)) if old.is_empty() => UidChange::Assigned { uid: new_uid },
                    Some(Value::String(old)) => UidChange::Changed { old, new: new_uid },
                    Some(other) => UidChange::Changed { old: other.to_string(), new: new_uid },
                }
            }
        };

        let variables_standardized = if options.standardize_variables {
            templating::standardize_template_variables(root)
        } else {
            0
        };

        let defaults = defaults::set_default_values(root, &options.defaults, options.tags.as_deref());

        (top_level_removed, uid, variables_standardized, defaults)
    };

    let datasources_removed =
        options.remove_prometheus_datasources && datasources::remove_prometheus_datasources(dashboard);

    let points_disabled = if options.disable_points {
        panels::disable_points(dashboard)
    } else {
        0
    };

    let recursive_removed = fields::remove_recursive(dashboard, &options.recursive_fields);

    Ok(DocumentChanges {
        top_level_removed,
        uid,
        variables_standardized,
        defaults,
        datasources_removed,
        points_disabled,
        recursive_removed,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Normalized; `written` tells whether the file was rewritten.
    Processed { written: bool },
    /// Input path does not name a file.
    Skipped,
    Failed { reason: String },
}

/// Per-file outcome, used for progress lines and the batch summary.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub changes: Option<DocumentChanges>,
}

impl FileReport {
    fn skipped(path: &Path) -> Self {
        Self { path: path.to_path_buf(), status: FileStatus::Skipped, changes: None }
    }

    fn failed(path: &Path, reason: String) -> Self {
        Self { path: path.to_path_buf(), status: FileStatus::Failed { reason }, changes: None }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Processed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// Normalizes one dashboard file and writes it back if anything changed.
///
/// Never returns an error: a missing file is skipped, unreadable or invalid
/// input and write failures are recorded as failures of this file only.
pub fn process_file(path: &Path, options: &NormalizeOptions) -> FileReport {
    if !path.is_file() {
        warn!("File '{}' does not exist. Skipping.", path.display());
        return FileReport::skipped(path);
    }

    let mut dashboard = match document::read_dashboard(path) {
        Ok(dashboard) => dashboard,
        Err(DashboardError::Json(e)) => {
            warn!("'{}' is not a valid JSON file. Skipping.", path.display());
            return FileReport::failed(path, format!("invalid JSON: {}", e));
        }
        Err(e) => {
            error!("Error processing '{}': {}. Skipping.", path.display(), e);
            return FileReport::failed(path, e.to_string());
        }
    };

    match normalize_and_persist(path, &mut dashboard, options) {
        Ok((changes, written)) => FileReport {
            path: path.to_path_buf(),
            status: FileStatus::Processed { written },
            changes: Some(changes),
        },
        Err(e) => {
            error!("Error processing '{}': {}. Skipping.", path.display(), e);
            FileReport::failed(path, e.to_string())
        }
    }
}

fn normalize_and_persist(
    path: &Path,
    dashboard: &mut Value,
    options: &NormalizeOptions,
) -> Result<(DocumentChanges, bool)> {
    let changes = normalize_document(dashboard, path, options)?;
    let written = changes.is_modified();
    if written {
        document::write_dashboard(path, dashboard)?;
        debug!(path = %path.display(), "Dashboard rewritten");
    } else {
        debug!(path = %path.display(), "Dashboard already normalized");
    }
    Ok((changes, written))
}
