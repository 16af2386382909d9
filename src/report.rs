//! Human-readable progress lines and the end-of-batch summary printed by
//! `cleanup-grafana-dashboards`.

use std::fmt;
use std::path::Path;

use crate::normalize::{DocumentChanges, FileReport, FileStatus, NormalizeOptions, UidChange};

fn quoted_list(items: &[String]) -> String {
    items.iter().map(|item| format!("'{}'", item)).collect::<Vec<_>>().join(", ")
}

/// Lines describing what a run is about to do.
pub fn run_banner(options: &NormalizeOptions, file_count: usize) -> Vec<String> {
    let defaults = &options.defaults;
    let mut lines = vec![
        format!("Processing {} Grafana dashboard files...", file_count),
        format!("Using project identifier: '{}'", options.project_id),
        format!("Removing top-level fields: {}", quoted_list(&options.top_level_fields)),
        format!("Recursively removing fields: {}", quoted_list(&options.recursive_fields)),
        "Generating consistent UIDs".to_string(),
    ];
    if options.standardize_variables {
        lines.push("Standardizing template variable selections".to_string());
    }
    lines.push(format!("Setting default refresh interval to '{}'", defaults.refresh));
    lines.push(format!(
        "Setting default time range from '{}' to '{}'",
        defaults.time_from, defaults.time_to
    ));
    lines.push(format!("Setting default timezone to '{}'", defaults.timezone));
    if let Some(tags) = &options.tags {
        lines.push(format!("Setting tags to {}", quoted_list(tags)));
    }
    if options.remove_prometheus_datasources {
        lines.push(
            "Removing Prometheus datasource references and all datasource template variables".to_string(),
        );
    }
    if options.disable_points {
        lines.push("Disabling points on timeseries panels".to_string());
    }
    lines
}

/// One line per change made to a file, in pipeline order.
pub fn change_lines(changes: &DocumentChanges, path: &Path, options: &NormalizeOptions) -> Vec<String> {
    let path = path.display();
    let defaults = &options.defaults;
    let mut lines = Vec::new();

    for (field, removed) in &changes.top_level_removed {
        if *removed {
            lines.push(format!("- Removed '{}' from '{}'", field, path));
        }
    }

    match &changes.uid {
        UidChange::Unchanged => {}
        UidChange::Assigned { uid } => lines.push(format!("- Assigned new UID '{}' to '{}'", uid, path)),
        UidChange::Changed { old, new } => {
            lines.push(format!("- Changed UID from '{}' to '{}' in '{}'", old, new, path))
        }
    }

    if changes.variables_standardized > 0 {
        lines.push(format!(
            "- Standardized {} template variable selection(s) in '{}'",
            changes.variables_standardized, path
        ));
    }
    if changes.defaults.refresh {
        lines.push(format!("- Set refresh interval to '{}' in '{}'", defaults.refresh, path));
    }
    if changes.defaults.time {
        lines.push(format!(
            "- Set time range to '{}' to '{}' in '{}'",
            defaults.time_from, defaults.time_to, path
        ));
    }
    if changes.defaults.timezone {
        lines.push(format!("- Set timezone to '{}' in '{}'", defaults.timezone, path));
    }
    if changes.defaults.tags {
        let tags = options.tags.as_deref().unwrap_or_default();
        lines.push(format!("- Set tags to {} in '{}'", quoted_list(tags), path));
    }
    if changes.datasources_removed {
        lines.push(format!("- Removed datasource configurations from '{}'", path));
    }
    if changes.points_disabled > 0 {
        lines.push(format!(
            "- Disabled points on {} timeseries panel(s) in '{}'",
            changes.points_disabled, path
        ));
    }
    for (field, count) in &changes.recursive_removed {
        if *count > 0 {
            lines.push(format!("- Removed {} '{}' fields from '{}'", count, field, path));
        }
    }
    lines
}

/// Aggregate counters over a batch of files.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    remove_prometheus_datasources: bool,
    disable_points: bool,
    tags_requested: bool,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub modified: usize,
    pub uid_updated: usize,
    pub refresh_updated: usize,
    pub time_updated: usize,
    pub timezone_updated: usize,
    pub tags_updated: usize,
    pub variables_files: usize,
    pub variables_total: usize,
    pub datasources_files: usize,
    pub points_files: usize,
    pub points_total: usize,
    /// Per top-level field: files it was removed from.
    pub top_level_files: Vec<(String, usize)>,
    /// Per recursive field: files it was removed from and occurrences removed.
    pub recursive: Vec<(String, usize, usize)>,
}

impl BatchSummary {
    pub fn new(options: &NormalizeOptions) -> Self {
        Self {
            remove_prometheus_datasources: options.remove_prometheus_datasources,
            disable_points: options.disable_points,
            tags_requested: options.tags.is_some(),
            total: 0,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            modified: 0,
            uid_updated: 0,
            refresh_updated: 0,
            time_updated: 0,
            timezone_updated: 0,
            tags_updated: 0,
            variables_files: 0,
            variables_total: 0,
            datasources_files: 0,
            points_files: 0,
            points_total: 0,
            top_level_files: options.top_level_fields.iter().map(|f| (f.clone(), 0)).collect(),
            recursive: options.recursive_fields.iter().map(|f| (f.clone(), 0, 0)).collect(),
        }
    }

    pub fn record(&mut self, report: &FileReport) {
        self.total += 1;
        match &report.status {
            FileStatus::Skipped => {
                self.skipped += 1;
                return;
            }
            FileStatus::Failed { .. } => {
                self.failed += 1;
                return;
            }
            FileStatus::Processed { written } => {
                self.succeeded += 1;
                if *written {
                    self.modified += 1;
                }
            }
        }

        let Some(changes) = &report.changes else {
            return;
        };

        for (field, removed) in &changes.top_level_removed {
            if *removed {
                if let Some(entry) = self.top_level_files.iter_mut().find(|(name, _)| name == field) {
                    entry.1 += 1;
                }
            }
        }
        for (field, count) in &changes.recursive_removed {
            if *count > 0 {
                if let Some(entry) = self.recursive.iter_mut().find(|(name, _, _)| name == field) {
                    entry.1 += 1;
                    entry.2 += count;
                }
            }
        }

        self.uid_updated += usize::from(changes.uid.is_updated());
        self.refresh_updated += usize::from(changes.defaults.refresh);
        self.time_updated += usize::from(changes.defaults.time);
        self.timezone_updated += usize::from(changes.defaults.timezone);
        self.tags_updated += usize::from(changes.defaults.tags);
        self.datasources_files += usize::from(changes.datasources_removed);
        if changes.variables_standardized > 0 {
            self.variables_files += 1;
            self.variables_total += changes.variables_standardized;
        }
        if changes.points_disabled > 0 {
            self.points_files += 1;
            self.points_total += changes.points_disabled;
        }
    }

    /// Process exit code: non-zero iff any file failed.
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Total files processed: {}", self.total)?;
        writeln!(f, "  Successfully processed: {}", self.succeeded)?;
        writeln!(f, "  Files skipped (missing): {}", self.skipped)?;
        for (field, files) in &self.top_level_files {
            writeln!(f, "  Files with '{}' removed: {}", field, files)?;
        }
        writeln!(f, "  Files with UIDs updated: {}", self.uid_updated)?;
        writeln!(f, "  Files with UIDs unchanged: {}", self.succeeded - self.uid_updated)?;
        writeln!(f, "  Files with template variables standardized: {}", self.variables_files)?;
        writeln!(f, "  Total template variables standardized: {}", self.variables_total)?;
        writeln!(f, "  Files with refresh interval updated: {}", self.refresh_updated)?;
        writeln!(f, "  Files with time range updated: {}", self.time_updated)?;
        writeln!(f, "  Files with timezone updated: {}", self.timezone_updated)?;
        if self.tags_requested {
            writeln!(f, "  Files with tags updated: {}", self.tags_updated)?;
        }
        for (field, files, total) in &self.recursive {
            if *files > 0 {
                writeln!(f, "  Files with '{}' fields removed: {}", field, files)?;
                writeln!(f, "  Total '{}' fields removed: {}", field, total)?;
            }
        }
        if self.remove_prometheus_datasources {
            writeln!(f, "  Files with datasource configurations removed: {}", self.datasources_files)?;
        }
        if self.disable_points {
            writeln!(f, "  Files with points disabled: {}", self.points_files)?;
            writeln!(f, "  Total timeseries panels with points disabled: {}", self.points_total)?;
        }
        writeln!(f, "  Total files modified: {}", self.modified)?;
        writeln!(f, "  Files failed: {}", self.failed)
    }
}
