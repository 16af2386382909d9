use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use grafana_dashboard_tools::normalize::{process_file, FileStatus, NormalizeOptions, UidChange};
use grafana_dashboard_tools::report::BatchSummary;
use grafana_dashboard_tools::uid::generate_uid;

const EXPORTED: &str = include_str!("resources/exported_dashboard.json");

fn write_file(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok(path)
}

fn read_json(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn all_options() -> NormalizeOptions {
    let mut options = NormalizeOptions::default();
    options.remove_prometheus_datasources = true;
    options.disable_points = true;
    options.tags = Some(vec!["pulsar".to_string(), "messaging".to_string()]);
    options
}

#[test]
fn test_exported_dashboard_is_normalized() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "messaging.json", EXPORTED)?;
    let options = all_options();

    let report = process_file(&path, &options);
    assert_eq!(report.status, FileStatus::Processed { written: true });

    let changes = report.changes.expect("processed file has changes");
    assert_eq!(
        changes.uid,
        UidChange::Changed {
            old: "hand-made".to_string(),
            new: generate_uid(&options.project_id, &path),
        }
    );
    assert_eq!(changes.variables_standardized, 2);
    assert!(changes.datasources_removed);
    assert_eq!(changes.points_disabled, 1);
    assert!(changes.defaults.refresh && changes.defaults.time && changes.defaults.timezone && changes.defaults.tags);
    assert_eq!(
        changes.recursive_removed,
        vec![
            ("$$hashKey".to_string(), 2),
            ("__requires".to_string(), 1),
            ("pluginVersion".to_string(), 1),
            ("__inputs".to_string(), 1),
            ("prometheusLink".to_string(), 0),
        ]
    );

    let dashboard = read_json(&path)?;
    let root = dashboard.as_object().unwrap();
    for field in ["id", "version", "iteration", "links", "gnetId", "liveNow", "timepicker", "annotations"] {
        assert!(!root.contains_key(field), "{} should be removed", field);
    }
    assert_eq!(dashboard["refresh"], json!("30s"));
    assert_eq!(dashboard["time"], json!({"from": "now-15m", "to": "now"}));
    assert_eq!(dashboard["timezone"], json!("utc"));
    assert_eq!(dashboard["tags"], json!(["pulsar", "messaging"]));

    let variables = dashboard["templating"]["list"].as_array().unwrap();
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0]["current"], json!({"text": "All", "value": "$__all"}));

    let timeseries = &dashboard["panels"][0]["panels"][0];
    assert!(timeseries.get("datasource").is_none());
    assert!(timeseries["targets"][0].get("datasource").is_none());
    assert_eq!(
        timeseries["fieldConfig"],
        json!({"defaults": {"unit": "short", "custom": {"showPoints": "never"}}})
    );
    assert_eq!(dashboard["panels"][1]["datasource"], Value::Null);
    Ok(())
}

#[test]
fn test_second_run_leaves_file_untouched() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "messaging.json", EXPORTED)?;
    let options = all_options();

    process_file(&path, &options);
    let after_first = fs::read(&path)?;

    let report = process_file(&path, &options);
    assert_eq!(report.status, FileStatus::Processed { written: false });
    assert_eq!(report.changes.map(|c| c.uid), Some(UidChange::Unchanged));
    assert_eq!(fs::read(&path)?, after_first);
    Ok(())
}

#[test]
fn test_output_is_pretty_printed_and_keeps_unicode() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "messaging.json", EXPORTED)?;

    process_file(&path, &NormalizeOptions::default());
    let written = fs::read_to_string(&path)?;

    assert!(written.starts_with("{\n  \""));
    assert!(written.contains("\"title\": \"Pulsar – Messaging\""));
    assert!(written.contains("Débit des messages"));
    assert!(!written.ends_with('\n'));
    Ok(())
}

#[test]
fn test_key_order_is_preserved() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "messaging.json", EXPORTED)?;

    process_file(&path, &NormalizeOptions::default());
    let dashboard = read_json(&path)?;
    let keys: Vec<&str> = dashboard.as_object().unwrap().keys().map(String::as_str).collect();

    let position = |key: &str| keys.iter().position(|k| *k == key).unwrap();
    assert!(position("editable") < position("panels"));
    assert!(position("panels") < position("schemaVersion"));
    assert!(position("templating") < position("title"));
    Ok(())
}

#[test]
fn test_uid_survives_content_edits() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "broker.json", r#"{"title": "Broker"}"#)?;
    let options = NormalizeOptions::default();

    process_file(&path, &options);
    let first_uid = read_json(&path)?["uid"].clone();

    fs::write(&path, r#"{"title": "Broker v2", "panels": [{"type": "stat"}], "uid": "edited"}"#)?;
    process_file(&path, &options);
    let second_uid = read_json(&path)?["uid"].clone();

    assert_eq!(first_uid, second_uid);
    assert_eq!(first_uid, json!(generate_uid(&options.project_id, &path)));
    Ok(())
}

#[test]
fn test_invalid_json_fails_without_stopping_batch() -> Result<()> {
    let dir = tempdir()?;
    let broken = write_file(&dir, "broken.json", "{\"title\": ")?;
    let good = write_file(&dir, "good.json", r#"{"title": "Good"}"#)?;
    let options = NormalizeOptions::default();

    let mut summary = BatchSummary::new(&options);
    for path in [&broken, &good] {
        summary.record(&process_file(path, &options));
    }

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.modified, 1);
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(fs::read_to_string(&broken)?, "{\"title\": ");
    assert_eq!(read_json(&good)?["timezone"], json!("utc"));
    Ok(())
}

#[test]
fn test_non_object_root_is_a_failure() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "list.json", "[1, 2, 3]")?;

    let report = process_file(&path, &NormalizeOptions::default());
    assert!(report.is_failed());
    assert_eq!(fs::read_to_string(&path)?, "[1, 2, 3]");
    Ok(())
}

#[test]
fn test_missing_file_is_skipped() -> Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("nope.json");
    let options = NormalizeOptions::default();

    let report = process_file(&missing, &options);
    assert_eq!(report.status, FileStatus::Skipped);

    let mut summary = BatchSummary::new(&options);
    summary.record(&report);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.exit_code(), 0);
    Ok(())
}
