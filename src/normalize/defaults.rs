use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use crate::config::NormalizeConfig;

/// Display settings every dashboard is pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDefaults {
    pub refresh: String,
    pub time_from: String,
    pub time_to: String,
    pub timezone: String,
}

impl DisplayDefaults {
    pub fn from_config(config: &NormalizeConfig) -> Self {
        Self {
            refresh: config.refresh.clone(),
            time_from: config.time_from.clone(),
            time_to: config.time_to.clone(),
            timezone: config.timezone.clone(),
        }
    }
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self::from_config(&NormalizeConfig::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultsUpdate {
    pub refresh: bool,
    pub time: bool,
    pub timezone: bool,
    pub tags: bool,
}

impl DefaultsUpdate {
    pub fn any(&self) -> bool {
        self.refresh || self.time || self.timezone || self.tags
    }
}

/// Overwrites refresh, time range, timezone and (when given) tags wherever
/// they differ from the target. Tags compare as sets.
pub fn set_default_values(
    dashboard: &mut Map<String, Value>,
    defaults: &DisplayDefaults,
    tags: Option<&[String]>,
) -> DefaultsUpdate {
    let mut update = DefaultsUpdate::default();

    if dashboard.get("refresh").and_then(Value::as_str) != Some(defaults.refresh.as_str()) {
        dashboard.insert("refresh".to_string(), Value::String(defaults.refresh.clone()));
        update.refresh = true;
    }

    if !time_matches(dashboard.get("time"), defaults) {
        dashboard.insert(
            "time".to_string(),
            json!({"from": defaults.time_from, "to": defaults.time_to}),
        );
        update.time = true;
    }

    if dashboard.get("timezone").and_then(Value::as_str) != Some(defaults.timezone.as_str()) {
        dashboard.insert("timezone".to_string(), Value::String(defaults.timezone.clone()));
        update.timezone = true;
    }

    if let Some(tags) = tags {
        if !tags_match(dashboard.get("tags"), tags) {
            dashboard.insert("tags".to_string(), json!(tags));
            update.tags = true;
        }
    }

    update
}

fn time_matches(time: Option<&Value>, defaults: &DisplayDefaults) -> bool {
    let Some(Value::Object(time)) = time else {
        return false;
    };
    time.get("from").and_then(Value::as_str) == Some(defaults.time_from.as_str())
        && time.get("to").and_then(Value::as_str) == Some(defaults.time_to.as_str())
}

fn tags_match(current: Option<&Value>, wanted: &[String]) -> bool {
    let Some(Value::Array(current)) = current else {
        return false;
    };
    let mut existing = BTreeSet::new();
    for tag in current {
        match tag.as_str() {
            Some(tag) => {
                existing.insert(tag);
            }
            None => return false,
        }
    }
    let wanted: BTreeSet<&str> = wanted.iter().map(String::as_str).collect();
    existing == wanted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_missing_fields_are_all_set() {
        let mut dashboard = object(json!({"title": "Broker"}));
        let update = set_default_values(&mut dashboard, &DisplayDefaults::default(), None);

        assert_eq!(
            update,
            DefaultsUpdate { refresh: true, time: true, timezone: true, tags: false }
        );
        assert_eq!(dashboard["refresh"], json!("30s"));
        assert_eq!(dashboard["time"], json!({"from": "now-15m", "to": "now"}));
        assert_eq!(dashboard["timezone"], json!("utc"));
    }

    #[test]
    fn test_matching_fields_are_left_alone() {
        let mut dashboard = object(json!({
            "refresh": "30s",
            "time": {"from": "now-15m", "to": "now", "raw": true},
            "timezone": "utc",
            "tags": ["pulsar", "broker"]
        }));
        let tags = vec!["broker".to_string(), "pulsar".to_string()];
        let update = set_default_values(&mut dashboard, &DisplayDefaults::default(), Some(&tags));

        assert!(!update.any());
        assert_eq!(dashboard["tags"], json!(["pulsar", "broker"]));
        assert_eq!(dashboard["time"]["raw"], json!(true));
    }

    #[test]
    fn test_partial_time_range_is_replaced() {
        let mut dashboard = object(json!({"time": {"from": "now-6h", "to": "now"}}));
        let update = set_default_values(&mut dashboard, &DisplayDefaults::default(), None);
        assert!(update.time);
        assert_eq!(dashboard["time"], json!({"from": "now-15m", "to": "now"}));
    }

    #[test]
    fn test_differing_tags_are_overwritten_in_given_order() {
        let mut dashboard = object(json!({"tags": ["pulsar"]}));
        let tags = vec!["pulsar".to_string(), "bookkeeper".to_string()];
        let update = set_default_values(&mut dashboard, &DisplayDefaults::default(), Some(&tags));
        assert!(update.tags);
        assert_eq!(dashboard["tags"], json!(["pulsar", "bookkeeper"]));
    }
}
