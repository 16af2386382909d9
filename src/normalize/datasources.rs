use serde_json::{Map, Value};

/// Datasource uid used by dashboards exported with an input variable.
const DATASOURCE_INPUT_UID: &str = "${DataSource}";

/// Strips Prometheus datasource references so panels fall back to the
/// Grafana default datasource.
///
/// - `datasource` mappings of type `prometheus` (or pointing at
///   `${DataSource}`) are deleted
/// - a `datasource` string equal to `prometheus`, any case, becomes `null`
/// - `templating.list` entries of type `datasource` are dropped
///
/// Returns whether anything changed.
pub fn remove_prometheus_datasources(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            let mut modified = strip_datasource_field(map);

            if let Some(Value::Array(list)) = map
                .get_mut("templating")
                .and_then(|templating| templating.get_mut("list"))
            {
                let before = list.len();
                list.retain(|item| item.get("type").and_then(Value::as_str) != Some("datasource"));
                modified |= list.len() < before;
            }

            for child in map.values_mut() {
                modified |= remove_prometheus_datasources(child);
            }
            modified
        }
        Value::Array(items) => {
            let mut modified = false;
            for item in items {
                modified |= remove_prometheus_datasources(item);
            }
            modified
        }
        _ => false,
    }
}

fn strip_datasource_field(map: &mut Map<String, Value>) -> bool {
    match map.get("datasource") {
        Some(Value::Object(datasource)) if is_prometheus_reference(datasource) => {
            map.shift_remove("datasource");
            true
        }
        Some(Value::String(name)) if name.to_lowercase() == "prometheus" => {
            map.insert("datasource".to_string(), Value::Null);
            true
        }
        _ => false,
    }
}

fn is_prometheus_reference(datasource: &Map<String, Value>) -> bool {
    datasource.get("type").and_then(Value::as_str) == Some("prometheus")
        || datasource.get("uid").and_then(Value::as_str) == Some(DATASOURCE_INPUT_UID)
}
