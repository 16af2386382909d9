use serde_json::{Map, Value};

const TIMESERIES: &str = "timeseries";
const SHOW_POINTS_NEVER: &str = "never";

/// Forces `fieldConfig.defaults.custom.showPoints = "never"` on every
/// timeseries panel, rows included. Returns the number of panels changed.
pub fn disable_points(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => {
            let mut changed = 0;
            if map.get("type").and_then(Value::as_str) == Some(TIMESERIES) && hide_points(map) {
                changed += 1;
            }

            if let Some(panels) = map.get_mut("panels") {
                changed += disable_points(panels);
            }
            for (key, child) in map.iter_mut() {
                if key != "panels" {
                    changed += disable_points(child);
                }
            }
            changed
        }
        Value::Array(items) => items.iter_mut().map(disable_points).sum(),
        _ => 0,
    }
}

fn hide_points(panel: &mut Map<String, Value>) -> bool {
    let custom = ["fieldConfig", "defaults", "custom"]
        .iter()
        .fold(panel, |map, key| child_object(map, key));

    if custom.get("showPoints").and_then(Value::as_str) == Some(SHOW_POINTS_NEVER) {
        return false;
    }
    custom.insert("showPoints".to_string(), Value::String(SHOW_POINTS_NEVER.to_string()));
    true
}

/// Returns the mapping under `key`, creating it (or replacing a non-mapping).
fn child_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(child) => child,
        _ => unreachable!("slot was just made an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_timeseries_gets_full_path() {
        let mut panel = json!({"type": "timeseries"});
        assert_eq!(disable_points(&mut panel), 1);
        assert_eq!(
            panel,
            json!({"type": "timeseries", "fieldConfig": {"defaults": {"custom": {"showPoints": "never"}}}})
        );
    }

    #[test]
    fn test_existing_config_is_merged() {
        let mut panel = json!({
            "type": "timeseries",
            "fieldConfig": {"defaults": {"unit": "short", "custom": {"showPoints": "auto", "lineWidth": 1}}}
        });
        assert_eq!(disable_points(&mut panel), 1);
        assert_eq!(
            panel["fieldConfig"],
            json!({"defaults": {"unit": "short", "custom": {"showPoints": "never", "lineWidth": 1}}})
        );
    }

    #[test]
    fn test_non_object_config_is_replaced() {
        let mut panel = json!({"type": "timeseries", "fieldConfig": {"defaults": null}});
        assert_eq!(disable_points(&mut panel), 1);
        assert_eq!(panel["fieldConfig"], json!({"defaults": {"custom": {"showPoints": "never"}}}));
    }

    #[test]
    fn test_rows_and_other_types() {
        let mut dashboard = json!({
            "panels": [
                {"type": "row", "panels": [
                    {"type": "timeseries"},
                    {"type": "stat"},
                    {"type": "timeseries", "fieldConfig": {"defaults": {"custom": {"showPoints": "never"}}}}
                ]},
                {"type": "timeseries"}
            ]
        });

        assert_eq!(disable_points(&mut dashboard), 2);
        assert_eq!(dashboard["panels"][0]["panels"][1], json!({"type": "stat"}));
        assert_eq!(disable_points(&mut dashboard), 0);
    }
}
