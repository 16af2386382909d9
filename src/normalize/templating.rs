use serde_json::{json, Map, Value};

/// Resets the saved selection of every template variable: `All` for
/// variables that offer it, nothing otherwise.
///
/// Only entries of the root `templating.list` are touched. Returns the
/// number of variables whose `current` was rewritten.
pub fn standardize_template_variables(dashboard: &mut Map<String, Value>) -> usize {
    let Some(Value::Array(list)) = dashboard
        .get_mut("templating")
        .and_then(|templating| templating.get_mut("list"))
    else {
        return 0;
    };

    let mut changed = 0;
    for variable in list.iter_mut().filter_map(Value::as_object_mut) {
        let target = if variable.get("includeAll").and_then(Value::as_bool) == Some(true) {
            json!({"text": "All", "value": "$__all"})
        } else {
            json!({})
        };

        if variable.get("current") != Some(&target) {
            variable.insert("current".to_string(), target);
            changed += 1;
        }
    }
    changed
}
