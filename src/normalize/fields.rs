use serde_json::{Map, Value};

/// Removes `fields` from the dashboard root only.
///
/// Returns, in `fields` order, whether each field was present.
pub fn remove_top_level_fields(
    dashboard: &mut Map<String, Value>,
    fields: &[String],
) -> Vec<(String, bool)> {
    fields
        .iter()
        .map(|field| {
            let removed = dashboard.shift_remove(field.as_str()).is_some();
            (field.clone(), removed)
        })
        .collect()
}

/// Removes `fields` wherever they appear as a mapping key, at any depth.
///
/// Returns, in `fields` order, how many occurrences of each were removed.
pub fn remove_recursive(value: &mut Value, fields: &[String]) -> Vec<(String, usize)> {
    let mut counts = vec![0usize; fields.len()];
    strip(value, fields, &mut counts);
    fields.iter().cloned().zip(counts).collect()
}

fn strip(value: &mut Value, fields: &[String], counts: &mut [usize]) {
    match value {
        Value::Object(map) => {
            // Drop matches first so removed subtrees are never walked
            for (field, count) in fields.iter().zip(counts.iter_mut()) {
                if map.shift_remove(field.as_str()).is_some() {
                    *count += 1;
                }
            }
            for child in map.values_mut() {
                strip(child, fields, counts);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip(item, fields, counts);
            }
        }
        _ => {}
    }
}
