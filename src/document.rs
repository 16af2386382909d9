use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{DashboardError, Result};

/// Reads and parses a dashboard file. No shape is enforced here.
pub fn read_dashboard(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let dashboard = serde_json::from_str(&content)?;
    Ok(dashboard)
}

/// Renders a dashboard the way it is stored in the repository: two-space
/// indentation, non-ASCII characters left as-is, no trailing newline.
pub fn render_dashboard(dashboard: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

pub fn write_dashboard(path: &Path, dashboard: &Value) -> Result<()> {
    let rendered = render_dashboard(dashboard)?;
    fs::write(path, rendered)?;
    Ok(())
}

/// Short name of a JSON value's kind, for error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Borrows the root mapping of a dashboard, rejecting any other root.
pub fn root_object(dashboard: &mut Value) -> Result<&mut serde_json::Map<String, Value>> {
    let found = kind_of(dashboard);
    dashboard
        .as_object_mut()
        .ok_or(DashboardError::NotAnObject { found })
}
