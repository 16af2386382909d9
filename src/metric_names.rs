//! Metric-name extraction from the PromQL queries of dashboard panels.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::document;
use crate::error::Result;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z_:][a-zA-Z0-9_:]*").expect("identifier regex compiles"));

/// PromQL keywords, operators, functions and bare time units. Identifiers in
/// this set are never reported as metric names.
static PROMQL_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Operators
        "and", "or", "unless", "by", "without", "on", "ignoring", "group_left", "group_right",
        "offset", "bool",
        // Aggregations
        "sum", "min", "max", "avg", "group", "stddev", "stdvar", "count", "count_values",
        "bottomk", "topk", "quantile",
        // Counters and gauges
        "rate", "increase", "irate", "delta", "idelta", "predict_linear", "deriv", "resets",
        "changes",
        // Histograms
        "histogram_quantile", "histogram_sum", "histogram_count", "histogram_fraction",
        // Range vectors
        "avg_over_time", "min_over_time", "max_over_time", "sum_over_time", "count_over_time",
        "quantile_over_time", "stddev_over_time", "stdvar_over_time", "last_over_time",
        "present_over_time", "absent_over_time",
        // Labels and conversions
        "label_join", "label_replace", "absent", "scalar", "vector", "time",
        // Math
        "abs", "ceil", "floor", "exp", "sqrt", "ln", "log2", "log10", "round", "clamp",
        "clamp_min", "clamp_max", "sgn",
        // Trigonometry
        "sin", "cos", "tan", "asin", "acos", "atan", "deg", "rad", "pi",
        // Date and time
        "day_of_week", "day_of_month", "day_of_year", "days_in_month", "month", "year", "hour",
        "minute", "timestamp",
        // Sorting
        "sort", "sort_desc",
        // Duration units
        "s", "m", "h", "d", "w", "y",
    ]
    .into_iter()
    .collect()
});

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

/// Metric names referenced by one PromQL expression.
///
/// A candidate is a whole identifier (not glued to a preceding identifier
/// character) that is immediately followed by `{`, `[`, `(`, whitespace or
/// the end of the query. Label names, string contents and keywords drop out.
pub fn extract_from_promql(promql: &str) -> BTreeSet<String> {
    IDENTIFIER
        .find_iter(promql)
        .filter(|m| {
            let preceded = promql[..m.start()].chars().next_back().map_or(false, is_identifier_char);
            let followed_ok = promql[m.end()..]
                .chars()
                .next()
                .map_or(true, |c| matches!(c, '{' | '[' | '(') || c.is_whitespace());
            !preceded && followed_ok
        })
        .map(|m| m.as_str())
        .filter(|name| !PROMQL_KEYWORDS.contains(*name))
        .map(str::to_string)
        .collect()
}

/// Metric names used by every panel target of a dashboard, rows included.
pub fn extract_from_dashboard(dashboard: &Value) -> BTreeSet<String> {
    let mut metrics = BTreeSet::new();
    if let Some(Value::Array(panels)) = dashboard.get("panels") {
        collect_panels(panels, &mut metrics);
    }
    metrics
}

fn collect_panels(panels: &[Value], metrics: &mut BTreeSet<String>) {
    for panel in panels {
        if let Some(Value::Array(nested)) = panel.get("panels") {
            collect_panels(nested, metrics);
        }
        if let Some(Value::Array(targets)) = panel.get("targets") {
            for expr in targets.iter().filter_map(|t| t.get("expr")).filter_map(Value::as_str) {
                metrics.extend(extract_from_promql(expr));
            }
        }
    }
}

pub fn extract_from_file(path: &Path) -> Result<BTreeSet<String>> {
    let dashboard = document::read_dashboard(path)?;
    Ok(extract_from_dashboard(&dashboard))
}
