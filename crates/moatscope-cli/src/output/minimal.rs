use serde_json::Value;

use super::scalar;

/// Headline figures, most specific first. Paths are relative to `result`.
const PRIORITY_PATHS: &[&[&str]] = &[
    &["quality", "breakdown", "classification"],
    &["breakdown", "classification"],
    &["grade"],
    &["value", "grade"],
    &["value", "breakdown", "classification"],
    &["value", "status"],
    &["value", "pattern"],
    &["value", "passed"],
    &["snapshot", "roic"],
];

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |node, key| node.get(*key))
        .filter(|v| !v.is_null())
}

/// Print just the key answer from the output.
///
/// Full reports print one line per headline section; single components
/// print their first matching headline, falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if result.get("quality").is_some() {
        print_report_line(None, result);
        return;
    }
    if let Some(map) = result.as_object() {
        if map.values().all(|v| v.get("quality").is_some()) && !map.is_empty() {
            for (company, report) in map {
                print_report_line(Some(company), report);
            }
            return;
        }
    }

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path) {
            println!("{}", scalar(val));
            return;
        }
    }

    match result.as_object().and_then(|m| m.iter().next()) {
        Some((key, val)) => println!("{}: {}", key, scalar(val)),
        None => println!("{}", scalar(result)),
    }
}

fn print_report_line(company: Option<&String>, report: &Value) {
    let field = |path: &[&str]| lookup(report, path).map_or_else(|| "N/A".to_string(), scalar);
    let line = format!(
        "quality={} moat={} capital_allocation={} red_flags={}",
        field(&["quality", "breakdown", "classification"]),
        field(&["moat", "value", "breakdown", "classification"]),
        field(&["capital_allocation", "value", "grade"]),
        field(&["red_flags", "value", "status"]),
    );
    match company {
        Some(name) => println!("{}: {}", name, line),
        None => println!("{}", line),
    }
}
