pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into `(dotted.path, scalar)` rows. Arrays of
/// scalars are joined; arrays of objects are indexed (`flags.0.title`).
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_into(&join(key), val, rows);
            }
        }
        Value::Array(items) if items.iter().any(|v| v.is_object()) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(&join(&i.to_string()), item, rows);
            }
        }
        _ => rows.push((prefix.to_string(), scalar(value))),
    }
}

/// Render a leaf value; absent values print as "N/A".
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "N/A".to_string(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
