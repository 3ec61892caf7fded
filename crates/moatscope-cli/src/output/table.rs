use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::flatten;

/// Print the envelope's result as a two-column table, one row per leaf
/// field, followed by warnings and methodology.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", super::scalar(value));
        return;
    };
    let result = envelope.get("result").unwrap_or(value);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (path, leaf) in flatten(result) {
        builder.push_record([path, leaf]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
