use serde_json::Value;
use std::io;

use super::flatten;

/// Write the envelope's result to stdout as `field,value` rows with dotted
/// field paths.
pub fn print_csv(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = wtr.write_record(["field", "value"]);
    for (path, leaf) in flatten(result) {
        let _ = wtr.write_record([path, leaf]);
    }
    let _ = wtr.flush();
}
