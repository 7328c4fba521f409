use serde_json::Value;
use std::io;

/// Write output as two-column CSV to stdout. Nested result blocks are
/// flattened into dotted field names; the trace is skipped entirely.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let target = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let mut rows: Vec<(String, String)> = Vec::new();
    flatten_into("", target, &mut rows);

    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in &rows {
        let _ = wtr.write_record([key.as_str(), val.as_str()]);
    }

    let _ = wtr.flush();
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match val {
                    Value::Object(_) => flatten_into(&path, val, rows),
                    Value::Array(arr) if arr.iter().any(|v| v.is_object()) => {
                        // Trace steps do not belong in a flat CSV
                    }
                    other => rows.push((path, format_csv_value(other))),
                }
            }
        }
        other => rows.push((prefix.to_string(), format_csv_value(other))),
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
