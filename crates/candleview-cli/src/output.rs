use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(payload: &Value, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let text = if pretty {
                serde_json::to_string_pretty(payload)?
            } else {
                serde_json::to_string(payload)?
            };
            println!("{text}");
        }
        OutputFormat::Table => render_table(payload),
    }
    Ok(())
}

/// Best-effort ASCII table: arrays of objects become column tables, plain
/// objects become key/value listings, anything else prints as JSON text.
fn render_table(payload: &Value) {
    match payload {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            render_rows(items);
        }
        Value::Object(fields) => {
            let width = fields.keys().map(String::len).max().unwrap_or(0);
            for (key, value) in fields {
                println!("{key:<width$}  {}", scalar_text(value));
            }
        }
        other => println!("{other}"),
    }
}

fn render_rows(items: &[Value]) {
    let Some(Value::Object(first)) = items.first() else {
        return;
    };
    let columns: Vec<&String> = first.keys().collect();

    let mut widths: Vec<usize> = columns.iter().map(|column| column.len()).collect();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else {
            continue;
        };
        let row: Vec<String> = columns
            .iter()
            .map(|column| fields.get(*column).map(scalar_text).unwrap_or_default())
            .collect();
        for (index, text) in row.iter().enumerate() {
            widths[index] = widths[index].max(text.len());
        }
        rows.push(row);
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{column:<width$}"))
        .collect();
    println!("{}", header.join("  "));
    println!(
        "{}",
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{text:<width$}"))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
