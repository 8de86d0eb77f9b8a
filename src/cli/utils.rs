use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::client::Pagination;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a single record: pretty JSON, or one `key: value` line per field
pub fn output_record<T: Serialize>(output_format: &OutputFormat, record: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(record)?;
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Text => match &value {
            Value::Object(map) => {
                let width = map.keys().map(String::len).max().unwrap_or(0);
                for (key, field) in map {
                    println!("{:width$}  {}", key, display_value(field), width = width);
                }
            }
            other => println!("{}", display_value(other)),
        },
    }
    Ok(())
}

/// Output a list of records with the pagination state that produced it
pub fn output_records<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    records: &[T],
    columns: &[&str],
    pagination: &Pagination,
) -> anyhow::Result<()> {
    let rows: Vec<Value> = records.iter().map(serde_json::to_value).collect::<Result<_, _>>()?;

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: rows,
                    "hasNextPage": pagination.has_next_page,
                    "nextPageToken": pagination.next_page_token,
                    "totalItems": pagination.total_items,
                    "totalPages": pagination.total_pages,
                }))?
            );
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No {} found", collection_name);
                return Ok(());
            }
            print!("{}", render_table(&rows, columns));
            if pagination.has_next_page {
                println!("More available: --page-token {}", pagination.next_page_token.as_deref().unwrap_or_default());
            }
        }
    }
    Ok(())
}

fn render_table(rows: &[Value], columns: &[&str]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| display_value(&row[*column])).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| cells.iter().map(|row| row[i].chars().count()).fold(column.len(), usize::max))
        .collect();

    let mut out = String::new();
    let line = |values: Vec<&str>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:width$}", value, width = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    out.push_str(&line(columns.to_vec()));
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a JSON body from `--data` or, when absent, from stdin
pub fn read_json_input(data: Option<String>) -> anyhow::Result<Value> {
    let raw = match data {
        Some(data) => data,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid JSON input: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![
            json!({ "id": "a1", "title": "Guitar lesson", "date": null }),
            json!({ "id": "b22", "title": "Mix", "date": "2024-05-01" }),
        ];
        let table = render_table(&rows, &["id", "title", "date"]);
        assert_eq!(
            table,
            "id   title          date\n\
             a1   Guitar lesson  -\n\
             b22  Mix            2024-05-01\n"
        );
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!(4)), "4");
        assert_eq!(display_value(&json!("x")), "x");
        assert_eq!(display_value(&Value::Null), "-");
    }
}
