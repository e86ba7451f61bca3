//! Result rendering: tables, JSON lines and CSV.

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use hashdict_core::{Block, DictionaryStats, Value};

/// Output format option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Box-drawn table.
    #[default]
    Table,
    /// One JSON object per row.
    Json,
    /// Comma-separated values with a header line.
    Csv,
}

/// Converts a value for JSON output. Decimals and 128-bit integers stay
/// strings to keep their exact digits; non-finite floats become `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::UInt8(v) => (*v).into(),
        Value::UInt16(v) => (*v).into(),
        Value::UInt32(v) => (*v).into(),
        Value::UInt64(v) => (*v).into(),
        Value::Int8(v) => (*v).into(),
        Value::Int16(v) => (*v).into(),
        Value::Int32(v) => (*v).into(),
        Value::Int64(v) => (*v).into(),
        Value::Float32(v) => (*v).into(),
        Value::Float64(v) => (*v).into(),
        other => serde_json::Value::String(other.to_string()),
    }
}

/// Rows of a block, in order.
pub fn block_rows(block: &Block) -> Vec<Vec<Value>> {
    (0..block.row_count())
        .map(|row| block.columns().iter().filter_map(|c| c.get(row)).collect())
        .collect()
}

/// Renders rows under the given column names.
pub fn render_rows(names: &[String], rows: &[Vec<Value>], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(names.iter().map(|n| Cell::new(n).fg(Color::Cyan)));
            for row in rows {
                table.add_row(row.iter().map(|v| Cell::new(v.to_string())));
            }
            Ok(table.to_string())
        }
        OutputFormat::Json => {
            let mut out = String::new();
            for row in rows {
                let object: serde_json::Map<String, serde_json::Value> = names
                    .iter()
                    .cloned()
                    .zip(row.iter().map(value_to_json))
                    .collect();
                out.push_str(&serde_json::to_string(&object)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(names)?;
            for row in rows {
                writer.write_record(row.iter().map(ToString::to_string))?;
            }
            let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

/// Renders a statistics snapshot.
pub fn render_stats(stats: &DictionaryStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        OutputFormat::Table | OutputFormat::Csv => {
            let fields = [
                ("name", stats.name.clone()),
                ("type", stats.type_name.clone()),
                ("key", stats.key_description.clone()),
                ("attributes", stats.attribute_count.to_string()),
                ("elements", stats.element_count.to_string()),
                ("buckets", stats.bucket_count.to_string()),
                ("bytes_allocated", stats.bytes_allocated.to_string()),
                ("bytes_per_element", format!("{:.1}", stats.bytes_per_element())),
                ("load_factor", format!("{:.3}", stats.load_factor)),
                ("query_count", stats.query_count.to_string()),
                ("hit_rate", format!("{:.3}", stats.hit_rate)),
                ("is_cached", stats.is_cached.to_string()),
                ("duplicates_dropped", stats.duplicates_dropped.to_string()),
            ];
            let names = vec!["field".to_string(), "value".to_string()];
            let rows: Vec<Vec<Value>> = fields
                .into_iter()
                .map(|(k, v)| vec![Value::from(k), Value::from(v)])
                .collect();
            render_rows(&names, &rows, format)
        }
    }
}
