use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::stats::ColumnSummary;
use crate::data::{CellValue, Table};

// ---------------------------------------------------------------------------
// Text rendering of tables for the terminal
// ---------------------------------------------------------------------------

fn string_batch(headers: &[String], columns: Vec<Vec<Option<String>>>) -> Result<RecordBatch> {
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| Field::new(h, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|c| Arc::new(StringArray::from(c)) as ArrayRef)
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building display batch")
}

fn render(batch: RecordBatch) -> Result<String> {
    Ok(pretty_format_batches(&[batch])
        .context("formatting table")?
        .to_string())
}

/// Boxed text table of the first `max_rows` rows.
pub fn render_table(table: &Table, max_rows: usize) -> Result<String> {
    if table.num_columns() == 0 {
        return Ok("(empty table)".to_string());
    }
    let head = table.head(max_rows);
    let headers: Vec<String> = head.column_names().iter().map(|s| s.to_string()).collect();
    let columns = head
        .columns()
        .iter()
        .map(|c| {
            c.values
                .iter()
                .map(|v| match v {
                    CellValue::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .collect();
    let mut out = render(string_batch(&headers, columns)?)?;
    if table.len() > max_rows {
        out.push_str(&format!("\n... {} more rows", table.len() - max_rows));
    }
    Ok(out)
}

/// `describe()`-style block: one row per statistic, one column per variable.
pub fn render_describe(summaries: &[ColumnSummary]) -> Result<String> {
    if summaries.is_empty() {
        return Ok("(no numeric columns)".to_string());
    }
    let stats: [(&str, fn(&ColumnSummary) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.median),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];

    let mut headers = vec![String::new()];
    headers.extend(summaries.iter().map(|s| s.name.clone()));

    let mut columns: Vec<Vec<Option<String>>> =
        vec![stats.iter().map(|(label, _)| Some(label.to_string())).collect()];
    for summary in summaries {
        columns.push(
            stats
                .iter()
                .map(|(_, get)| {
                    let v = get(summary);
                    (!v.is_nan()).then(|| format!("{v:.4}"))
                })
                .collect(),
        );
    }
    render(string_batch(&headers, columns)?)
}
