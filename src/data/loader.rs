use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Table};

/// Extensions picked up by [`list_datasets`].
pub const DATASET_EXTENSIONS: &[&str] = &["csv", "dat"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma separated, header row
/// * `.dat`     – tab separated when the header has a tab, whitespace otherwise
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "dat" => load_dat(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    info!(
        "Loaded {} rows and {} columns from {}",
        table.len(),
        table.num_columns(),
        path.display()
    );
    Ok(table)
}

/// List loadable `.csv` / `.dat` files in a data directory, sorted by name.
/// A missing directory is created and yields an empty list.
pub fn list_datasets(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if path.is_file() && ext.is_some_and(|e| DATASET_EXTENSIONS.contains(&e.as_str())) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

// ---------------------------------------------------------------------------
// CSV / DAT loaders
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let reader = csv::ReaderBuilder::new()
        .from_path(path)
        .context("opening CSV")?;
    read_delimited(reader)
}

fn load_dat(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).context("reading DAT file")?;
    let first_line = text.lines().next().unwrap_or("");
    if first_line.contains('\t') {
        debug!("{}: tab separated", path.display());
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(text.as_bytes());
        read_delimited(reader)
    } else {
        debug!("{}: whitespace separated", path.display());
        parse_whitespace(&text)
    }
}

fn read_delimited<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }
    build_text_table(headers, cells)
}

fn parse_whitespace(text: &str) -> Result<Table> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let headers: Vec<String> = lines
        .next()
        .context("empty DAT file")?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != headers.len() {
            bail!(
                "row {row_no}: expected {} fields, found {}",
                headers.len(),
                fields.len()
            );
        }
        for (column, field) in cells.iter_mut().zip(fields) {
            column.push(field.to_string());
        }
    }
    build_text_table(headers, cells)
}

fn build_text_table(headers: Vec<String>, cells: Vec<Vec<String>>) -> Result<Table> {
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::from_text(name, raw))
        .collect();
    Table::from_columns(columns).context("assembling table")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "galaxia": "NGC 4258", "velocidad": 448.0, "distancia": 7.6 },
///   ...
/// ]
/// ```
///
/// Column order follows first appearance; keys missing from a record are null.
fn load_json(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::derived(name, values)
        })
        .collect();

    Table::from_columns(columns).context("assembling table")
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns. Integers of every width
/// load as integers, decimals and half floats as floats, strings and bools
/// as themselves. Any other type (dates, timestamps, ...) keeps Arrow's text
/// rendering of each value.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let mut columns: Vec<(String, Vec<CellValue>)> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, (name, values)) in columns.iter_mut().enumerate() {
            let cells = extract_cells(batch.column(col_idx))
                .with_context(|| format!("reading parquet column '{name}'"))?;
            values.extend(cells);
        }
    }

    let columns = columns
        .into_iter()
        .map(|(name, values)| Column::derived(name, values))
        .collect();
    Table::from_columns(columns).context("assembling table")
}

/// Cast integer and decimal types onto the ones [`extract_cell`] reads.
fn widen(array: &ArrayRef) -> Result<ArrayRef> {
    let target = match array.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 | DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => {
            DataType::Float64
        }
        _ => return Ok(Arc::clone(array)),
    };
    debug!("casting {} column to {target}", array.data_type());
    cast(array, &target).with_context(|| format!("casting {} to {target}", array.data_type()))
}

fn extract_cells(array: &ArrayRef) -> Result<Vec<CellValue>> {
    let array = widen(array)?;
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)
        .with_context(|| format!("no text form for {}", array.data_type()))?;
    Ok((0..array.len())
        .map(|row| extract_cell(&array, row, &formatter))
        .collect())
}

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize, formatter: &ArrayFormatter<'_>) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            CellValue::from_f64(Some(col.as_primitive::<Float32Type>().value(row) as f64))
        }
        DataType::Float64 => CellValue::from_f64(Some(col.as_primitive::<Float64Type>().value(row))),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::String(formatter.value(row).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(
            &dir,
            "g.csv",
            "galaxia,velocidad,distancia\nM31,-301,0.78\nNGC 4258,448,7.6\n",
        );
        let t = load_file(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column_names(), vec!["galaxia", "velocidad", "distancia"]);
        assert_eq!(t.cell(1, "velocidad"), Some(&CellValue::Integer(448)));
    }

    #[test]
    fn dat_detects_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "t.dat", "name\tz\nA B\t0.1\n");
        let t = load_file(&path).unwrap();
        assert_eq!(t.cell(0, "name"), Some(&CellValue::String("A B".into())));
        assert_eq!(t.cell(0, "z"), Some(&CellValue::Float(0.1)));
    }

    #[test]
    fn dat_falls_back_to_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "w.dat", "a   e  incl\n1.2 0.1   5\n\n2.0 0.3 10.5\n");
        let t = load_file(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(1, "incl"), Some(&CellValue::Float(10.5)));
    }

    #[test]
    fn dat_rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "bad.dat", "a b\n1 2 3\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "r.json", r#"[{"z": 0.1, "ra": 180}, {"z": 0.2}]"#);
        let t = load_file(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(1, "ra"), Some(&CellValue::Null));
        assert_eq!(t.cell(0, "ra"), Some(&CellValue::Integer(180)));
    }

    #[test]
    fn parquet_keeps_values_of_every_column_type() {
        use arrow::array::{Date32Array, Float64Array, Int16Array, StringArray, UInt32Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("galaxia", DataType::Utf8, false),
            Field::new("id", DataType::UInt32, false),
            Field::new("velocidad", DataType::Int16, true),
            Field::new("distancia", DataType::Float64, false),
            Field::new("fecha", DataType::Date32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["NGC 1", "NGC 2"])),
                Arc::new(UInt32Array::from(vec![7, 8])),
                Arc::new(Int16Array::from(vec![Some(700), None])),
                Arc::new(Float64Array::from(vec![10.0, 10.5])),
                // 2024-01-15 and 2024-01-16
                Arc::new(Date32Array::from(vec![19737, 19738])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.parquet");
        let mut writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_file(&path).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column_names(), vec!["galaxia", "id", "velocidad", "distancia", "fecha"]);
        assert_eq!(t.cell(1, "galaxia"), Some(&CellValue::String("NGC 2".into())));
        assert_eq!(t.cell(0, "id"), Some(&CellValue::Integer(7)));
        assert_eq!(t.cell(0, "velocidad"), Some(&CellValue::Integer(700)));
        assert_eq!(t.cell(1, "velocidad"), Some(&CellValue::Null));
        assert_eq!(t.cell(1, "distancia"), Some(&CellValue::Float(10.5)));
        assert_eq!(t.cell(0, "fecha"), Some(&CellValue::String("2024-01-15".into())));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = load_file(Path::new("table.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn lists_only_csv_and_dat() {
        let dir = tempfile::tempdir().unwrap();
        write_tmp(&dir, "b.dat", "x\n1\n");
        write_tmp(&dir, "a.csv", "x\n1\n");
        write_tmp(&dir, "notes.txt", "hi");
        let found = list_datasets(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.dat"]);
    }

    #[test]
    fn missing_data_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        assert!(list_datasets(&data).unwrap().is_empty());
        assert!(data.is_dir());
    }
}
