use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell the way `pandas.read_csv` would.
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || matches!(s, "NaN" | "nan" | "NA" | "null" | "None") {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        match s {
            "true" | "True" => CellValue::Bool(true),
            "false" | "False" => CellValue::Bool(false),
            _ => CellValue::String(s.to_string()),
        }
    }

    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// A float cell, collapsing NaN/infinite results to `Null`.
    pub fn from_f64(v: Option<f64>) -> Self {
        match v {
            Some(v) if v.is_finite() => CellValue::Float(v),
            _ => CellValue::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text written to CSV for a value that has no source text.
    fn to_csv_text(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

/// A named column. Columns read from a file keep the original text of every
/// cell so that writing them back out is lossless.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
    source_text: Option<Vec<String>>,
}

impl Column {
    /// A column computed in memory.
    pub fn derived(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
            source_text: None,
        }
    }

    /// A column parsed from raw text cells.
    pub fn from_text(name: impl Into<String>, raw: Vec<String>) -> Self {
        let values = raw.iter().map(|s| CellValue::guess(s)).collect();
        Column {
            name: name.into(),
            values,
            source_text: Some(raw),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every non-null cell holds a number.
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .all(|v| v.is_null() || v.as_f64().is_some())
    }

    /// Numeric view of the column; non-numeric and null cells are `None`.
    pub fn f64_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }

    /// CSV text for a cell, preferring the text it was loaded from.
    pub fn text(&self, row: usize) -> String {
        match &self.source_text {
            Some(raw) => raw.get(row).cloned().unwrap_or_default(),
            None => self
                .values
                .get(row)
                .map(CellValue::to_csv_text)
                .unwrap_or_default(),
        }
    }

    fn take_rows(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
            source_text: self
                .source_text
                .as_ref()
                .map(|raw| indices.iter().map(|&i| raw[i].clone()).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{name}' has {got} rows, table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("column '{0}' not found")]
    MissingColumn(String),
}

/// Rows are observed objects, columns are measurements.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that all columns share one length and
    /// that names are unique.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Table::default();
        for col in columns {
            if table.column(&col.name).is_some() {
                return Err(TableError::DuplicateColumn(col.name));
            }
            table.set_column(col)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Insert a column, replacing any existing column of the same name in
    /// place. Appends otherwise.
    pub fn set_column(&mut self, column: Column) -> Result<(), TableError> {
        if !self.columns.is_empty() && column.len() != self.len() {
            let got = column.len();
            return Err(TableError::LengthMismatch {
                name: column.name,
                expected: self.len(),
                got,
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Rename a column, returning false when it does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(col) => {
                col.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// A new table holding only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take_rows(indices)).collect(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.len())).collect();
        self.select_rows(&indices)
    }

    /// Cell lookup by row and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column).and_then(|c| c.values.get(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_col(name: &str, cells: &[&str]) -> Column {
        Column::from_text(name, cells.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn guesses_pandas_like_types() {
        assert_eq!(CellValue::guess("42"), CellValue::Integer(42));
        assert_eq!(CellValue::guess("9.8"), CellValue::Float(9.8));
        assert_eq!(CellValue::guess("NaN"), CellValue::Null);
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("True"), CellValue::Bool(true));
        assert_eq!(CellValue::guess("M31"), CellValue::String("M31".into()));
    }

    #[test]
    fn loaded_text_survives_unchanged() {
        let col = text_col("distancia", &["10.0", "1e3", " 7"]);
        assert_eq!(col.text(0), "10.0");
        assert_eq!(col.text(1), "1e3");
        assert_eq!(col.text(2), " 7");
        assert_eq!(col.values[2], CellValue::Integer(7));
    }

    #[test]
    fn numeric_detection_ignores_nulls() {
        assert!(text_col("v", &["1", "", "2.5"]).is_numeric());
        assert!(!text_col("g", &["1", "NGC 4258"]).is_numeric());
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut t = Table::from_columns(vec![
            text_col("a", &["1", "2"]),
            text_col("b", &["3", "4"]),
        ])
        .unwrap();
        t.set_column(Column::derived("a", vec![CellValue::Null, CellValue::Null]))
            .unwrap();
        assert_eq!(t.column_names(), vec!["a", "b"]);
        assert_eq!(t.cell(0, "a"), Some(&CellValue::Null));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::from_columns(vec![text_col("a", &["1", "2"]), text_col("b", &["3"])])
            .unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                name: "b".into(),
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn set_column_rejects_wrong_length() {
        let mut t = Table::from_columns(vec![text_col("a", &["1", "2"])]).unwrap();
        let err = t.set_column(text_col("b", &["1", "2", "3"])).unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                name: "b".into(),
                expected: 2,
                got: 3
            }
        );
        assert_eq!(t.num_columns(), 1);
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::from_columns(vec![text_col("a", &["1"]), text_col("a", &["2"])])
            .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn head_and_select_keep_source_text() {
        let t = Table::from_columns(vec![text_col("z", &["0.10", "0.20", "0.30"])]).unwrap();
        let picked = t.select_rows(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.column("z").unwrap().text(0), "0.30");
        assert_eq!(t.head(10).len(), 3);
    }

    #[test]
    fn derived_floats_write_full_precision() {
        let col = Column::derived("x", vec![CellValue::Float(0.1 + 0.2), CellValue::Null]);
        assert_eq!(col.text(0), (0.1f64 + 0.2).to_string());
        assert_eq!(col.text(1), "");
    }
}
