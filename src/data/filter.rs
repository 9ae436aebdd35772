use super::model::{Table, TableError};

// ---------------------------------------------------------------------------
// Range predicate over a numeric column
// ---------------------------------------------------------------------------

/// Inclusive bounds on one numeric column. A missing bound is open.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        RangeFilter {
            column: column.into(),
            min,
            max,
        }
    }

    fn accepts(&self, value: Option<f64>) -> bool {
        let Some(v) = value else {
            return false;
        };
        self.min.map_or(true, |lo| v >= lo) && self.max.map_or(true, |hi| v <= hi)
    }
}

/// Return indices of rows that pass every filter.
///
/// Every filtered column must exist. A null or non-numeric cell fails its
/// filter.
pub fn filtered_indices(table: &Table, filters: &[RangeFilter]) -> Result<Vec<usize>, TableError> {
    let columns = filters
        .iter()
        .map(|f| {
            table
                .column(&f.column)
                .map(|c| (f, c.f64_values()))
                .ok_or_else(|| TableError::MissingColumn(f.column.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((0..table.len())
        .filter(|&row| columns.iter().all(|(f, values)| f.accepts(values[row])))
        .collect())
}

/// A new table with only the passing rows.
pub fn apply_filters(table: &Table, filters: &[RangeFilter]) -> Result<Table, TableError> {
    Ok(table.select_rows(&filtered_indices(table, filters)?))
}
