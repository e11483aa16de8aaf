// 🧮 Table - ordered columns + rows of typed cells
// Every source is loaded, normalized and unified through this one structure

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// CELL VALUE
// ============================================================================

/// Cell texts that mean "no value" in agency exports, besides the empty cell
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell. Raw tables only hold `Null` and `Text`; the typed variants
/// appear after coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Value {
    /// Build a cell from raw CSV text. Empty cells and the missing-value
    /// markers are null; matching is exact, so " N/A " stays text.
    pub fn from_cell(raw: &str) -> Self {
        if raw.is_empty() || MISSING_MARKERS.contains(&raw) {
            Value::Null
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals, mostly for fixtures.
    /// Empty strings become null cells.
    pub fn from_strings(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|cell| Value::from_cell(cell)).collect());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding with nulls or truncating to the column count
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is an error
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Rename columns through an (old, new) map. Names not present are ignored.
    pub fn rename_columns(&mut self, map: &[(&str, &str)]) {
        for column in self.columns.iter_mut() {
            if let Some((_, new)) = map.iter().find(|(old, _)| old == column) {
                *column = new.to_string();
            }
        }
    }

    /// Remove the named columns. Every name must exist.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.require_column(name)?;
        }
        self.retain_columns(|column| !names.contains(&column));
        Ok(())
    }

    /// Remove spurious index columns (`Unnamed: 0` and friends)
    pub fn drop_unnamed_columns(&mut self) {
        self.retain_columns(|column| !column.to_lowercase().starts_with("unnamed"));
    }

    fn retain_columns<F>(&mut self, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        let mask: Vec<bool> = self.columns.iter().map(|c| keep(c.as_str())).collect();
        if mask.iter().all(|k| *k) {
            return;
        }

        let mut flags = mask.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));

        for row in self.rows.iter_mut() {
            let mut flags = mask.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Replace a column in place, or append it when it does not exist yet
    pub fn set_column(&mut self, name: &str, mut values: Vec<Value>) {
        values.resize(self.rows.len(), Value::Null);

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Rewrite every cell of a column. The first error aborts the whole
    /// column and leaves the table untouched.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &Value) -> Result<Value>,
    {
        let idx = self.require_column(name)?;

        let mapped = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| f(i, &row[idx]))
            .collect::<Result<Vec<_>>>()?;

        for (row, value) in self.rows.iter_mut().zip(mapped) {
            row[idx] = value;
        }
        Ok(())
    }

    /// Row-wise union of tables (the Unifier).
    ///
    /// Columns are the union in order of first appearance. Cells for columns a
    /// table does not have are null. Row order follows the input order.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for table in &tables {
            for column in &table.columns {
                if seen.insert(column.clone()) {
                    columns.push(column.clone());
                }
            }
        }

        let mut unified = Table::new(columns);

        for table in tables {
            let positions: Vec<usize> = table
                .columns
                .iter()
                .map(|c| unified.column_index(c).unwrap_or_default())
                .collect();

            for row in table.rows {
                let mut out = vec![Value::Null; unified.columns.len()];
                for (value, pos) in row.into_iter().zip(&positions) {
                    out[*pos] = value;
                }
                unified.rows.push(out);
            }
        }

        unified
    }
}

// ============================================================================
// TESTS
// ============================================================================
