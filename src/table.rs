//! Minimal column-major table used as the data seam between the campaign,
//! the constraint engine, and external recommender backends.
//!
//! Dataframe-style numeric storage is deliberately out of scope; this type
//! carries only the operations the core contracts need: named column
//! lookup (failing fast on absent columns), row append, row selection, and
//! in-place fill of missing cells.

use crate::error::{Error, Result};
use crate::value::Value;

/// A small, ordered, column-major table of [`Value`] cells.
///
/// All rows have one cell per column; all columns have one cell per row.
/// Row order is significant: constraints that deduplicate rows keep the
/// first occurrence in input order.
///
/// # Examples
///
/// ```
/// use bayopt::{Table, Value};
///
/// let mut table = Table::new(["x", "y"]);
/// table.push_row(vec![Value::Float(1.0), Value::Str("a".into())]).unwrap();
/// table.push_row(vec![Value::Float(2.0), Value::Str("b".into())]).unwrap();
///
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.column("x").unwrap()[1], Value::Float(2.0));
/// assert!(table.column("z").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given column names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let columns = names.iter().map(|_| Vec::new()).collect();
        Self { names, columns }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if a column with the given name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Returns the cells of the named column in row order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if no column with that name exists.
    /// Referencing an absent column is a configuration error and fails
    /// fast rather than producing an empty result.
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        self.column_index(name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Returns the cell at the given row in the named column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if the column does not exist and
    /// [`Error::Internal`] if the row index is out of range.
    pub fn get(&self, row: usize, name: &str) -> Result<&Value> {
        let col = self.column(name)?;
        col.get(row).ok_or(Error::Internal("row index out of range"))
    }

    /// Appends a row of cells, one per column in column order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnLengthMismatch`] if the row length differs
    /// from the number of columns.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.names.len() {
            return Err(Error::ColumnLengthMismatch {
                expected: self.names.len(),
                got: row.len(),
            });
        }
        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.push(cell);
        }
        Ok(())
    }

    /// Adds a new column of cells.
    ///
    /// The first column added to a table without columns defines the row
    /// count; subsequent columns must match it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnLengthMismatch`] if the column length differs
    /// from the current row count, and [`Error::DuplicateParameters`] if a
    /// column with that name already exists.
    pub fn add_column(&mut self, name: impl Into<String>, cells: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(Error::DuplicateParameters { parameter: name });
        }
        if !self.names.is_empty() && cells.len() != self.n_rows() {
            return Err(Error::ColumnLengthMismatch {
                expected: self.n_rows(),
                got: cells.len(),
            });
        }
        self.names.push(name);
        self.columns.push(cells);
        Ok(())
    }

    /// Appends all rows of `other`, aligning columns by name.
    ///
    /// If this table has no columns yet, it adopts the schema of `other`.
    /// Columns of `other` that this table does not have are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if `other` lacks one of this
    /// table's columns.
    pub fn append(&mut self, other: &Table) -> Result<()> {
        if self.names.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        // Resolve all columns up front so a partial append never happens.
        let mut incoming = Vec::with_capacity(self.names.len());
        for name in &self.names {
            incoming.push(other.column(name)?);
        }
        for (column, cells) in self.columns.iter_mut().zip(incoming) {
            column.extend_from_slice(cells);
        }
        Ok(())
    }

    /// Returns a new table containing the given rows, in the given order.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| indices.iter().map(|&i| column[i].clone()).collect())
            .collect();
        Table {
            names: self.names.clone(),
            columns,
        }
    }

    /// Keeps only the rows whose index satisfies the predicate.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let flags: Vec<bool> = (0..self.n_rows()).map(&mut keep).collect();
        for column in &mut self.columns {
            let mut i = 0;
            column.retain(|_| {
                let kept = flags[i];
                i += 1;
                kept
            });
        }
    }

    /// Replaces every missing cell of the named column with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if the column does not exist.
    pub fn fill_missing(&mut self, name: &str, value: &Value) -> Result<()> {
        let index = self.column_index(name)?;
        for cell in &mut self.columns[index] {
            if cell.is_missing() {
                *cell = value.clone();
            }
        }
        Ok(())
    }

    /// Removes all rows, keeping the schema.
    pub fn clear_rows(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }

    /// Returns the cells of row `i` in column order.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<Value> {
        self.columns.iter().map(|column| column[i].clone()).collect()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_owned(),
            })
    }
}
