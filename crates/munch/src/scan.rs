//! Result sets and row → record decoding.

use crate::error::{MunchError, MunchResult, RowDecodeError};
use crate::record::{Record, RecordSchema};
use crate::value::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// A cell the connection could not convert into a [`Value`].
///
/// Carried in place of the row so the failure is reported for that row only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    pub column: String,
    pub message: String,
}

impl CellError {
    pub fn new(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            message: message.into(),
        }
    }
}

impl From<CellError> for MunchError {
    fn from(e: CellError) -> Self {
        MunchError::decode(e.column, e.message)
    }
}

/// One row as delivered by a connection: its cells, or the cell that broke it.
pub type RowCells = Result<Vec<Value>, CellError>;

/// Rows returned by a [`Connection`](crate::Connection): column names plus cell values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<RowCells>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter().map(Ok).collect(),
        }
    }

    /// A result set with no columns and no rows (write statements).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Column names as reported by the backend, in cell order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowCells] {
        &self.rows
    }

    /// Rows in result order.
    pub fn iter(&self) -> std::slice::Iter<'_, RowCells> {
        self.rows.iter()
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(Ok(row));
    }

    /// Record a row that could not be read. Its position is kept.
    pub fn push_failed_row(&mut self, error: CellError) {
        self.rows.push(Err(error));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<RowCells>) {
        (self.columns, self.rows)
    }
}

/// Decodes rows of one result set into `T`.
///
/// Column names are resolved to field indexes once, through the cached
/// [`RecordSchema`]; every row is then decoded independently.
pub struct RowScanner<'a, T> {
    columns: &'a [String],
    indexes: Vec<Option<usize>>,
    schema: Arc<RecordSchema>,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record> RowScanner<'a, T> {
    pub fn new(columns: &'a [String]) -> Self {
        let schema = RecordSchema::of::<T>();
        let indexes = columns.iter().map(|c| schema.index_of(c)).collect();
        Self {
            columns,
            indexes,
            schema,
            _record: PhantomData,
        }
    }

    /// Decode one row into a fresh record.
    ///
    /// Fails on the first column with no matching field, on a cell count that
    /// does not match the column count, or on a value the field cannot hold.
    pub fn decode(&self, row: Vec<Value>) -> MunchResult<T> {
        if row.len() != self.columns.len() {
            return Err(MunchError::decode(
                "*",
                format!(
                    "row has {} cells but result set reports {} columns",
                    row.len(),
                    self.columns.len()
                ),
            ));
        }

        let mut record = T::default();
        for ((column, index), cell) in self.columns.iter().zip(&self.indexes).zip(row) {
            let index = match index {
                Some(i) => *i,
                None => self.schema.require_index(column)?,
            };
            record.set_field(index, cell)?;
        }
        Ok(record)
    }

    /// Decode every row, keeping successes and per-row failures apart.
    pub fn decode_all(&self, rows: Vec<RowCells>) -> ScanOutcome<T> {
        let mut outcome = ScanOutcome::default();
        for (i, row) in rows.into_iter().enumerate() {
            match row.map_err(MunchError::from).and_then(|cells| self.decode(cells)) {
                Ok(record) => outcome.records.push(record),
                Err(err) => outcome.failures.push(RowDecodeError::new(i, err)),
            }
        }
        outcome
    }
}

/// Result of decoding a whole result set.
#[derive(Debug)]
pub struct ScanOutcome<T> {
    /// Successfully decoded records, in row order.
    pub records: Vec<T>,
    /// Rows that failed to decode.
    pub failures: Vec<RowDecodeError>,
}

impl<T> Default for ScanOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> ScanOutcome<T> {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// All records, or [`MunchError::RowDecode`] if any row failed.
    pub fn into_result(self) -> MunchResult<Vec<T>> {
        if self.failures.is_empty() {
            Ok(self.records)
        } else {
            Err(MunchError::RowDecode(self.failures))
        }
    }
}

/// Decode a single row into a fresh `T`.
pub fn scan_row<T: Record>(columns: &[String], row: Vec<Value>) -> MunchResult<T> {
    RowScanner::<T>::new(columns).decode(row)
}

/// Decode a single row and replace `target` with it. `target` is untouched on failure.
pub fn scan_into<T: Record>(columns: &[String], row: Vec<Value>, target: &mut T) -> MunchResult<()> {
    *target = scan_row(columns, row)?;
    Ok(())
}

/// Decode every row of a result set.
pub fn scan_all<T: Record>(rows: RowSet) -> ScanOutcome<T> {
    let (columns, rows) = rows.into_parts();
    RowScanner::<T>::new(&columns).decode_all(rows)
}
