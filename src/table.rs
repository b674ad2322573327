use std::fmt;

use allocative::Allocative;

use crate::cell::Cell;
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::schema::Schema;

/// A reference to a table column, either by position or by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// An ordered collection of rows sharing one schema and an optional header.
///
/// Every stored row conforms to the schema, and the header, when present,
/// has one name per column. The schema never changes once the table exists;
/// rows are only ever appended or reordered as a whole by [Table::sort_by].
#[derive(Debug, Clone, Default, PartialEq, Eq, Allocative)]
pub struct Table {
    schema: Schema,
    header: Option<Vec<String>>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty, headerless table.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            header: None,
            rows: Vec::new(),
        }
    }

    /// Creates an empty table with a header.
    ///
    /// The header is kept only if it has one name per schema column;
    /// otherwise the table is headerless.
    pub fn with_header(schema: Schema, header: Vec<String>) -> Self {
        let mut table = Self::new(schema);
        table.set_header(header);
        table
    }

    /// Creates an empty table with the given schema and an optional header.
    pub fn with_optional_header(schema: Schema, header: Option<Vec<String>>) -> Self {
        match header {
            Some(header) => Self::with_header(schema, header),
            None => Self::new(schema),
        }
    }

    /// The zero-column, zero-row table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a row if it conforms to the schema.
    ///
    /// Returns `false` and leaves the table unchanged otherwise.
    ///
    /// # Example
    /// ```
    /// # use reldb::{Cell, DataType, Row, Schema, Table};
    /// let mut table = Table::new(Schema::from_types(&[DataType::Int]));
    /// assert!(table.append(Row::from(vec![Cell::int(1)])));
    /// assert!(!table.append(Row::from(vec![Cell::text("1")])));
    /// assert_eq!(table.len(), 1);
    /// ```
    #[must_use]
    pub fn append(&mut self, row: Row) -> bool {
        if !row.conforms_to(&self.schema) {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Appends every row, or none of them if any row fails to conform.
    #[must_use]
    pub fn append_all(&mut self, rows: Vec<Row>) -> bool {
        if !rows.iter().all(|row| row.conforms_to(&self.schema)) {
            return false;
        }
        self.rows.extend(rows);
        true
    }

    // --- Header ---

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Replaces the header.
    ///
    /// An empty header removes the current one. A header whose length
    /// differs from the column count is rejected and `false` is returned.
    pub fn set_header(&mut self, header: Vec<String>) -> bool {
        if header.is_empty() {
            self.header = None;
            return true;
        }
        if header.len() != self.col_size() {
            return false;
        }
        self.header = Some(header);
        true
    }

    pub fn remove_header(&mut self) {
        self.header = None;
    }

    /// Name of the column at `index`, or `""` if the table is headerless.
    ///
    /// # Errors
    /// Returns [DbError::ColumnOutOfRange] if `index >= col_size`.
    pub fn header_at(&self, index: usize) -> DbResult<&str> {
        if index >= self.col_size() {
            return Err(DbError::column(index));
        }
        Ok(self
            .header
            .as_ref()
            .map(|header| header[index].as_str())
            .unwrap_or(""))
    }

    /// Position of the first column called `name`.
    ///
    /// # Errors
    /// Returns [DbError::ColumnOutOfRange] if no column has that name or the
    /// table has no header.
    pub fn column_index_of(&self, name: &str) -> DbResult<usize> {
        self.header
            .as_ref()
            .and_then(|header| header.iter().position(|h| h == name))
            .ok_or_else(|| DbError::column(name))
    }

    /// Resolves a column reference to a valid column index.
    pub fn resolve(&self, column: &ColumnRef) -> DbResult<usize> {
        match column {
            ColumnRef::Index(i) if *i < self.col_size() => Ok(*i),
            ColumnRef::Index(i) => Err(DbError::column(i)),
            ColumnRef::Name(name) => self.column_index_of(name),
        }
    }

    pub fn resolve_all(&self, columns: &[ColumnRef]) -> DbResult<Vec<usize>> {
        columns.iter().map(|c| self.resolve(c)).collect()
    }

    // --- Schema ---

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of columns.
    pub fn col_size(&self) -> usize {
        self.schema.len()
    }

    /// Whether the column at `index` is numeric.
    pub fn schema_at(&self, index: usize) -> DbResult<bool> {
        self.schema.is_numeric(index)
    }

    /// The schema of the listed columns, failing on the first bad index.
    pub fn schema_of(&self, indices: &[usize]) -> DbResult<Schema> {
        self.schema.project(indices)
    }

    // --- Rows ---

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_at(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// The cell at (`row`, `column`).
    ///
    /// # Errors
    /// Returns [DbError::RowOutOfRange] for a bad row and
    /// [DbError::ColumnOutOfRange] for a bad column.
    pub fn cell_at(&self, row: usize, column: usize) -> DbResult<&Cell> {
        self.rows
            .get(row)
            .ok_or(DbError::RowOutOfRange {
                index: row,
                len: self.len(),
            })?
            .get(column)
    }

    /// Sorts the rows in place by ascending [Cell::compare] order on
    /// `column`. Rows with equal keys keep their relative order.
    ///
    /// # Errors
    /// Returns [DbError::ColumnOutOfRange] if the column does not exist; the
    /// table is left untouched.
    pub fn sort_by(&mut self, column: usize) -> DbResult<&mut Self> {
        if column >= self.col_size() {
            return Err(DbError::column(column));
        }
        // rows conform to the schema, so every row has `column`
        self.rows.sort_by(|a, b| a[column].compare(&b[column]));
        Ok(self)
    }

    /// A sorted copy of this table; `self` is not modified.
    pub fn sorted_by(&self, column: usize) -> DbResult<Table> {
        let mut sorted = self.clone();
        sorted.sort_by(column)?;
        Ok(sorted)
    }

    /// Bytes of heap memory owned by this table.
    pub fn footprint(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }
}

impl fmt::Display for Table {
    /// Header line first if present, then one line per row. Every line is
    /// newline-terminated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(header) = &self.header {
            writeln!(f, "{}", header.join(","))?;
        }
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
