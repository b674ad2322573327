use std::fmt;
use std::ops::Index;

use allocative::Allocative;

use crate::cell::Cell;
use crate::error::{DbError, DbResult};
use crate::schema::Schema;

/// An ordered sequence of cells.
///
/// A row carries no schema of its own; [Row::conforms_to] checks it against
/// one before a table accepts it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Allocative)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Appends one cell to the end of the row.
    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Appends a sequence of cells, in order.
    pub fn extend(&mut self, cells: impl IntoIterator<Item = Cell>) {
        self.cells.extend(cells);
    }

    /// Appends copies of every cell of `other`.
    pub fn append_row(&mut self, other: &Row) {
        self.cells.extend_from_slice(&other.cells);
    }

    /// `self` followed by `other`, as a new row.
    pub fn concat(&self, other: &Row) -> Row {
        let mut row = Row::with_capacity(self.len() + other.len());
        row.append_row(self);
        row.append_row(other);
        row
    }

    /// Replaces the cell at `index` and returns the previous one.
    ///
    /// Returns `None` and leaves the row untouched if `index` is out of range.
    pub fn replace(&mut self, index: usize, cell: Cell) -> Option<Cell> {
        self.cells
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, cell))
    }

    /// Reads the cell at `index`.
    ///
    /// # Errors
    /// Returns [DbError::ColumnOutOfRange] if `index >= len`.
    pub fn get(&self, index: usize) -> DbResult<&Cell> {
        self.cells.get(index).ok_or_else(|| DbError::column(index))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Returns `true` if the row has one cell per schema column and every
    /// cell's variant matches its column's flag.
    pub fn conforms_to(&self, schema: &Schema) -> bool {
        self.len() == schema.len()
            && self
                .cells
                .iter()
                .zip(schema.flags().iter().by_vals())
                .all(|(cell, numeric)| cell.is_numeric() == numeric)
    }
}

impl Index<usize> for Row {
    type Output = Cell;

    fn index(&self, index: usize) -> &Cell {
        &self.cells[index]
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl fmt::Display for Row {
    /// Comma-joined text form of every cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}
