use allocative::Allocative;
use bitvec::prelude::*;

use crate::cell::Cell;
use crate::data_type::DataType;
use crate::error::{DbError, DbResult};
use crate::row::Row;

/// The column types of a table, fixed for the table's lifetime.
///
/// Stored as a compact bit-vector where a set bit means the column at that
/// position holds [Cell::Numeric] values and a cleared bit means
/// [Cell::Text] values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Allocative)]
pub struct Schema {
    #[allocative(skip)]
    flags: BitVec,
}

impl Schema {
    pub fn new(flags: BitVec) -> Self {
        Self { flags }
    }

    /// The zero-column schema.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_types(types: &[DataType]) -> Self {
        Self {
            flags: types.iter().map(|t| t.is_numeric()).collect(),
        }
    }

    /// Builds a schema from declaration tags such as `["int", "string"]`.
    ///
    /// # Errors
    /// Returns [DbError::UnknownType] on the first unrecognised tag.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> DbResult<Self> {
        let types = tags
            .iter()
            .map(|tag| tag.as_ref().parse::<DataType>())
            .collect::<DbResult<Vec<_>>>()?;
        Ok(Self::from_types(&types))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> &BitSlice {
        &self.flags
    }

    /// Whether the column at `index` is numeric.
    ///
    /// # Errors
    /// Returns [DbError::ColumnOutOfRange] if `index` is past the last column.
    pub fn is_numeric(&self, index: usize) -> DbResult<bool> {
        self.flags
            .get(index)
            .map(|flag| *flag)
            .ok_or_else(|| DbError::column(index))
    }

    pub fn data_type(&self, index: usize) -> DbResult<DataType> {
        self.is_numeric(index).map(DataType::from_flag)
    }

    /// Iterates over the column types in order.
    pub fn types(&self) -> impl Iterator<Item = DataType> + '_ {
        self.flags.iter().by_vals().map(DataType::from_flag)
    }

    /// The schema of the listed columns, in list order. Repeated indices
    /// repeat the column.
    pub fn project(&self, indices: &[usize]) -> DbResult<Self> {
        let flags = indices
            .iter()
            .map(|&i| self.is_numeric(i))
            .collect::<DbResult<BitVec>>()?;
        Ok(Self { flags })
    }

    /// This schema followed by `other`.
    pub fn concat(&self, other: &Schema) -> Self {
        let mut flags = self.flags.clone();
        flags.extend_from_bitslice(&other.flags);
        Self { flags }
    }

    /// A row of nulls shaped like this schema: one numeric null per numeric
    /// column and one text null per text column.
    pub fn null_row(&self) -> Row {
        self.types().map(Cell::null).collect()
    }
}
