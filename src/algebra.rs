//! Relational operators over in-memory tables.
//!
//! Every function here is pure: it reads its input tables and builds a new
//! [Table]. Column arguments are already-resolved indices; name lookup and
//! table lookup happen in [crate::Database].

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;

use crate::cell::Cell;
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::table::Table;

/// The comparison used by [select].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparator {
    /// Tests `cell <op> value`.
    ///
    /// Equality is variant-exact cell equality and is checked first; the
    /// strict relations use [Cell::compare]. `Le` and `Ge` accept a row that
    /// passes either test.
    pub fn matches(self, cell: &Cell, value: &Cell) -> bool {
        let equal = || cell == value;
        let order = || cell.compare(value);
        match self {
            Self::Eq => equal(),
            Self::Lt => order() == Ordering::Less,
            Self::Gt => order() == Ordering::Greater,
            Self::Le => equal() || order() == Ordering::Less,
            Self::Ge => equal() || order() == Ordering::Greater,
        }
    }
}

impl FromStr for Comparator {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            "==" | "=" => Ok(Self::Eq),
            ">=" => Ok(Self::Ge),
            ">" => Ok(Self::Gt),
            other => Err(DbError::UnknownComparator(other.to_string())),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ge => ">=",
            Self::Gt => ">",
        })
    }
}

/// Header of a combined table: both headers concatenated, or none if either
/// side is headerless.
fn concat_header(left: &Table, right: &Table) -> Option<Vec<String>> {
    match (left.header(), right.header()) {
        (Some(l), Some(r)) => Some(l.iter().chain(r).cloned().collect()),
        _ => None,
    }
}

/// An empty table whose schema and header are `left`'s followed by `right`'s.
fn combined(left: &Table, right: &Table) -> Table {
    Table::with_optional_header(
        left.schema().concat(right.schema()),
        concat_header(left, right),
    )
}

fn push(table: &mut Table, row: Row) {
    let appended = table.append(row);
    debug_assert!(appended, "operator produced a row outside its schema");
}

/// Rows of `table` whose cell at `column` satisfies `comparator` against
/// `value`. Schema and header are kept.
pub fn select(
    table: &Table,
    column: usize,
    comparator: Comparator,
    value: &Cell,
) -> DbResult<Table> {
    if column >= table.col_size() {
        return Err(DbError::column(column));
    }
    let mut result = Table::with_optional_header(
        table.schema().clone(),
        table.header().map(<[String]>::to_vec),
    );
    for row in table.rows() {
        if comparator.matches(&row[column], value) {
            push(&mut result, row.clone());
        }
    }
    Ok(result)
}

/// The listed columns of `table`, in list order. Repeating an index
/// duplicates the column. An empty list keeps nothing: the result is
/// [Table::empty].
pub fn project(table: &Table, columns: &[usize]) -> DbResult<Table> {
    if columns.is_empty() {
        return Ok(Table::empty());
    }
    let schema = table.schema_of(columns)?;
    let header = table
        .header()
        .map(|header| columns.iter().map(|&i| header[i].clone()).collect());
    let mut result = Table::with_optional_header(schema, header);
    for row in table.rows() {
        push(&mut result, columns.iter().map(|&i| row[i].clone()).collect());
    }
    Ok(result)
}

/// Cartesian product: every row of `left` followed by every row of `right`.
///
/// If exactly one side has no rows the other side is returned as it is,
/// not an empty table of the combined schema. If both are empty the result
/// is an empty table of the combined schema.
pub fn product(left: &Table, right: &Table) -> Table {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => return combined(left, right),
        (true, false) => return right.clone(),
        (false, true) => return left.clone(),
        (false, false) => {}
    }
    let mut result = combined(left, right);
    for l in left.rows() {
        for r in right.rows() {
            push(&mut result, l.concat(r));
        }
    }
    result
}

/// Keeps the pairs whose two columns share a type. Pairs mixing a numeric
/// and a text column never constrain a join.
fn comparable_pairs(
    left: &Table,
    right: &Table,
    pairs: &[(usize, usize)],
) -> DbResult<Vec<(usize, usize)>> {
    let mut kept = Vec::with_capacity(pairs.len());
    for &(l, r) in pairs {
        if left.schema_at(l)? == right.schema_at(r)? {
            kept.push((l, r));
        }
    }
    Ok(kept)
}

fn rows_match(l: &Row, r: &Row, pairs: &[(usize, usize)]) -> bool {
    pairs.iter().all(|&(lc, rc)| l[lc] == r[rc])
}

/// Equi-join: the product of `left` and `right` restricted to row pairs
/// whose cells are equal on every column pair.
pub fn join(left: &Table, right: &Table, pairs: &[(usize, usize)]) -> DbResult<Table> {
    let pairs = comparable_pairs(left, right, pairs)?;
    let mut result = combined(left, right);
    for l in left.rows() {
        for r in right.rows() {
            if rows_match(l, r, &pairs) {
                push(&mut result, l.concat(r));
            }
        }
    }
    Ok(result)
}

/// [join], followed by every row of either side that matched nothing,
/// padded with a null row shaped like the other side.
///
/// Unmatched left rows come first, then unmatched right rows, each in their
/// original order.
pub fn outer_join(left: &Table, right: &Table, pairs: &[(usize, usize)]) -> DbResult<Table> {
    let pairs = comparable_pairs(left, right, pairs)?;
    let mut result = combined(left, right);
    let mut left_matched = bitvec![0; left.len()];
    let mut right_matched = bitvec![0; right.len()];

    for (i, l) in left.rows().iter().enumerate() {
        for (j, r) in right.rows().iter().enumerate() {
            if rows_match(l, r, &pairs) {
                left_matched.set(i, true);
                right_matched.set(j, true);
                push(&mut result, l.concat(r));
            }
        }
    }

    let left_nulls = left.schema().null_row();
    let right_nulls = right.schema().null_row();
    for i in left_matched.iter_zeros() {
        push(&mut result, left.rows()[i].concat(&right_nulls));
    }
    for j in right_matched.iter_zeros() {
        push(&mut result, left_nulls.concat(&right.rows()[j]));
    }
    Ok(result)
}

/// Column names as [Table::header_at] reports them: `""` for every column
/// of a headerless table.
fn column_names(table: &Table) -> Vec<&str> {
    match table.header() {
        Some(header) => header.iter().map(String::as_str).collect(),
        None => vec![""; table.col_size()],
    }
}

/// Every `(i, j)` where column `i` of `left` and column `j` of `right` have
/// the same header name.
///
/// Headerless columns are all named `""`, so two headerless tables pair
/// every column with every other; [join] then drops the mixed-type pairs.
pub fn natural_pairs(left: &Table, right: &Table) -> Vec<(usize, usize)> {
    let right_names = column_names(right);
    let mut pairs = Vec::new();
    for (i, l) in column_names(left).into_iter().enumerate() {
        for (j, r) in right_names.iter().enumerate() {
            if l == *r {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Joins on every pair of identically named columns, as an inner or outer
/// join. If the tables share no column name the result is [Table::empty].
pub fn natural_join(left: &Table, right: &Table, outer: bool) -> DbResult<Table> {
    let pairs = natural_pairs(left, right);
    if pairs.is_empty() {
        return Ok(Table::empty());
    }
    if outer {
        outer_join(left, right, &pairs)
    } else {
        join(left, right, &pairs)
    }
}

/// Rows of `child` whose cell at `child_column` equals no cell of
/// `parent` at `parent_column`. An empty result means every row of `child`
/// references `parent`.
pub fn unreferenced(
    child: &Table,
    child_column: usize,
    parent: &Table,
    parent_column: usize,
) -> DbResult<Table> {
    if child_column >= child.col_size() {
        return Err(DbError::column(child_column));
    }
    if parent_column >= parent.col_size() {
        return Err(DbError::column(parent_column));
    }
    let referenced: HashSet<&Cell> = parent.rows().iter().map(|r| &r[parent_column]).collect();

    let mut result = Table::with_optional_header(
        child.schema().clone(),
        child.header().map(<[String]>::to_vec),
    );
    for row in child.rows() {
        if !referenced.contains(&row[child_column]) {
            push(&mut result, row.clone());
        }
    }
    Ok(result)
}
