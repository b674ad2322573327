use crate::{ColumnRef, Comparator, DataType};

/// One parsed command line.
#[derive(Debug, PartialEq)]
pub enum Command {
    Define(Define),
    Load(Load),
    Save(Save),
    Print(String),
    Check(Check),
    /// `NAME = <operator>(...)`
    Assign(Assign),
    Exit,
}

#[derive(Debug, PartialEq)]
pub struct Define {
    pub name: String,
    pub types: Vec<DataType>,
}

#[derive(Debug, PartialEq)]
pub struct Load {
    pub headed: bool,
    pub table: String,
    pub file: String,
}

#[derive(Debug, PartialEq)]
pub struct Save {
    pub table: String,
    pub file: String,
}

/// `check CHILD(col) references PARENT(col)`
#[derive(Debug, PartialEq)]
pub struct Check {
    pub child: String,
    pub child_column: ColumnRef,
    pub parent: String,
    pub parent_column: ColumnRef,
}

#[derive(Debug, PartialEq)]
pub struct Assign {
    pub target: String,
    pub expr: Expr,
}

/// The right-hand side of an assignment: one relational operator applied to
/// stored tables.
#[derive(Debug, PartialEq)]
pub enum Expr {
    Rows {
        table: String,
        column: ColumnRef,
        comparator: Comparator,
        literal: String,
    },
    Columns {
        table: String,
        columns: Vec<ColumnRef>,
    },
    Product {
        left: String,
        right: String,
    },
    Join {
        outer: bool,
        left: String,
        right: String,
        pairs: Vec<(ColumnRef, ColumnRef)>,
    },
    NaturalJoin {
        outer: bool,
        left: String,
        right: String,
    },
    OrderBy {
        table: String,
        column: ColumnRef,
    },
}
