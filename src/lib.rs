pub mod algebra;
pub mod ast;
pub mod cell;
pub mod csv;
pub mod data_type;
pub mod database;
pub mod error;
pub mod parser;
pub mod row;
pub mod schema;
pub mod session;
pub mod table;
pub mod tokenizer;

pub use algebra::Comparator;
pub use cell::Cell;
pub use data_type::DataType;
pub use database::Database;
pub use error::{DbError, DbResult};
pub use row::Row;
pub use schema::Schema;
pub use session::{Outcome, Session, SessionConfig};
pub use table::{ColumnRef, Table};
