//! The line-oriented text format tables are loaded from and saved to.
//!
//! One record per line, fields separated by commas, no quoting. A headed
//! file starts with a line of column names.

use std::io::{BufRead, Write};

use crate::cell::Cell;
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::schema::Schema;
use crate::table::Table;

/// Reads a whole table against `schema`.
///
/// Any record whose field count differs from the schema, any numeric field
/// that is not an integer, and any read failure aborts the read with a
/// [DbError::Load] naming `table`.
pub fn read_table<R: BufRead>(
    table: &str,
    schema: &Schema,
    headed: bool,
    source: R,
) -> DbResult<Table> {
    let mut result = Table::new(schema.clone());
    let mut lines = source.lines().enumerate();

    if headed {
        if let Some((_, line)) = lines.next() {
            let line = line.map_err(|e| DbError::load(table, e.to_string()))?;
            let header: Vec<String> = line.split(',').map(str::to_string).collect();
            if header.len() != schema.len() {
                return Err(DbError::load(
                    table,
                    format!(
                        "header has {} columns but the table has {}",
                        header.len(),
                        schema.len()
                    ),
                ));
            }
            result.set_header(header);
        }
    }

    for (number, line) in lines {
        let line = line.map_err(|e| DbError::load(table, e.to_string()))?;
        let row = parse_record(&line, schema)
            .map_err(|reason| DbError::load(table, format!("line {}: {reason}", number + 1)))?;
        if !result.append(row) {
            return Err(DbError::load(
                table,
                format!("line {}: contents differ from the definition", number + 1),
            ));
        }
    }

    Ok(result)
}

/// Splits one record and parses each field per its column type.
pub fn parse_record(line: &str, schema: &Schema) -> Result<Row, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != schema.len() {
        return Err(format!(
            "{} fields but the table has {} columns",
            fields.len(),
            schema.len()
        ));
    }
    fields
        .into_iter()
        .zip(schema.types())
        .map(|(field, data_type)| Cell::parse(field, data_type).map_err(|e| e.to_string()))
        .collect()
}

/// Writes the table's text rendering: header line if present, then rows.
pub fn write_table<W: Write>(table: &Table, mut sink: W) -> DbResult<()> {
    write!(sink, "{table}")?;
    sink.flush()?;
    Ok(())
}
