use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    algebra::{self, Comparator},
    cell::Cell,
    csv,
    data_type::DataType,
    error::{DbError, DbResult},
    schema::Schema,
    table::{ColumnRef, Table},
};

/// The relational engine for one session.
///
/// It owns every named table and evaluates the relational operators over
/// them. Operators look tables up by name, resolve column references and
/// return a brand new [Table]; storing the result under a name is up to the
/// caller (see [Database::insert]).
#[derive(Debug, Default)]
pub struct Database {
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self {
            tables: HashMap::default(),
        }
    }

    /// Defines (or redefines) an empty, headerless table from type tags.
    ///
    /// # Errors
    /// Returns [DbError::UnknownType] if a tag is neither `int` nor `string`;
    /// nothing is stored in that case.
    ///
    /// # Example
    /// ```
    /// use reldb::Database;
    /// let mut db = Database::new();
    /// db.define("emp", &["int", "string"]).unwrap();
    /// assert_eq!(db.table("emp").unwrap().col_size(), 2);
    /// ```
    pub fn define<S: AsRef<str>>(&mut self, name: &str, tags: &[S]) -> DbResult<()> {
        let schema = Schema::from_tags(tags)?;
        self.define_schema(name, schema);
        Ok(())
    }

    /// Defines (or redefines) an empty, headerless table from column types.
    pub fn define_types(&mut self, name: &str, types: &[DataType]) {
        self.define_schema(name, Schema::from_types(types));
    }

    fn define_schema(&mut self, name: &str, schema: Schema) {
        info!(table = name, columns = schema.len(), "defined table");
        self.tables.insert(name.to_string(), Table::new(schema));
    }

    /// Retrieves a table by name.
    ///
    /// # Errors
    /// Returns [DbError::NoSuchTable] if the name is not defined.
    pub fn table(&self, name: &str) -> DbResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::NoSuchTable(name.to_string()))
    }

    /// Retrieves a table by name for in-place changes such as appends or
    /// sorting.
    pub fn table_mut(&mut self, name: &str) -> DbResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DbError::NoSuchTable(name.to_string()))
    }

    /// Stores `table` under `name`, returning the table it replaces.
    pub fn insert(&mut self, name: &str, table: Table) -> Option<Table> {
        self.tables.insert(name.to_string(), table)
    }

    /// Removes a table from the database by its name.
    pub fn remove(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Drops every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns a list of all table names currently stored in the database.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    // --- Loading and saving ---

    /// Replaces the rows of table `name` with the records read from
    /// `source`, keeping its schema. Returns the number of rows loaded.
    ///
    /// The new table is built on the side and swapped in only once every
    /// record has been read and validated; on any failure the stored table
    /// is left exactly as it was.
    ///
    /// # Errors
    /// [DbError::NoSuchTable] if `name` was never defined, [DbError::Load]
    /// for a header or record that does not fit the schema.
    ///
    /// # Example
    /// ```
    /// use reldb::Database;
    /// let mut db = Database::new();
    /// db.define("emp", &["int", "string"]).unwrap();
    ///
    /// let rows = db.load(true, "emp", "id,name\n1,ann\n2,bo\n".as_bytes()).unwrap();
    /// assert_eq!(rows, 2);
    /// assert!(db.load(false, "emp", "x,ann\n".as_bytes()).is_err());
    /// assert_eq!(db.table("emp").unwrap().len(), 2);
    /// ```
    pub fn load<R: BufRead>(&mut self, headed: bool, name: &str, source: R) -> DbResult<usize> {
        let schema = self.table(name)?.schema().clone();
        let table = csv::read_table(name, &schema, headed, source).inspect_err(|e| {
            warn!(table = name, error = %e, "load aborted");
        })?;

        let rows = table.len();
        info!(table = name, rows, headed, "loaded table");
        self.tables.insert(name.to_string(), table);
        Ok(rows)
    }

    /// [Database::load] from a file. A missing file is a load failure.
    pub fn load_file(
        &mut self,
        headed: bool,
        name: &str,
        path: impl AsRef<Path>,
    ) -> DbResult<usize> {
        let path = path.as_ref();
        // an undefined table is reported before the file is touched
        self.table(name)?;
        let file = File::open(path).map_err(|e| {
            let reason = match e.kind() {
                io::ErrorKind::NotFound => format!("the file {} does not exist", path.display()),
                _ => format!("{}: {e}", path.display()),
            };
            warn!(table = name, %reason, "load aborted");
            DbError::load(name, reason)
        })?;
        self.load(headed, name, BufReader::new(file))
    }

    /// Writes the text rendering of table `name` to `sink`.
    pub fn save<W: Write>(&self, name: &str, sink: W) -> DbResult<()> {
        csv::write_table(self.table(name)?, sink)
    }

    /// Writes table `name` to a file, creating or truncating it.
    pub fn save_file(&self, name: &str, path: impl AsRef<Path>) -> DbResult<()> {
        let table = self.table(name)?;
        let path = path.as_ref();
        let file = File::create(path)?;
        csv::write_table(table, BufWriter::new(file))?;
        info!(table = name, path = %path.display(), rows = table.len(), "saved table");
        Ok(())
    }

    /// The text rendering of table `name`.
    pub fn print(&self, name: &str) -> DbResult<String> {
        Ok(self.table(name)?.to_string())
    }

    // --- Relational operators ---

    /// Selection: the rows of `table` whose cell in `column` satisfies
    /// `comparator` against `literal`.
    ///
    /// The literal is read as an integer if the column is numeric and as
    /// text otherwise.
    ///
    /// # Example
    /// ```
    /// use reldb::{ColumnRef, Comparator, Database};
    /// let mut db = Database::new();
    /// db.define("t", &["int", "string"]).unwrap();
    /// db.load(false, "t", "1,a\n2,b\n".as_bytes()).unwrap();
    ///
    /// let result = db.rows("t", &ColumnRef::Index(0), Comparator::Gt, "1").unwrap();
    /// assert_eq!(result.to_string(), "2,b\n");
    /// ```
    pub fn rows(
        &self,
        table: &str,
        column: &ColumnRef,
        comparator: Comparator,
        literal: &str,
    ) -> DbResult<Table> {
        let source = self.table(table)?;
        let column = source.resolve(column)?;
        let value = Cell::parse(literal.trim(), source.schema().data_type(column)?)?;
        let result = algebra::select(source, column, comparator, &value)?;
        log_result("rows", &result);
        Ok(result)
    }

    /// Projection onto the referenced columns, in order.
    pub fn columns(&self, table: &str, columns: &[ColumnRef]) -> DbResult<Table> {
        let source = self.table(table)?;
        let indices = source.resolve_all(columns)?;
        let result = algebra::project(source, &indices)?;
        log_result("columns", &result);
        Ok(result)
    }

    /// Cartesian product; see [algebra::product] for the empty-input rules.
    pub fn product(&self, left: &str, right: &str) -> DbResult<Table> {
        let result = algebra::product(self.table(left)?, self.table(right)?);
        log_result("product", &result);
        Ok(result)
    }

    /// Equi-join on column pairs, each side resolved against its own table.
    pub fn join(
        &self,
        left: &str,
        right: &str,
        pairs: &[(ColumnRef, ColumnRef)],
    ) -> DbResult<Table> {
        let (l, r, pairs) = self.resolve_pairs(left, right, pairs)?;
        let result = algebra::join(l, r, &pairs)?;
        log_result("join", &result);
        Ok(result)
    }

    /// Equi-join plus the unmatched rows of both sides, null-padded.
    pub fn outer_join(
        &self,
        left: &str,
        right: &str,
        pairs: &[(ColumnRef, ColumnRef)],
    ) -> DbResult<Table> {
        let (l, r, pairs) = self.resolve_pairs(left, right, pairs)?;
        let result = algebra::outer_join(l, r, &pairs)?;
        log_result("outer join", &result);
        Ok(result)
    }

    /// Join on every pair of identically named columns.
    pub fn natural_join(&self, left: &str, right: &str, outer: bool) -> DbResult<Table> {
        let result = algebra::natural_join(self.table(left)?, self.table(right)?, outer)?;
        log_result("natural join", &result);
        Ok(result)
    }

    /// A copy of `table` sorted on `column`; the stored table is untouched.
    pub fn order_by(&self, table: &str, column: &ColumnRef) -> DbResult<Table> {
        let source = self.table(table)?;
        let result = source.sorted_by(source.resolve(column)?)?;
        log_result("order by", &result);
        Ok(result)
    }

    /// Referential check of `child.child_column` against
    /// `parent.parent_column`: returns the child rows whose value appears
    /// nowhere in the parent column. Empty means full coverage.
    pub fn check(
        &self,
        child: &str,
        child_column: &ColumnRef,
        parent: &str,
        parent_column: &ColumnRef,
    ) -> DbResult<Table> {
        let c = self.table(child)?;
        let p = self.table(parent)?;
        let result =
            algebra::unreferenced(c, c.resolve(child_column)?, p, p.resolve(parent_column)?)?;
        debug!(child, parent, unreferenced = result.len(), "referential check");
        Ok(result)
    }

    fn resolve_pairs(
        &self,
        left: &str,
        right: &str,
        pairs: &[(ColumnRef, ColumnRef)],
    ) -> DbResult<(&Table, &Table, Vec<(usize, usize)>)> {
        let l = self.table(left)?;
        let r = self.table(right)?;
        let resolved = pairs
            .iter()
            .map(|(lc, rc)| -> DbResult<(usize, usize)> { Ok((l.resolve(lc)?, r.resolve(rc)?)) })
            .collect::<DbResult<Vec<_>>>()?;
        Ok((l, r, resolved))
    }
}

fn log_result(operator: &str, table: &Table) {
    debug!(
        operator,
        rows = table.len(),
        columns = table.col_size(),
        bytes = table.footprint(),
        "operator result"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    fn db_with_emp() -> Database {
        let mut db = Database::new();
        db.define("emp", &["int", "string", "int"]).unwrap();
        db.load(
            true,
            "emp",
            "id,name,dept\n3,carol,20\n1,alice,10\n2,bob,30\n".as_bytes(),
        )
        .unwrap();
        db.define("dept", &["int", "string"]).unwrap();
        db.load(true, "dept", "dept,title\n10,ops\n20,dev\n".as_bytes())
            .unwrap();
        db
    }

    #[test]
    fn test_define_and_remove() {
        let mut db = Database::new();

        db.define("users", &["INT", "String"]).unwrap();
        let table = db.table("users").unwrap();
        assert_eq!(table.col_size(), 2);
        assert!(table.is_empty());
        assert!(!table.has_header());

        assert!(db.remove("users").is_some());
        assert!(matches!(db.table("users"), Err(DbError::NoSuchTable(_))));
        assert!(db.remove("users").is_none());
    }

    #[test]
    fn test_define_bad_tag() {
        let mut db = Database::new();
        assert!(matches!(
            db.define("users", &["int", "float"]),
            Err(DbError::UnknownType(_))
        ));
        assert!(!db.contains("users"));
    }

    #[test]
    fn test_redefine_replaces() {
        let mut db = db_with_emp();
        db.define_types("emp", &[DataType::Text]);
        let table = db.table("emp").unwrap();
        assert_eq!(table.col_size(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_list_tables_and_clear() {
        let mut db = db_with_emp();

        let mut tables = db.list_tables();
        tables.sort();
        assert_eq!(tables, vec!["dept", "emp"]);

        db.clear();
        assert!(db.list_tables().is_empty());
    }

    #[test]
    fn test_load_replaces_rows() {
        let mut db = db_with_emp();
        let rows = db.load(false, "emp", "9,zed,10\n".as_bytes()).unwrap();

        assert_eq!(rows, 1);
        let table = db.table("emp").unwrap();
        assert!(!table.has_header());
        assert_eq!(table.to_string(), "9,zed,10\n");
    }

    #[test]
    fn test_failed_load_keeps_table() {
        let mut db = db_with_emp();
        let before = db.table("emp").unwrap().clone();

        // bad numeric field on the last line
        assert!(db.load(false, "emp", "4,dan,10\n5,eve,x\n".as_bytes()).is_err());
        // header width mismatch
        assert!(db.load(true, "emp", "id,name\n4,dan,10\n".as_bytes()).is_err());
        // field count mismatch
        assert!(db.load(false, "emp", "4,dan\n".as_bytes()).is_err());

        assert_eq!(db.table("emp").unwrap(), &before);
    }

    #[test]
    fn test_load_undefined_table() {
        let mut db = Database::new();
        assert!(matches!(
            db.load(false, "ghost", "1\n".as_bytes()),
            Err(DbError::NoSuchTable(_))
        ));
        assert!(matches!(
            db.load_file(false, "ghost", "nowhere.csv"),
            Err(DbError::NoSuchTable(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emp.csv");

        let mut db = db_with_emp();
        db.save_file("emp", &path).unwrap();

        db.define("copy", &["int", "string", "int"]).unwrap();
        assert_eq!(db.load_file(true, "copy", &path).unwrap(), 3);
        assert_eq!(db.table("copy").unwrap(), db.table("emp").unwrap());

        let missing = db.load_file(true, "copy", dir.path().join("missing.csv"));
        assert!(matches!(missing, Err(DbError::Load { .. })));
        assert_eq!(db.table("copy").unwrap().len(), 3);
    }

    #[test]
    fn test_save_and_print() {
        let db = db_with_emp();
        let mut out = Vec::new();
        db.save("dept", &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "dept,title\n10,ops\n20,dev\n");
        assert_eq!(db.print("dept").unwrap(), "dept,title\n10,ops\n20,dev\n");
        assert!(matches!(db.print("nope"), Err(DbError::NoSuchTable(_))));
    }

    #[test]
    fn test_rows_by_name() {
        let db = db_with_emp();

        let result = db.rows("emp", &"dept".into(), Comparator::Le, "20").unwrap();
        assert_eq!(result.to_string(), "id,name,dept\n3,carol,20\n1,alice,10\n");

        let result = db.rows("emp", &"name".into(), Comparator::Eq, "bob").unwrap();
        assert_eq!(result.len(), 1);

        assert!(matches!(
            db.rows("emp", &"age".into(), Comparator::Eq, "1"),
            Err(DbError::ColumnOutOfRange(_))
        ));
        assert!(matches!(
            db.rows("emp", &ColumnRef::Index(0), Comparator::Eq, "one"),
            Err(DbError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_columns() {
        let db = db_with_emp();

        let result = db.columns("emp", &["name".into(), ColumnRef::Index(0)]).unwrap();
        assert_eq!(result.to_string(), "name,id\ncarol,3\nalice,1\nbob,2\n");

        assert!(db.columns("emp", &[ColumnRef::Index(3)]).is_err());
        assert!(matches!(
            db.columns("nobody", &[ColumnRef::Index(0)]),
            Err(DbError::NoSuchTable(_))
        ));
    }

    #[test]
    fn test_product() {
        let db = db_with_emp();
        let result = db.product("emp", "dept").unwrap();

        assert_eq!(result.len(), 6);
        assert_eq!(result.col_size(), 5);
        assert!(matches!(
            db.product("emp", "nobody"),
            Err(DbError::NoSuchTable(_))
        ));
    }

    #[test]
    fn test_join_by_names() {
        let db = db_with_emp();
        let result = db
            .join("emp", "dept", &[("dept".into(), "dept".into())])
            .unwrap();

        assert_eq!(
            result.to_string(),
            "id,name,dept,dept,title\n3,carol,20,20,dev\n1,alice,10,10,ops\n"
        );
    }

    #[test]
    fn test_outer_and_natural_join() {
        let db = db_with_emp();

        let outer = db
            .outer_join("emp", "dept", &[(ColumnRef::Index(2), ColumnRef::Index(0))])
            .unwrap();
        assert_eq!(outer.len(), 3);
        assert_eq!(outer.rows()[2].to_string(), "2,bob,30,,");

        let natural = db.natural_join("emp", "dept", true).unwrap();
        assert_eq!(natural, outer);

        let inner = db.natural_join("emp", "dept", false).unwrap();
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_order_by_keeps_source() {
        let db = db_with_emp();
        let sorted = db.order_by("emp", &"name".into()).unwrap();

        assert_eq!(sorted.cell_at(0, 1).unwrap(), &Cell::text("alice"));
        assert_eq!(db.table("emp").unwrap().cell_at(0, 1).unwrap(), &Cell::text("carol"));

        assert!(db.order_by("emp", &ColumnRef::Index(5)).is_err());
    }

    #[test]
    fn test_sort_stored_table_in_place() {
        let mut db = db_with_emp();
        db.table_mut("emp").unwrap().sort_by(0).unwrap();

        let first = db.table("emp").unwrap().row_at(0).unwrap();
        assert_eq!(first, &Row::from(vec![Cell::int(1), Cell::text("alice"), Cell::int(10)]));
    }

    #[test]
    fn test_check() {
        let db = db_with_emp();

        let missing = db.check("emp", &"dept".into(), "dept", &"dept".into()).unwrap();
        assert_eq!(missing.to_string(), "id,name,dept\n2,bob,30\n");

        let itself = db.check("emp", &ColumnRef::Index(0), "emp", &ColumnRef::Index(0)).unwrap();
        assert!(itself.is_empty());
    }

    #[test]
    fn test_insert_result() {
        let mut db = db_with_emp();
        let result = db.product("emp", "dept").unwrap();

        assert!(db.insert("both", result).is_none());
        assert_eq!(db.table("both").unwrap().len(), 6);
    }
}
