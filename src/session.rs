//! Line-at-a-time command execution against one [Database].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::{Assign, Check, Command, Expr, Load, Save};
use crate::database::Database;
use crate::error::DbResult;
use crate::parser::Parser;
use crate::table::Table;

/// Settings for a [Session].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Relative `load`/`save` file names resolve against this directory.
    pub data_dir: PathBuf,
    /// Store assignment results that have no rows instead of dropping them.
    pub keep_empty_results: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            keep_empty_results: false,
        }
    }
}

/// What executing one command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show the user.
    Message(String),
    /// The session was asked to end.
    Exit,
}

/// An interactive session: a database plus the settings commands run with.
///
/// # Example
/// ```
/// use reldb::{Outcome, Session};
/// let mut session = Session::default();
/// assert_eq!(
///     session.execute("define t (int, string)").unwrap(),
///     Outcome::Message("t is now defined.".into())
/// );
/// assert_eq!(session.execute("exit").unwrap(), Outcome::Exit);
/// ```
#[derive(Debug, Default)]
pub struct Session {
    db: Database,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            db: Database::new(),
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Parses and runs one command line.
    ///
    /// A failing command leaves every stored table as it was.
    pub fn execute(&mut self, line: &str) -> DbResult<Outcome> {
        let command = Parser::parse_line(line)?;
        debug!(?command, "executing");

        let message = match command {
            Command::Define(define) => {
                self.db.define_types(&define.name, &define.types);
                format!("{} is now defined.", define.name)
            }
            Command::Load(Load {
                headed,
                table,
                file,
            }) => {
                let count = self.db.load_file(headed, &table, self.resolve_path(&file))?;
                format!("Loaded {count} rows into {table}")
            }
            Command::Save(Save { table, file }) => {
                self.db.save_file(&table, self.resolve_path(&file))?;
                format!("Saved {table} to {file}")
            }
            Command::Print(table) => self.db.print(&table)?,
            Command::Check(check) => self.check(&check)?,
            Command::Assign(assign) => self.assign(assign)?,
            Command::Exit => return Ok(Outcome::Exit),
        };

        Ok(Outcome::Message(message))
    }

    fn resolve_path(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.data_dir.join(path)
        }
    }

    fn check(&self, check: &Check) -> DbResult<String> {
        let missing = self.db.check(
            &check.child,
            &check.child_column,
            &check.parent,
            &check.parent_column,
        )?;
        let child = format!("{}({})", check.child, check.child_column);
        let parent = format!("{}({})", check.parent, check.parent_column);

        if missing.is_empty() {
            Ok(format!("Yes: {child} references {parent}"))
        } else {
            let rows = missing.to_string();
            Ok(format!(
                "These rows in {child} do not reference {parent}:\n{}",
                rows.trim_end()
            ))
        }
    }

    fn assign(&mut self, Assign { target, expr }: Assign) -> DbResult<String> {
        let result = self.evaluate(&expr)?;

        if result.is_empty() && !self.config.keep_empty_results {
            self.db.remove(&target);
            return Ok(format!(
                "{target} is an empty table. It has not been added to the database."
            ));
        }

        let message = format!("{target} = {} rows", result.len());
        self.db.insert(&target, result);
        Ok(message)
    }

    fn evaluate(&self, expr: &Expr) -> DbResult<Table> {
        match expr {
            Expr::Rows {
                table,
                column,
                comparator,
                literal,
            } => self.db.rows(table, column, *comparator, literal),
            Expr::Columns { table, columns } => self.db.columns(table, columns),
            Expr::Product { left, right } => self.db.product(left, right),
            Expr::Join {
                outer: false,
                left,
                right,
                pairs,
            } => self.db.join(left, right, pairs),
            Expr::Join {
                outer: true,
                left,
                right,
                pairs,
            } => self.db.outer_join(left, right, pairs),
            Expr::NaturalJoin { outer, left, right } => self.db.natural_join(left, right, *outer),
            Expr::OrderBy { table, column } => self.db.order_by(table, column),
        }
    }
}
