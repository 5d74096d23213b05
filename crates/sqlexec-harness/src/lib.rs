//! Scripted in-memory host engine for tests.
//!
//! [`ScriptedConnection`] implements the adapter-facing engine boundary
//! without a real SQL pipeline: each [`Script`] maps one exact query text to
//! a canned result set. Unknown text fails `prepare` with a syntax-style
//! diagnostic, scripts can be told to fail mid-step, and schema declarations
//! are recorded (or rejected) so tests can assert on what the adapter
//! presented to the engine.

use std::collections::HashMap;

use parking_lot::Mutex;
use sqlexec_error::{Result, SqlexecError};
use sqlexec_spi::{HostConnection, PreparedStatement, Step};
use sqlexec_types::SqliteValue;

/// A canned result set keyed on exact query text.
#[derive(Clone, Debug)]
pub struct Script {
    columns: Vec<String>,
    rows: Vec<Vec<SqliteValue>>,
    fail_step: Option<(usize, String)>,
}

impl Script {
    /// A script producing the given result columns and no rows (yet).
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            fail_step: None,
        }
    }

    /// A script whose statement compiles but yields zero result columns,
    /// like DDL or DML text.
    #[must_use]
    pub fn no_columns() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Append one result row.
    #[must_use]
    pub fn row(mut self, values: Vec<SqliteValue>) -> Self {
        self.rows.push(values);
        self
    }

    /// Make the step that would reach row `index` fail with `message`.
    #[must_use]
    pub fn fail_at_row(mut self, index: usize, message: impl Into<String>) -> Self {
        self.fail_step = Some((index, message.into()));
        self
    }
}

/// In-memory [`HostConnection`] driven entirely by scripts.
#[derive(Default)]
pub struct ScriptedConnection {
    scripts: Mutex<HashMap<String, Script>>,
    declarations: Mutex<Vec<String>>,
    declaration_error: Mutex<Option<String>>,
}

impl ScriptedConnection {
    /// Create a connection with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `script` for the exact query text `sql`.
    pub fn script(&self, sql: impl Into<String>, script: Script) {
        self.scripts.lock().insert(sql.into(), script);
    }

    /// Remove the script for `sql`, so later prepares of the same text fail.
    /// Simulates the underlying schema changing between connect and open.
    pub fn unscript(&self, sql: &str) {
        self.scripts.lock().remove(sql);
    }

    /// Make every subsequent schema declaration fail with `message`.
    pub fn reject_declarations(&self, message: impl Into<String>) {
        *self.declaration_error.lock() = Some(message.into());
    }

    /// Every schema declaration presented so far, in order.
    #[must_use]
    pub fn declarations(&self) -> Vec<String> {
        self.declarations.lock().clone()
    }
}

impl HostConnection for ScriptedConnection {
    type Statement = ScriptedStatement;

    fn prepare(&self, sql: &str) -> Result<ScriptedStatement> {
        let scripts = self.scripts.lock();
        let Some(script) = scripts.get(sql) else {
            let token = sql.split_whitespace().next().unwrap_or(sql);
            return Err(SqlexecError::engine(format!(
                "near \"{token}\": syntax error"
            )));
        };
        Ok(ScriptedStatement {
            script: script.clone(),
            next_row: 0,
            current: None,
        })
    }

    fn declare_vtab(&self, schema: &str) -> Result<()> {
        if let Some(message) = self.declaration_error.lock().clone() {
            return Err(SqlexecError::engine(message));
        }
        self.declarations.lock().push(schema.to_owned());
        Ok(())
    }
}

/// Statement handle over a script: positioned before the first row until
/// stepped.
#[derive(Debug)]
pub struct ScriptedStatement {
    script: Script,
    next_row: usize,
    current: Option<usize>,
}

impl PreparedStatement for ScriptedStatement {
    fn column_count(&self) -> usize {
        self.script.columns.len()
    }

    fn column_name(&self, idx: usize) -> Result<&str> {
        self.script
            .columns
            .get(idx)
            .map(String::as_str)
            .ok_or(SqlexecError::ColumnOutOfRange {
                index: idx,
                count: self.script.columns.len(),
            })
    }

    fn step(&mut self) -> Result<Step> {
        if let Some((at, message)) = &self.script.fail_step {
            if self.next_row == *at {
                self.current = None;
                return Err(SqlexecError::engine(message.clone()));
            }
        }
        if self.next_row < self.script.rows.len() {
            self.current = Some(self.next_row);
            self.next_row += 1;
            Ok(Step::Row)
        } else {
            self.current = None;
            Ok(Step::Done)
        }
    }

    fn value_ref(&self, idx: usize) -> Result<&SqliteValue> {
        let Some(row) = self.current.and_then(|r| self.script.rows.get(r)) else {
            return Err(SqlexecError::internal("value read without a current row"));
        };
        row.get(idx).ok_or(SqlexecError::ColumnOutOfRange {
            index: idx,
            count: row.len(),
        })
    }
}
