//! Table descriptor and schema derivation.
//!
//! A descriptor is created per CREATE/CONNECT: the query text from the
//! USING clause is compiled once against the hosting connection — never
//! executed — to validate it and enumerate its result columns, a
//! `create table x(...)` declaration is derived from the column names, and
//! the compiled statement is dropped. Only the query text survives, to be
//! recompiled by each cursor.

use std::sync::Arc;

use parking_lot::Mutex;
use sqlexec_error::{Result, SqlexecError};
use sqlexec_spi::{HostConnection, IndexInfo, PreparedStatement, VirtualTable};
use tracing::debug;

use crate::args;
use crate::cursor::ExecCursor;

/// Descriptor of one sqlexec virtual table: the hosting connection and an
/// immutable copy of the query text that backs the table.
pub struct ExecTable<C: HostConnection> {
    db: Arc<C>,
    sql: String,
    /// Diagnostic from the most recent failed cursor open, for the host to
    /// surface.
    last_error: Mutex<Option<String>>,
}

impl<C: HostConnection> ExecTable<C> {
    /// Shared implementation behind both `create` and `connect`.
    fn establish(db: &Arc<C>, creation_args: &[&str]) -> Result<Self> {
        let raw = args::single_query_argument(creation_args)?;
        let sql = args::normalize_query(raw).to_owned();

        let stmt = match db.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(SqlexecError::OutOfMemory) => return Err(SqlexecError::OutOfMemory),
            Err(cause) => return Err(SqlexecError::prepare(sql, cause.to_string())),
        };

        if stmt.column_count() == 0 {
            drop(stmt);
            return Err(SqlexecError::NoResultColumns { sql });
        }

        let declaration = declaration_for(&stmt)?;
        drop(stmt);

        db.declare_vtab(&declaration)?;
        debug!(sql = %sql, declaration = %declaration, "declared sqlexec virtual table");

        Ok(Self {
            db: Arc::clone(db),
            sql,
            last_error: Mutex::new(None),
        })
    }

    /// The stored query text backing this table.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn record_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
    }
}

impl<C: HostConnection> VirtualTable<C> for ExecTable<C> {
    type Cursor = ExecCursor<C>;

    fn connect(db: &Arc<C>, creation_args: &[&str]) -> Result<Self> {
        Self::establish(db, creation_args)
    }

    /// Report a maximal estimate and the single degenerate plan variant 0:
    /// the table offers no indexing and supports only full scans.
    fn best_index(&self, info: &mut IndexInfo) -> Result<()> {
        info.estimated_cost = f64::from(i32::MAX);
        info.estimated_rows = i64::from(i32::MAX);
        info.idx_num = 0;
        Ok(())
    }

    /// Recompile the stored query into an independent execution context.
    fn open(&self) -> Result<ExecCursor<C>> {
        match self.db.prepare(&self.sql) {
            Ok(stmt) => {
                debug!(sql = %self.sql, "opened sqlexec cursor");
                Ok(ExecCursor::new(stmt))
            }
            Err(SqlexecError::OutOfMemory) => Err(SqlexecError::OutOfMemory),
            Err(cause) => {
                let err = SqlexecError::prepare(self.sql.clone(), cause.to_string());
                self.record_error(err.to_string());
                Err(err)
            }
        }
    }

    fn take_error_message(&self) -> Option<String> {
        self.last_error.lock().take()
    }
}

/// Build the schema declaration: one quoted column name per result column,
/// in order, comma-separated.
fn declaration_for<S: PreparedStatement>(stmt: &S) -> Result<String> {
    let mut decl = String::from("create table x(");
    for idx in 0..stmt.column_count() {
        if idx > 0 {
            decl.push(',');
        }
        push_quoted(&mut decl, stmt.column_name(idx)?);
    }
    decl.push(')');
    Ok(decl)
}

/// Quote a column name as an identifier, doubling embedded quotes.
fn push_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}
