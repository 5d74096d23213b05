//! Forward-only scan cursor.
//!
//! Each cursor owns an independent execution context compiled from the
//! descriptor's query text at open time. The context lives in
//! [`ScanState::Active`] while rows remain and is dropped on the transition
//! to [`ScanState::Terminal`], the permanent end-of-scan marker.

use sqlexec_error::{Result, SqlexecError};
use sqlexec_spi::{ColumnContext, HostConnection, PreparedStatement, Step, VirtualTableCursor};
use sqlexec_types::SqliteValue;
use tracing::debug;

/// Scan state: a live execution context, or the permanent end-of-scan
/// marker.
enum ScanState<S> {
    Active(S),
    Terminal,
}

/// Cursor over one scan of a sqlexec virtual table.
pub struct ExecCursor<C: HostConnection> {
    /// Synthetic, cursor-local rowid of the current row. Starts before the
    /// first row and increments exactly once per row visited, so the first
    /// row reads as rowid 0.
    rowid: i64,
    state: ScanState<C::Statement>,
}

impl<C: HostConnection> ExecCursor<C> {
    /// A cursor positioned before the first row; the host's `filter` call
    /// performs the first advance.
    pub(crate) fn new(stmt: C::Statement) -> Self {
        Self {
            rowid: -1,
            state: ScanState::Active(stmt),
        }
    }
}

impl<C: HostConnection> VirtualTableCursor for ExecCursor<C> {
    /// Only plan variant 0 was ever offered; anything else is an internal
    /// inconsistency in the host planner.
    fn filter(&mut self, idx_num: i32, _idx_str: Option<&str>, _args: &[SqliteValue]) -> Result<()> {
        if idx_num != 0 {
            return Err(SqlexecError::PlanMismatch { idx_num });
        }
        self.next()
    }

    fn next(&mut self) -> Result<()> {
        let ScanState::Active(stmt) = &mut self.state else {
            // Advancing past the end is a no-op, not an error.
            return Ok(());
        };
        match stmt.step()? {
            Step::Row => {
                self.rowid += 1;
                Ok(())
            }
            Step::Done => {
                debug!(rows = self.rowid + 1, "sqlexec scan complete");
                self.state = ScanState::Terminal;
                Ok(())
            }
        }
    }

    fn eof(&self) -> bool {
        matches!(self.state, ScanState::Terminal)
    }

    fn column(&self, ctx: &mut ColumnContext, idx: usize) -> Result<()> {
        let ScanState::Active(stmt) = &self.state else {
            return Err(SqlexecError::internal("column read past end of scan"));
        };
        ctx.set_value(stmt.value_ref(idx)?.clone());
        Ok(())
    }

    fn rowid(&self) -> Result<i64> {
        Ok(self.rowid)
    }
}
