//! Virtual table and cursor traits.
//!
//! Virtual tables expose computed data as SQL tables. They follow the host
//! engine's create/connect, best-index/filter, next/eof/column/rowid
//! protocol. The lifecycle pairs share one implementation each: `create`
//! defaults onto `connect`, `destroy` onto `disconnect`.
//!
//! Capability slots the host reuses for writes, transaction hooks, or
//! dynamic method lookup are not part of this trait surface; the only write
//! entry point, [`VirtualTable::update`], defaults to a read-only failure.

use std::sync::Arc;

use sqlexec_error::{Result, SqlexecError};
use sqlexec_types::SqliteValue;

use crate::engine::HostConnection;

// ---------------------------------------------------------------------------
// Query planner types
// ---------------------------------------------------------------------------

/// Comparison operator for an index constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    Eq,
    Gt,
    Le,
    Lt,
    Ge,
    Match,
    Like,
    Glob,
    Ne,
    IsNot,
    IsNotNull,
    IsNull,
    Is,
}

/// A single WHERE-clause constraint the planner is considering.
#[derive(Debug, Clone)]
pub struct IndexConstraint {
    /// Column index (0-based; `-1` for rowid).
    pub column: i32,
    /// The comparison operator.
    pub op: ConstraintOp,
    /// Whether the planner considers this constraint usable.
    pub usable: bool,
}

/// A single ORDER BY term from the query.
#[derive(Debug, Clone)]
pub struct IndexOrderBy {
    /// Column index (0-based).
    pub column: i32,
    /// `true` if descending.
    pub desc: bool,
}

/// Per-constraint usage information set by `best_index`.
#[derive(Debug, Clone, Default)]
pub struct IndexConstraintUsage {
    /// 1-based index into the `args` array passed to `filter`.
    /// 0 means the constraint is not consumed by the table.
    pub argv_index: i32,
    /// If `true`, the table guarantees the constraint is satisfied and the
    /// host need not double-check it.
    pub omit: bool,
}

/// Information exchanged between the host planner and a virtual table during
/// plan selection.
///
/// The planner fills `constraints` and `order_by`; the table fills the rest.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    /// WHERE-clause constraints the planner is considering.
    pub constraints: Vec<IndexConstraint>,
    /// ORDER BY terms from the query.
    pub order_by: Vec<IndexOrderBy>,
    /// How each constraint maps to filter arguments.
    pub constraint_usage: Vec<IndexConstraintUsage>,
    /// Integer identifier for the chosen plan variant.
    pub idx_num: i32,
    /// Optional string identifier for the chosen plan variant.
    pub idx_str: Option<String>,
    /// Whether the table guarantees the output is already sorted.
    pub order_by_consumed: bool,
    /// Estimated cost of the scan (lower is better).
    pub estimated_cost: f64,
    /// Estimated number of rows returned.
    pub estimated_rows: i64,
}

impl IndexInfo {
    /// Create an `IndexInfo` with the given constraints and order-by terms.
    #[must_use]
    pub fn new(constraints: Vec<IndexConstraint>, order_by: Vec<IndexOrderBy>) -> Self {
        let usage_len = constraints.len();
        Self {
            constraints,
            order_by,
            constraint_usage: vec![IndexConstraintUsage::default(); usage_len],
            idx_num: 0,
            idx_str: None,
            order_by_consumed: false,
            estimated_cost: 1_000_000.0,
            estimated_rows: 1_000_000,
        }
    }

    /// Create an `IndexInfo` for an unconstrained scan.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Column context
// ---------------------------------------------------------------------------

/// Carrier the host passes to [`VirtualTableCursor::column`]; the cursor
/// writes the requested column value into it.
#[derive(Debug, Default)]
pub struct ColumnContext {
    value: Option<SqliteValue>,
}

impl ColumnContext {
    /// Create a new empty column context.
    #[must_use]
    pub fn new() -> Self {
        Self { value: None }
    }

    /// Set the value for this column.
    pub fn set_value(&mut self, val: SqliteValue) {
        self.value = Some(val);
    }

    /// Take the value out of this context, leaving `None`.
    pub fn take_value(&mut self) -> Option<SqliteValue> {
        self.value.take()
    }
}

// ---------------------------------------------------------------------------
// VirtualTable trait
// ---------------------------------------------------------------------------

/// A virtual table instance bound to a host connection of type `C`.
///
/// This trait is **open** (user-implementable). The `Sized` bounds on the
/// constructors allow `dyn VirtualTable<C, Cursor = ...>` for the remaining
/// methods, which is how [`crate::registry::ModuleRegistry`] stores tables.
#[allow(clippy::missing_errors_doc)]
pub trait VirtualTable<C: HostConnection>: Send + Sync {
    /// The cursor type for scanning this virtual table.
    type Cursor: VirtualTableCursor;

    /// Called for `CREATE VIRTUAL TABLE`.
    ///
    /// Default delegates to `connect`; the two lifecycle events require
    /// identical behavior for tables with no backing storage.
    fn create(db: &Arc<C>, args: &[&str]) -> Result<Self>
    where
        Self: Sized,
    {
        Self::connect(db, args)
    }

    /// Called for subsequent opens of an existing virtual table.
    fn connect(db: &Arc<C>, args: &[&str]) -> Result<Self>
    where
        Self: Sized;

    /// Inform the host planner about available plans and their costs.
    fn best_index(&self, info: &mut IndexInfo) -> Result<()>;

    /// Open a new scan cursor.
    fn open(&self) -> Result<Self::Cursor>;

    /// Drop a virtual table instance (opposite of `connect`).
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called for `DROP VIRTUAL TABLE`. Default delegates to `disconnect`.
    fn destroy(&mut self) -> Result<()> {
        self.disconnect()
    }

    /// Take the diagnostic message recorded by the most recent failed
    /// operation on this table, if any. The host reads and clears it after
    /// a failed cursor open.
    fn take_error_message(&self) -> Option<String> {
        None
    }

    /// INSERT/UPDATE/DELETE entry point. Default refuses: read-only table.
    fn update(&mut self, _args: &[SqliteValue]) -> Result<Option<i64>> {
        Err(SqlexecError::ReadOnly)
    }
}

// ---------------------------------------------------------------------------
// VirtualTableCursor trait
// ---------------------------------------------------------------------------

/// A cursor scanning a virtual table.
///
/// Cursors are `Send` but not `Sync`: each is a single-threaded scan object
/// exclusively owning its execution state.
///
/// # Lifecycle
///
/// 1. [`filter`](Self::filter) begins the scan with the planner-chosen
///    variant and performs the first advance.
/// 2. Iterate: check [`eof`](Self::eof), read [`column`](Self::column) /
///    [`rowid`](Self::rowid), advance with [`next`](Self::next).
/// 3. Dropping the cursor closes the scan.
#[allow(clippy::missing_errors_doc)]
pub trait VirtualTableCursor: Send {
    /// Begin a scan with the plan variant chosen by `best_index`.
    fn filter(&mut self, idx_num: i32, idx_str: Option<&str>, args: &[SqliteValue]) -> Result<()>;

    /// Advance to the next row. Advancing past the end is a no-op.
    fn next(&mut self) -> Result<()>;

    /// Whether the cursor has moved past the last row.
    fn eof(&self) -> bool;

    /// Write the value of column `idx` of the current row into `ctx`.
    fn column(&self, ctx: &mut ColumnContext, idx: usize) -> Result<()>;

    /// Return the rowid of the current row.
    fn rowid(&self) -> Result<i64>;
}

impl VirtualTableCursor for Box<dyn VirtualTableCursor> {
    fn filter(&mut self, idx_num: i32, idx_str: Option<&str>, args: &[SqliteValue]) -> Result<()> {
        (**self).filter(idx_num, idx_str, args)
    }

    fn next(&mut self) -> Result<()> {
        (**self).next()
    }

    fn eof(&self) -> bool {
        (**self).eof()
    }

    fn column(&self, ctx: &mut ColumnContext, idx: usize) -> Result<()> {
        (**self).column(ctx, idx)
    }

    fn rowid(&self) -> Result<i64> {
        (**self).rowid()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PreparedStatement, Step};

    // -- Mock host connection that can prepare nothing --

    struct NullConnection;

    struct NullStatement;

    impl PreparedStatement for NullStatement {
        fn column_count(&self) -> usize {
            0
        }

        fn column_name(&self, idx: usize) -> Result<&str> {
            Err(SqlexecError::ColumnOutOfRange { index: idx, count: 0 })
        }

        fn step(&mut self) -> Result<Step> {
            Ok(Step::Done)
        }

        fn value_ref(&self, idx: usize) -> Result<&SqliteValue> {
            Err(SqlexecError::ColumnOutOfRange { index: idx, count: 0 })
        }
    }

    impl HostConnection for NullConnection {
        type Statement = NullStatement;

        fn prepare(&self, sql: &str) -> Result<NullStatement> {
            Err(SqlexecError::engine(format!("cannot prepare: {sql}")))
        }

        fn declare_vtab(&self, _schema: &str) -> Result<()> {
            Ok(())
        }
    }

    // -- Mock: counter(stop) virtual table producing 1..=stop --

    struct CounterTable {
        stop: i64,
        destroyed: bool,
    }

    struct CounterCursor {
        current: i64,
        stop: i64,
    }

    impl VirtualTable<NullConnection> for CounterTable {
        type Cursor = CounterCursor;

        fn connect(_db: &Arc<NullConnection>, args: &[&str]) -> Result<Self> {
            let stop = args
                .first()
                .and_then(|a| a.parse().ok())
                .unwrap_or_default();
            Ok(Self {
                stop,
                destroyed: false,
            })
        }

        fn best_index(&self, info: &mut IndexInfo) -> Result<()> {
            info.estimated_cost = 10.0;
            info.estimated_rows = self.stop;
            Ok(())
        }

        fn open(&self) -> Result<CounterCursor> {
            Ok(CounterCursor {
                current: 0,
                stop: self.stop,
            })
        }

        fn destroy(&mut self) -> Result<()> {
            self.destroyed = true;
            Ok(())
        }
    }

    impl VirtualTableCursor for CounterCursor {
        fn filter(
            &mut self,
            _idx_num: i32,
            _idx_str: Option<&str>,
            _args: &[SqliteValue],
        ) -> Result<()> {
            self.current = 0;
            self.next()
        }

        fn next(&mut self) -> Result<()> {
            if self.current <= self.stop {
                self.current += 1;
            }
            Ok(())
        }

        fn eof(&self) -> bool {
            self.current > self.stop
        }

        fn column(&self, ctx: &mut ColumnContext, _idx: usize) -> Result<()> {
            ctx.set_value(SqliteValue::Integer(self.current));
            Ok(())
        }

        fn rowid(&self) -> Result<i64> {
            Ok(self.current - 1)
        }
    }

    fn db() -> Arc<NullConnection> {
        Arc::new(NullConnection)
    }

    #[test]
    fn create_delegates_to_connect() {
        let table = CounterTable::create(&db(), &["3"]).unwrap();
        assert_eq!(table.stop, 3);
        assert!(!table.destroyed);
    }

    #[test]
    fn destroy_overrides_disconnect_default() {
        let mut table = CounterTable::connect(&db(), &["1"]).unwrap();
        table.disconnect().unwrap();
        assert!(!table.destroyed);
        table.destroy().unwrap();
        assert!(table.destroyed);
    }

    #[test]
    fn scan_protocol_visits_every_row() {
        let table = CounterTable::connect(&db(), &["3"]).unwrap();
        let mut cursor = table.open().unwrap();
        cursor.filter(0, None, &[]).unwrap();

        let mut seen = Vec::new();
        while !cursor.eof() {
            let mut ctx = ColumnContext::new();
            cursor.column(&mut ctx, 0).unwrap();
            seen.push((cursor.rowid().unwrap(), ctx.take_value().unwrap()));
            cursor.next().unwrap();
        }

        assert_eq!(
            seen,
            vec![
                (0, SqliteValue::Integer(1)),
                (1, SqliteValue::Integer(2)),
                (2, SqliteValue::Integer(3)),
            ]
        );
    }

    #[test]
    fn update_default_is_read_only() {
        let mut table = CounterTable::connect(&db(), &["1"]).unwrap();
        let err = table.update(&[SqliteValue::Null]).unwrap_err();
        assert!(matches!(err, SqlexecError::ReadOnly));
    }

    #[test]
    fn error_message_default_is_empty() {
        let table = CounterTable::connect(&db(), &["1"]).unwrap();
        assert!(table.take_error_message().is_none());
    }

    #[test]
    fn boxed_cursor_delegates() {
        let table = CounterTable::connect(&db(), &["2"]).unwrap();
        let mut cursor: Box<dyn VirtualTableCursor> = Box::new(table.open().unwrap());
        cursor.filter(0, None, &[]).unwrap();

        let mut count = 0;
        while !cursor.eof() {
            count += 1;
            cursor.next().unwrap();
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn index_info_new_sizes_usage() {
        let info = IndexInfo::new(
            vec![IndexConstraint {
                column: 0,
                op: ConstraintOp::Eq,
                usable: true,
            }],
            vec![IndexOrderBy {
                column: 0,
                desc: false,
            }],
        );
        assert_eq!(info.constraint_usage.len(), 1);
        assert_eq!(info.idx_num, 0);
        assert!(!info.order_by_consumed);

        let unconstrained = IndexInfo::unconstrained();
        assert!(unconstrained.constraints.is_empty());
        assert!(unconstrained.constraint_usage.is_empty());
    }

    #[test]
    fn column_context_lifecycle() {
        let mut ctx = ColumnContext::new();
        assert!(ctx.take_value().is_none());
        ctx.set_value(SqliteValue::Integer(42));
        assert_eq!(ctx.take_value(), Some(SqliteValue::Integer(42)));
        assert!(ctx.take_value().is_none());
    }
}
