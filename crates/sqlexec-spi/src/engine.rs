//! Engine-boundary traits.
//!
//! The adapter never parses or executes SQL itself; it hands query text to
//! the hosting connection and consumes the compiled result. These traits are
//! the whole of what it asks for. Any engine that can prepare a statement,
//! step it row by row, and accept a `create table ...` schema declaration can
//! host the adapter.

use sqlexec_error::Result;
use sqlexec_types::SqliteValue;

/// Outcome of advancing a prepared statement by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// A new current row is available.
    Row,
    /// The statement has run to completion; no current row.
    Done,
}

/// A connection to the hosting engine.
///
/// `prepare` compiles without executing: no row is visible until the first
/// [`PreparedStatement::step`]. Statement handles borrow nothing from the
/// connection, so several may be live at once (independent cursors over the
/// same table, self-joins).
pub trait HostConnection: Send + Sync {
    /// The engine's prepared-statement handle.
    type Statement: PreparedStatement;

    /// Compile `sql` into a fresh execution context.
    ///
    /// # Errors
    /// Returns the engine's own diagnostic when `sql` fails to compile.
    fn prepare(&self, sql: &str) -> Result<Self::Statement>;

    /// Present a `create table x(...)` declaration describing a virtual
    /// table's schema.
    ///
    /// # Errors
    /// Returns the engine's own diagnostic when the declaration is rejected.
    fn declare_vtab(&self, schema: &str) -> Result<()>;
}

/// A compiled statement positioned before its first row.
///
/// Column metadata is available immediately after prepare; row data only
/// after a `step` that returned [`Step::Row`].
pub trait PreparedStatement: Send {
    /// Number of result columns this statement produces.
    fn column_count(&self) -> usize;

    /// Name of result column `idx`.
    ///
    /// # Errors
    /// Fails when `idx` is outside the result-column range.
    fn column_name(&self, idx: usize) -> Result<&str>;

    /// Advance to the next row.
    ///
    /// # Errors
    /// Any status other than "row available" or "done" is propagated
    /// verbatim.
    fn step(&mut self) -> Result<Step>;

    /// Borrow column `idx` of the current row.
    ///
    /// # Errors
    /// Fails when there is no current row or `idx` is out of range.
    fn value_ref(&self, idx: usize) -> Result<&SqliteValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_outcomes_are_distinct() {
        assert_ne!(Step::Row, Step::Done);
        assert_eq!(Step::Row, Step::Row);
    }
}
