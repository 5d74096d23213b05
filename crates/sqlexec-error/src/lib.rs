use thiserror::Error;

/// Primary error type for the sqlexec virtual-table adapter.
///
/// Structured variants for the failures the adapter itself detects, plus a
/// verbatim passthrough ([`SqlexecError::Engine`]) for statuses reported by
/// the underlying engine during prepare/step.
#[derive(Error, Debug)]
pub enum SqlexecError {
    /// Wrong number of arguments in the USING clause.
    #[error("expected {expected} argument in USING clause, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// The stored query failed to compile against the host engine.
    ///
    /// Carries the offending query text and the engine's own diagnostic.
    #[error("error preparing: {sql}; reason: {reason}")]
    Prepare { sql: String, reason: String },

    /// The compiled query produces no result columns and cannot back a table.
    #[error("statement returns no data: {sql}")]
    NoResultColumns { sql: String },

    /// The host engine reported memory exhaustion.
    #[error("out of memory")]
    OutOfMemory,

    /// The host selected a query plan variant that was never offered.
    #[error("query plan {idx_num} was never offered; only plan 0 exists")]
    PlanMismatch { idx_num: i32 },

    /// A module with this name is already registered on the connection.
    #[error("module {name} is already registered; maybe it was loaded twice?")]
    ModuleExists { name: String },

    /// The host asked for a column index outside the declared schema.
    #[error("column index {index} out of range (statement has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// Verbatim status from the underlying engine.
    #[error("{message}")]
    Engine { message: String },

    /// Internal protocol violation (should never happen).
    #[error("internal error: {0}")]
    Internal(String),

    /// The host attempted the write path on a read-only virtual table.
    #[error("attempt to write a readonly virtual table")]
    ReadOnly,
}

/// Host-engine status codes for the SPI boundary.
///
/// These match the numeric values of the host's result-code convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HostCode {
    /// Successful result.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Internal logic error.
    Internal = 2,
    /// Out of memory.
    NoMem = 7,
    /// Attempt to write a read-only table.
    ReadOnly = 8,
    /// Index out of range.
    Range = 25,
}

impl SqlexecError {
    /// Map this error to a host status code for the SPI boundary.
    pub const fn host_code(&self) -> HostCode {
        match self {
            Self::ArgumentCount { .. }
            | Self::Prepare { .. }
            | Self::NoResultColumns { .. }
            | Self::ModuleExists { .. }
            | Self::Engine { .. } => HostCode::Error,
            Self::OutOfMemory => HostCode::NoMem,
            Self::PlanMismatch { .. } | Self::Internal(_) => HostCode::Internal,
            Self::ColumnOutOfRange { .. } => HostCode::Range,
            Self::ReadOnly => HostCode::ReadOnly,
        }
    }

    /// Create a prepare-failure error for `sql` with the engine's diagnostic.
    pub fn prepare(sql: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Prepare {
            sql: sql.into(),
            reason: reason.into(),
        }
    }

    /// Create a verbatim engine-status error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using `SqlexecError`.
pub type Result<T> = std::result::Result<T, SqlexecError>;
