//! Service-provider interface between the sqlexec adapter and its host engine.
//!
//! Three surfaces, all open (user-implementable):
//!
//! - [`engine`]: what the adapter requires *of* a host engine — preparing
//!   query text into a steppable statement and accepting a virtual-table
//!   schema declaration.
//! - [`vtab`]: what the adapter implements *for* a host engine — the
//!   create/connect, best-index/filter, next/eof/column/rowid protocol.
//! - [`registry`]: name-keyed registration of virtual-table modules on a
//!   host connection, with type-erased create/connect entry points.

pub mod engine;
pub mod registry;
pub mod vtab;

pub use engine::{HostConnection, PreparedStatement, Step};
pub use registry::{ModuleRegistry, TableHandle};
pub use vtab::{
    ColumnContext, ConstraintOp, IndexConstraint, IndexConstraintUsage, IndexInfo, IndexOrderBy,
    VirtualTable, VirtualTableCursor,
};
