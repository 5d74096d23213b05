//! sqlexec: define read-only virtual tables in terms of SQL.
//!
//! Some results are only reachable through privileged statements that the
//! host engine refuses to embed in queries or views — `PRAGMA` output being
//! the classic case. This module wraps any such statement in a virtual
//! table, so its results compose like ordinary rows:
//!
//! ```text
//! create virtual table pragma_database_list
//!     using sqlexec(pragma database_list);
//! select * from pragma_database_list;
//! ```
//!
//! The USING-clause argument is the query text, optionally wrapped in one
//! parenthesis pair so commas inside it survive the host's argument
//! splitter:
//!
//! ```text
//! create virtual table two_cols using sqlexec((select 1 as a, 2 as b));
//! ```
//!
//! Creating the table compiles the query once to derive and declare its
//! schema; every cursor open recompiles and re-executes it, streaming rows
//! back with synthetic rowids 0, 1, 2, ... Scans are always full scans and
//! the table is read-only.

mod args;
mod cursor;
mod table;

pub use cursor::ExecCursor;
pub use table::ExecTable;

use sqlexec_error::Result;
use sqlexec_spi::{HostConnection, ModuleRegistry};
use tracing::info;

/// The fixed module name registered with the host connection.
pub const MODULE_NAME: &str = "sqlexec";

/// Register the sqlexec module on a host connection's registry.
///
/// Called once by the host-integration boundary when the extension is
/// loaded; the adapter itself holds no process-wide state.
///
/// # Errors
/// Fails with [`sqlexec_error::SqlexecError::ModuleExists`] when the module
/// is already registered on this connection — usually a sign the extension
/// was loaded twice.
pub fn register<C>(registry: &mut ModuleRegistry<C>) -> Result<()>
where
    C: HostConnection + 'static,
    C::Statement: 'static,
{
    registry.register::<ExecTable<C>>(MODULE_NAME)?;
    info!(module = MODULE_NAME, "registered sqlexec module");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlexec_error::SqlexecError;
    use sqlexec_harness::ScriptedConnection;

    #[test]
    fn module_name_matches_crate_name() {
        assert_eq!(MODULE_NAME, env!("CARGO_PKG_NAME"));
    }

    #[test]
    fn register_installs_the_module_once() {
        let mut registry: ModuleRegistry<ScriptedConnection> = ModuleRegistry::new();
        register(&mut registry).unwrap();
        assert!(registry.is_registered(MODULE_NAME));

        let err = register(&mut registry).unwrap_err();
        assert!(matches!(
            err,
            SqlexecError::ModuleExists { name } if name == MODULE_NAME
        ));
        assert!(registry.is_registered(MODULE_NAME));
    }
}
