//! Name-keyed registration of virtual-table modules.
//!
//! The host engine holds one [`ModuleRegistry`] per connection. Registration
//! installs type-erased create/connect entry points under a module name;
//! `CREATE VIRTUAL TABLE ... USING <name>(...)` is then served by looking the
//! name up and invoking the matching entry point. Registering the same name
//! twice on one registry is a user error surfaced at registration time.

use std::collections::HashMap;
use std::sync::Arc;

use sqlexec_error::{Result, SqlexecError};
use tracing::debug;

use crate::engine::HostConnection;
use crate::vtab::{VirtualTable, VirtualTableCursor};

/// A live table instance with its concrete types erased.
pub type TableHandle<C> = Box<dyn VirtualTable<C, Cursor = Box<dyn VirtualTableCursor>>>;

type EntryPoint<C> = Box<dyn Fn(&Arc<C>, &[&str]) -> Result<TableHandle<C>> + Send + Sync>;

struct ModuleEntry<C: HostConnection> {
    create: EntryPoint<C>,
    connect: EntryPoint<C>,
}

/// Registry of virtual-table modules available on one host connection.
pub struct ModuleRegistry<C: HostConnection> {
    modules: HashMap<String, ModuleEntry<C>>,
}

impl<C: HostConnection + 'static> ModuleRegistry<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Register module `T` under `name`.
    ///
    /// # Errors
    /// Fails with [`SqlexecError::ModuleExists`] when `name` is already
    /// registered on this registry; the existing registration is untouched.
    pub fn register<T>(&mut self, name: &str) -> Result<()>
    where
        T: VirtualTable<C> + 'static,
        T::Cursor: 'static,
    {
        if self.modules.contains_key(name) {
            return Err(SqlexecError::ModuleExists {
                name: name.to_owned(),
            });
        }
        let entry = ModuleEntry {
            create: Box::new(create_entry::<C, T>),
            connect: Box::new(connect_entry::<C, T>),
        };
        self.modules.insert(name.to_owned(), entry);
        debug!(module = name, "registered virtual table module");
        Ok(())
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Serve `CREATE VIRTUAL TABLE`: instantiate the module named by
    /// `args[0]` with the full creation argument list.
    ///
    /// # Errors
    /// Fails when the module is unknown or its create entry point fails.
    pub fn create_table(&self, db: &Arc<C>, args: &[&str]) -> Result<TableHandle<C>> {
        let entry = self.lookup(args)?;
        (entry.create)(db, args)
    }

    /// Serve a reconnection to an existing virtual table.
    ///
    /// # Errors
    /// Fails when the module is unknown or its connect entry point fails.
    pub fn connect_table(&self, db: &Arc<C>, args: &[&str]) -> Result<TableHandle<C>> {
        let entry = self.lookup(args)?;
        (entry.connect)(db, args)
    }

    fn lookup(&self, args: &[&str]) -> Result<&ModuleEntry<C>> {
        let name = args
            .first()
            .ok_or_else(|| SqlexecError::internal("creation argument list is empty"))?;
        self.modules
            .get(*name)
            .ok_or_else(|| SqlexecError::engine(format!("no such module: {name}")))
    }
}

impl<C: HostConnection + 'static> Default for ModuleRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn create_entry<C, T>(db: &Arc<C>, args: &[&str]) -> Result<TableHandle<C>>
where
    C: HostConnection,
    T: VirtualTable<C> + 'static,
    T::Cursor: 'static,
{
    Ok(Box::new(Erased(T::create(db, args)?)))
}

fn connect_entry<C, T>(db: &Arc<C>, args: &[&str]) -> Result<TableHandle<C>>
where
    C: HostConnection,
    T: VirtualTable<C> + 'static,
    T::Cursor: 'static,
{
    Ok(Box::new(Erased(T::connect(db, args)?)))
}

/// Adapter erasing a concrete table's cursor type behind
/// `Box<dyn VirtualTableCursor>`.
struct Erased<T>(T);

impl<C, T> VirtualTable<C> for Erased<T>
where
    C: HostConnection,
    T: VirtualTable<C>,
    T::Cursor: 'static,
{
    type Cursor = Box<dyn VirtualTableCursor>;

    fn connect(db: &Arc<C>, args: &[&str]) -> Result<Self> {
        T::connect(db, args).map(Erased)
    }

    fn create(db: &Arc<C>, args: &[&str]) -> Result<Self> {
        T::create(db, args).map(Erased)
    }

    fn best_index(&self, info: &mut crate::vtab::IndexInfo) -> Result<()> {
        self.0.best_index(info)
    }

    fn open(&self) -> Result<Self::Cursor> {
        Ok(Box::new(self.0.open()?))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.0.disconnect()
    }

    fn destroy(&mut self) -> Result<()> {
        self.0.destroy()
    }

    fn take_error_message(&self) -> Option<String> {
        self.0.take_error_message()
    }

    fn update(&mut self, args: &[sqlexec_types::SqliteValue]) -> Result<Option<i64>> {
        self.0.update(args)
    }
}
