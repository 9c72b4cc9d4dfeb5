use std::collections::{BTreeSet, HashMap};
use std::collections::hash_map::Entry;
use tracing::{info, warn};
use crate::core::config::{Config, TableOptions};
use crate::core::error::{Error, Result};
use crate::core::table::Table;
use crate::core::types::StoreData;
use crate::storage::backend::{open_backend, shared, SharedStorage, Storage};
use crate::storage::proxy::StorageProxy;

/// Registry of named tables over a single storage backend.
///
/// Tables are created on first use and kept until the database is closed
/// or the table is purged.
pub struct Database {
    storage: SharedStorage,
    tables: HashMap<String, Table>,
    options: TableOptions,
    opened: bool,
}

impl Database {
    pub fn open(config: Config) -> Result<Self> {
        let backend = open_backend(&config)?;
        info!(storage = ?config.storage, write_cache = ?config.write_cache_size, "database opened");
        Ok(Self::with_storage(backend, config.table))
    }

    pub fn with_storage(storage: Box<dyn Storage>, options: TableOptions) -> Self {
        Database {
            storage: shared(storage),
            tables: HashMap::new(),
            options,
            opened: true,
        }
    }

    /// Get or create a table with the database's default options
    pub fn table(&mut self, name: &str) -> Result<&mut Table> {
        let options = self.options.clone();
        self.table_with_options(name, options)
    }

    /// Options only apply when the table is first created
    pub fn table_with_options(&mut self, name: &str, options: TableOptions) -> Result<&mut Table> {
        if name.is_empty() {
            return Err(Error::invalid_argument("Table name can not be empty"));
        }

        match self.tables.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let proxy = StorageProxy::new(self.storage.clone(), name, options.id_field);
                let table = Table::open(proxy, options.cache_size)?;
                Ok(entry.insert(table))
            }
        }
    }

    /// A table already opened through `table()`; never creates one
    pub fn get(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Names of every table in storage, including ones not opened yet
    pub fn tables(&self) -> Result<BTreeSet<String>> {
        let data = self.storage.lock().read()?;
        Ok(data.map(|data| data.into_keys().collect()).unwrap_or_default())
    }

    /// The raw persisted store
    pub fn all(&self) -> Result<StoreData> {
        Ok(self.storage.lock().read()?.unwrap_or_default())
    }

    pub fn purge_tables(&mut self) -> Result<()> {
        self.storage.lock().write(&StoreData::new())?;
        self.tables.clear();
        info!("all tables purged");
        Ok(())
    }

    pub fn purge_table(&mut self, name: &str) -> Result<()> {
        self.tables.remove(name);
        StorageProxy::new(self.storage.clone(), name, self.options.id_field.clone()).purge_table()?;
        info!(table = name, "table purged");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Release the backend. Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        if !self.opened {
            return Ok(());
        }
        self.opened = false;
        self.storage.lock().close()?;
        info!("database closed");
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close database");
        }
    }
}
