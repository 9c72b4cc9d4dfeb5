use std::sync::Arc;
use parking_lot::Mutex;
use crate::core::config::{Config, StorageBackend};
use crate::core::error::Result;
use crate::core::types::StoreData;
use crate::storage::caching::CachingStorage;
use crate::storage::json::JsonStorage;
use crate::storage::memory::MemoryStorage;

/// Whole-store persistence: every write replaces everything
pub trait Storage: Send {
    /// `None` if nothing was ever written
    fn read(&mut self) -> Result<Option<StoreData>>;

    fn write(&mut self, data: &StoreData) -> Result<()>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One backend shared by every table of a database
pub type SharedStorage = Arc<Mutex<Box<dyn Storage>>>;

pub fn shared(storage: Box<dyn Storage>) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Build the backend described by `config`
pub fn open_backend(config: &Config) -> Result<Box<dyn Storage>> {
    let backend: Box<dyn Storage> = match &config.storage {
        StorageBackend::Memory => Box::new(MemoryStorage::new()),
        StorageBackend::Json { path, create_dirs, pretty } => {
            Box::new(JsonStorage::open(path, *create_dirs)?.pretty(*pretty))
        }
    };

    Ok(match config.write_cache_size {
        Some(size) => Box::new(CachingStorage::with_write_cache_size(backend, size)),
        None => backend,
    })
}
