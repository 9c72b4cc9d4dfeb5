use tracing::debug;
use crate::core::error::Result;
use crate::core::types::StoreData;
use crate::storage::backend::Storage;

/// Write-behind cache in front of another backend.
///
/// Reads are served from memory once loaded. Writes only reach the wrapped
/// backend every `write_cache_size` writes, on `flush`, or on `close`.
pub struct CachingStorage {
    storage: Box<dyn Storage>,
    cache: Option<StoreData>,
    modified_count: usize,
    write_cache_size: usize,
}

impl CachingStorage {
    pub const DEFAULT_WRITE_CACHE_SIZE: usize = 1000;

    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self::with_write_cache_size(storage, Self::DEFAULT_WRITE_CACHE_SIZE)
    }

    pub fn with_write_cache_size(storage: Box<dyn Storage>, write_cache_size: usize) -> Self {
        CachingStorage {
            storage,
            cache: None,
            modified_count: 0,
            write_cache_size: write_cache_size.max(1),
        }
    }

    /// Writes not yet handed to the wrapped backend
    pub fn pending_writes(&self) -> usize {
        self.modified_count
    }

    pub fn flush(&mut self) -> Result<()> {
        if self.modified_count > 0 {
            if let Some(data) = &self.cache {
                debug!(writes = self.modified_count, "flushing write cache");
                self.storage.write(data)?;
            }
            self.modified_count = 0;
        }
        Ok(())
    }
}

impl Storage for CachingStorage {
    fn read(&mut self) -> Result<Option<StoreData>> {
        if self.cache.is_none() {
            self.cache = self.storage.read()?;
        }
        Ok(self.cache.clone())
    }

    fn write(&mut self, data: &StoreData) -> Result<()> {
        self.cache = Some(data.clone());
        self.modified_count += 1;

        if self.modified_count >= self.write_cache_size {
            self.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.storage.close()
    }
}
