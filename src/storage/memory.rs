use crate::core::error::Result;
use crate::core::types::StoreData;
use crate::storage::backend::Storage;

/// Keeps the store in process memory; gone when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    memory: Option<StoreData>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage { memory: None }
    }
}

impl Storage for MemoryStorage {
    fn read(&mut self) -> Result<Option<StoreData>> {
        Ok(self.memory.clone())
    }

    fn write(&mut self, data: &StoreData) -> Result<()> {
        self.memory = Some(data.clone());
        Ok(())
    }
}
