use std::collections::BTreeMap;
use crate::core::error::Result;
use crate::core::types::{record_id, Record, RecordId};
use crate::storage::backend::{SharedStorage, Storage};

/// One table's view of the shared backend
#[derive(Clone)]
pub struct StorageProxy {
    storage: SharedStorage,
    table_name: String,
    id_field: String,
}

impl StorageProxy {
    pub fn new(storage: SharedStorage, table_name: impl Into<String>, id_field: impl Into<String>) -> Self {
        StorageProxy {
            storage,
            table_name: table_name.into(),
            id_field: id_field.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Current records keyed by identity. A table not yet in the store is
    /// persisted empty on first read.
    pub fn read(&self) -> Result<BTreeMap<RecordId, Record>> {
        let mut storage = self.storage.lock();
        let mut data = storage.read()?.unwrap_or_default();

        match data.remove(&self.table_name) {
            Some(records) => records
                .into_iter()
                .map(|record| Ok((record_id(&record, &self.id_field)?, record)))
                .collect(),
            None => {
                data.insert(self.table_name.clone(), Vec::new());
                storage.write(&data)?;
                Ok(BTreeMap::new())
            }
        }
    }

    /// Replace this table's records, leaving other tables untouched
    pub fn write(&self, records: Vec<Record>) -> Result<()> {
        let mut storage = self.storage.lock();
        let mut data = storage.read()?.unwrap_or_default();
        data.insert(self.table_name.clone(), records);
        storage.write(&data)
    }

    pub fn purge_table(&self) -> Result<()> {
        let mut storage = self.storage.lock();
        if let Some(mut data) = storage.read()? {
            if data.remove(&self.table_name).is_some() {
                storage.write(&data)?;
            }
        }
        Ok(())
    }
}
