use std::collections::BTreeMap;
use tracing::debug;
use crate::core::error::Result;
use crate::core::types::{into_record, Record, RecordId, Value};
use crate::query::cache::{BoundedCache, CacheStats};
use crate::query::predicate::{Predicate, PredicateKey};
use crate::storage::proxy::StorageProxy;

/// Identities touched by a remove/update, plus the records as they are
/// after the write (empty for removals)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Processed {
    pub ids: Vec<RecordId>,
    pub records: Vec<Record>,
}

enum Selection<'a> {
    Ids(&'a [RecordId]),
    Matching(&'a Predicate),
}

/// One named collection of records.
///
/// Every operation reads the table's full record set through the proxy,
/// works on that copy and writes the whole set back. Search results are
/// memoized per predicate identity and dropped on every successful write.
pub struct Table {
    storage: StorageProxy,
    last_id: RecordId,
    query_cache: BoundedCache<PredicateKey, Vec<Record>>,
}

impl Table {
    pub fn open(storage: StorageProxy, cache_size: usize) -> Result<Self> {
        let data = storage.read()?;
        let last_id = data.keys().next_back().copied().unwrap_or(RecordId(0));

        Ok(Table {
            storage,
            last_id,
            query_cache: BoundedCache::new(cache_size),
        })
    }

    pub fn name(&self) -> &str {
        self.storage.table_name()
    }

    pub fn id_field(&self) -> &str {
        self.storage.id_field()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// All records in identity order
    pub fn all(&self) -> Result<Vec<Record>> {
        Ok(self.read()?.into_values().collect())
    }

    pub fn clear_cache(&mut self) {
        self.query_cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.query_cache.stats()
    }

    fn read(&self) -> Result<BTreeMap<RecordId, Record>> {
        self.storage.read()
    }

    // Cache is only invalidated once the backend accepted the write
    fn write(&mut self, records: Vec<Record>) -> Result<()> {
        let count = records.len();
        self.storage.write(records)?;
        self.query_cache.clear();
        debug!(table = self.name(), records = count, "table written");
        Ok(())
    }

    fn stamp(&self, record: &mut Record, id: RecordId) {
        record.insert(self.id_field().to_string(), id.into());
    }

    /// Store a new record under the next identity and return it
    pub fn insert(&mut self, value: Value) -> Result<Record> {
        let mut record = into_record(value)?;
        let mut records: Vec<Record> = self.read()?.into_values().collect();

        let id = self.last_id.next()?;
        self.stamp(&mut record, id);
        records.push(record.clone());

        self.write(records)?;
        self.last_id = id;
        Ok(record)
    }

    /// Insert several records in one write; identities follow input order
    pub fn insert_multiple(&mut self, values: Vec<Value>) -> Result<Vec<Record>> {
        let mut inserted = values
            .into_iter()
            .map(into_record)
            .collect::<Result<Vec<Record>>>()?;
        let mut records: Vec<Record> = self.read()?.into_values().collect();

        let mut id = self.last_id;
        for record in inserted.iter_mut() {
            id = id.next()?;
            self.stamp(record, id);
            records.push(record.clone());
        }

        self.write(records)?;
        self.last_id = id;
        Ok(inserted)
    }

    fn process_records<F>(&mut self, selection: Selection<'_>, mut apply: F) -> Result<Processed>
    where
        F: FnMut(&mut BTreeMap<RecordId, Record>, RecordId) -> Result<()>,
    {
        let mut data = self.read()?;

        let targets: Vec<RecordId> = match selection {
            Selection::Ids(ids) => ids.iter().copied().filter(|id| data.contains_key(id)).collect(),
            Selection::Matching(cond) => {
                let mut matching = Vec::new();
                for (id, record) in &data {
                    if cond.evaluate(record)? {
                        matching.push(*id);
                    }
                }
                matching
            }
        };

        let mut ids = Vec::with_capacity(targets.len());
        for id in targets {
            if !data.contains_key(&id) {
                continue;
            }
            apply(&mut data, id)?;
            ids.push(id);
        }

        let records = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        self.write(data.into_values().collect())?;

        Ok(Processed { ids, records })
    }

    pub fn remove(&mut self, cond: &Predicate) -> Result<Processed> {
        self.process_records(Selection::Matching(cond), |data, id| {
            data.remove(&id);
            Ok(())
        })
    }

    /// Remove by identity; identities not present are skipped
    pub fn remove_ids(&mut self, ids: &[RecordId]) -> Result<Processed> {
        self.process_records(Selection::Ids(ids), |data, id| {
            data.remove(&id);
            Ok(())
        })
    }

    /// Shallow-merge `fields` into every matching record
    pub fn update(&mut self, fields: Value, cond: &Predicate) -> Result<Processed> {
        let fields = into_record(fields)?;
        self.merge(fields, Selection::Matching(cond))
    }

    pub fn update_ids(&mut self, fields: Value, ids: &[RecordId]) -> Result<Processed> {
        let fields = into_record(fields)?;
        self.merge(fields, Selection::Ids(ids))
    }

    /// Apply `transform` to every matching record in place
    pub fn update_with<F>(&mut self, transform: F, cond: &Predicate) -> Result<Processed>
    where
        F: FnMut(&mut Record) -> Result<()>,
    {
        self.transform(transform, Selection::Matching(cond))
    }

    pub fn update_ids_with<F>(&mut self, transform: F, ids: &[RecordId]) -> Result<Processed>
    where
        F: FnMut(&mut Record) -> Result<()>,
    {
        self.transform(transform, Selection::Ids(ids))
    }

    fn merge(&mut self, mut fields: Record, selection: Selection<'_>) -> Result<Processed> {
        // The identity field is owned by the table
        fields.remove(self.id_field());

        self.process_records(selection, |data, id| {
            if let Some(record) = data.get_mut(&id) {
                for (key, value) in &fields {
                    record.insert(key.clone(), value.clone());
                }
            }
            Ok(())
        })
    }

    fn transform<F>(&mut self, mut transform: F, selection: Selection<'_>) -> Result<Processed>
    where
        F: FnMut(&mut Record) -> Result<()>,
    {
        let id_field = self.id_field().to_string();

        self.process_records(selection, |data, id| {
            if let Some(record) = data.get_mut(&id) {
                transform(record)?;
                record.insert(id_field.clone(), id.into());
            }
            Ok(())
        })
    }

    /// All records matching `cond`, in identity order
    pub fn search(&mut self, cond: &Predicate) -> Result<Vec<Record>> {
        if let Some(cached) = self.query_cache.get(cond.key()) {
            debug!(table = self.storage.table_name(), "query cache hit");
            return Ok(cached.clone());
        }

        let mut matching = Vec::new();
        for record in self.read()?.into_values() {
            if cond.evaluate(&record)? {
                matching.push(record);
            }
        }

        debug!(table = self.name(), matches = matching.len(), "query cache miss");
        self.query_cache.set(cond.key().clone(), matching.clone());
        Ok(matching)
    }

    /// First record matching `cond` in identity order
    pub fn get(&self, cond: &Predicate) -> Result<Option<Record>> {
        for record in self.read()?.into_values() {
            if cond.evaluate(&record)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    pub fn get_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.read()?.remove(&id))
    }

    pub fn count(&mut self, cond: &Predicate) -> Result<usize> {
        Ok(self.search(cond)?.len())
    }

    pub fn contains(&self, cond: &Predicate) -> Result<bool> {
        Ok(self.get(cond)?.is_some())
    }

    /// True if any of `ids` is present
    pub fn contains_ids(&self, ids: &[RecordId]) -> Result<bool> {
        let data = self.read()?;
        Ok(ids.iter().any(|id| data.contains_key(id)))
    }

    /// Drop every record and restart identities at 1
    pub fn purge(&mut self) -> Result<()> {
        self.write(Vec::new())?;
        self.last_id = RecordId(0);
        Ok(())
    }
}
