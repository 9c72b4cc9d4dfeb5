use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use crate::core::error::{Error, ErrorKind, Result};

pub use serde_json::Value;

/// One schema-less document
pub type Record = serde_json::Map<String, Value>;

/// Everything a storage backend persists: table name -> records
pub type StoreData = BTreeMap<String, Vec<Record>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identity after this one; fails once the id space is used up
    pub fn next(&self) -> Result<Self> {
        self.0
            .checked_add(1)
            .map(RecordId)
            .ok_or_else(|| Error::new(ErrorKind::InvalidState, "Record identities exhausted".to_string()))
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::from(id.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read the identity stored under `id_field`
pub fn record_id(record: &Record, id_field: &str) -> Result<RecordId> {
    record
        .get(id_field)
        .and_then(Value::as_u64)
        .map(RecordId)
        .ok_or_else(|| Error::new(
            ErrorKind::Parse,
            format!("Record has no integer '{}' field", id_field),
        ))
}

/// Convert an arbitrary value into a record, rejecting non-mappings
pub fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_argument(format!(
            "Record must be a mapping, got {}",
            type_name(&other)
        ))),
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
