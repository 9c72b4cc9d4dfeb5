//! Ready-made transforms for `Table::update_with`.

use crate::core::error::{Error, Result};
use crate::core::types::{Record, Value};

/// Remove a field from the record
pub fn delete(field: impl Into<String>) -> impl FnMut(&mut Record) -> Result<()> {
    let field = field.into();
    move |record| {
        record
            .remove(&field)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("Field '{}' not found", field)))
    }
}

/// Set a field, replacing any previous value
pub fn set(field: impl Into<String>, value: impl Into<Value>) -> impl FnMut(&mut Record) -> Result<()> {
    let field = field.into();
    let value = value.into();
    move |record| {
        record.insert(field.clone(), value.clone());
        Ok(())
    }
}

pub fn increment(field: impl Into<String>) -> impl FnMut(&mut Record) -> Result<()> {
    add(field.into(), 1)
}

pub fn decrement(field: impl Into<String>) -> impl FnMut(&mut Record) -> Result<()> {
    add(field.into(), -1)
}

// Integers only; results may move between the i64 and u64 ranges
fn add(field: String, delta: i64) -> impl FnMut(&mut Record) -> Result<()> {
    move |record| {
        let value = record
            .get_mut(&field)
            .ok_or_else(|| Error::not_found(format!("Field '{}' not found", field)))?;

        let current = match (value.as_i64(), value.as_u64()) {
            (Some(n), _) => i128::from(n),
            (None, Some(n)) => i128::from(n),
            _ => return Err(Error::type_mismatch(format!("Field '{}' is not an integer", field))),
        };

        let sum = current + i128::from(delta);
        *value = if let Ok(n) = i64::try_from(sum) {
            Value::from(n)
        } else if let Ok(n) = u64::try_from(sum) {
            Value::from(n)
        } else {
            return Err(Error::invalid_argument(format!("Field '{}' overflows", field)));
        };
        Ok(())
    }
}
