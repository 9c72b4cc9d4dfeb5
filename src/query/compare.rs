use std::cmp::Ordering;
use crate::core::error::{Error, Result};
use crate::core::types::{type_name, Value};
use crate::query::frozen::freeze;

/// Order two values for `<`, `<=`, `>` and `>=`.
///
/// Numbers, strings and booleans order among themselves; arrays order
/// lexicographically. Any other pairing is a type mismatch.
pub fn compare(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                return Ok(a.cmp(&b));
            }
            if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                return Ok(a.cmp(&b));
            }
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(|| mismatch(left, right)),
                _ => Err(mismatch(left, right)),
            }
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if freeze(x) == freeze(y) {
                    continue;
                }
                return compare(x, y);
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(mismatch(left, right)),
    }
}

fn mismatch(left: &Value, right: &Value) -> Error {
    Error::type_mismatch(format!(
        "Cannot order {} against {}",
        type_name(left),
        type_name(right)
    ))
}
