use std::collections::{BTreeMap, BTreeSet};
use serde_json::Number;
use crate::core::types::Value;

/// Deep-immutable, hashable form of a literal operand.
///
/// Two literals freeze to equal values exactly when they are structurally
/// equal: mappings compare by their sorted entries, sequences by position,
/// sets by membership. Numbers are normalized so that `1` and `1.0` freeze
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Frozen {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),  // Only for integers above i64::MAX
    Float(u64), // IEEE-754 bits of a non-integral float
    String(String),
    Seq(Vec<Frozen>),
    Map(BTreeMap<String, Frozen>),
    Set(BTreeSet<Frozen>),
}

impl From<&Value> for Frozen {
    fn from(value: &Value) -> Self {
        freeze(value)
    }
}

pub fn freeze(value: &Value) -> Frozen {
    match value {
        Value::Null => Frozen::Null,
        Value::Bool(b) => Frozen::Bool(*b),
        Value::Number(n) => freeze_number(n),
        Value::String(s) => Frozen::String(s.clone()),
        Value::Array(items) => Frozen::Seq(items.iter().map(freeze).collect()),
        Value::Object(map) => Frozen::Map(
            map.iter().map(|(k, v)| (k.clone(), freeze(v))).collect()
        ),
    }
}

/// Freeze a collection whose order and multiplicity do not matter
pub fn freeze_set<'a, I>(values: I) -> BTreeSet<Frozen>
where
    I: IntoIterator<Item = &'a Value>,
{
    values.into_iter().map(freeze).collect()
}

fn freeze_number(n: &Number) -> Frozen {
    if let Some(i) = n.as_i64() {
        return Frozen::Int(i);
    }
    if let Some(u) = n.as_u64() {
        return Frozen::UInt(u);
    }

    let f = n.as_f64().unwrap_or(f64::NAN);
    // `i64::MAX as f64` and `u64::MAX as f64` round up to 2^63 and 2^64
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Frozen::Int(f as i64)
    } else if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
        Frozen::UInt(f as u64)
    } else {
        Frozen::Float(f.to_bits())
    }
}
