use std::fmt;
use crate::core::types::{Record, Value};

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(i64), // Negative indices count from the end
}

impl PathSegment {
    fn step<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match (self, value) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(index), Value::Array(items)) => {
                let len = items.len() as i64;
                let position = if *index < 0 { len + index } else { *index };
                if position < 0 {
                    return None;
                }
                items.get(position as usize)
            }
            _ => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<i64> for PathSegment {
    fn from(index: i64) -> Self {
        PathSegment::Index(index)
    }
}

/// What a predicate is evaluated against
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Record(&'a Record),
    Value(&'a Value),
}

impl<'a> From<&'a Record> for Target<'a> {
    fn from(record: &'a Record) -> Self {
        Target::Record(record)
    }
}

impl<'a> From<&'a Value> for Target<'a> {
    fn from(value: &'a Value) -> Self {
        Target::Value(value)
    }
}

/// Dotted path into a record, e.g. `address.city` or `tags[0]`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn new() -> Self {
        FieldPath { segments: Vec::new() }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// New path with one more segment; `self` is left untouched
    pub fn join(&self, segment: impl Into<PathSegment>) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        FieldPath { segments }
    }

    /// Walk the path. `None` when a step is missing or not indexable.
    pub fn resolve<'a>(&self, target: Target<'a>) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;

        let start = match target {
            Target::Record(record) => match first {
                PathSegment::Key(key) => record.get(key)?,
                PathSegment::Index(_) => return None,
            },
            Target::Value(value) => first.step(value)?,
        };

        rest.iter().try_fold(start, |current, segment| segment.step(current))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}
