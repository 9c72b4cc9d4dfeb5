use std::sync::Arc;
use regex::RegexBuilder;
use crate::core::error::{Error, Result};
use crate::core::types::Value;
use crate::query::frozen::{freeze, freeze_set};
use crate::query::path::{FieldPath, PathSegment};
use crate::query::predicate::{ElementFn, Membership, Operator, Predicate};

/// Operand of `any` / `all`: a nested predicate applied to each element,
/// a named function applied to each element, or a literal collection
/// tested for membership
pub enum Condition {
    Predicate(Predicate),
    Test { name: String, func: ElementFn },
    Values(Vec<Value>),
}

impl From<Predicate> for Condition {
    fn from(predicate: Predicate) -> Self {
        Condition::Predicate(predicate)
    }
}

impl From<Vec<Value>> for Condition {
    fn from(values: Vec<Value>) -> Self {
        Condition::Values(values)
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => Condition::Values(values),
            other => Condition::Values(vec![other]),
        }
    }
}

impl Condition {
    /// Test each element with `func`; the same identity caveat as
    /// [`Query::test`] applies to `name`
    pub fn test<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Condition::Test { name: name.to_string(), func: Arc::new(func) }
    }

    fn into_membership(self) -> Membership {
        match self {
            Condition::Predicate(predicate) => Membership::Predicate(Box::new(predicate)),
            Condition::Test { name, func } => Membership::Test { name, func },
            Condition::Values(values) => Membership::Values(freeze_set(&values)),
        }
    }
}

/// Immutable query builder.
///
/// Every step returns a new `Query`, so a base query can be extended in
/// several directions:
///
/// ```
/// use inkdb::query::builder::field;
///
/// let user = field("user");
/// let adult = user.field("age").ge(18).unwrap();
/// let named = user.field("name").exists().unwrap();
/// assert_ne!(adult, named);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    path: FieldPath,
}

/// Start a query at a top-level field
pub fn field(name: impl Into<String>) -> Query {
    Query::new().field(name)
}

impl Query {
    pub fn new() -> Self {
        Query { path: FieldPath::new() }
    }

    pub fn field(&self, name: impl Into<String>) -> Query {
        Query { path: self.path.join(PathSegment::Key(name.into())) }
    }

    pub fn index(&self, index: i64) -> Query {
        Query { path: self.path.join(PathSegment::Index(index)) }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    fn finish(&self, op: Operator) -> Result<Predicate> {
        self.ensure_path()?;
        Ok(Predicate::field(self.path.clone(), op))
    }

    fn ensure_path(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::invalid_argument("Query has no path"));
        }
        Ok(())
    }

    pub fn eq(&self, rhs: impl Into<Value>) -> Result<Predicate> {
        self.finish(Operator::Eq(freeze(&rhs.into())))
    }

    pub fn ne(&self, rhs: impl Into<Value>) -> Result<Predicate> {
        self.finish(Operator::Ne(freeze(&rhs.into())))
    }

    pub fn lt(&self, rhs: impl Into<Value>) -> Result<Predicate> {
        self.finish(Operator::Lt(rhs.into()))
    }

    pub fn le(&self, rhs: impl Into<Value>) -> Result<Predicate> {
        self.finish(Operator::Le(rhs.into()))
    }

    pub fn gt(&self, rhs: impl Into<Value>) -> Result<Predicate> {
        self.finish(Operator::Gt(rhs.into()))
    }

    pub fn ge(&self, rhs: impl Into<Value>) -> Result<Predicate> {
        self.finish(Operator::Ge(rhs.into()))
    }

    /// True whenever the path resolves, whatever the value
    pub fn exists(&self) -> Result<Predicate> {
        self.finish(Operator::Exists)
    }

    /// Regex match anchored at the start of a string value
    pub fn matches(&self, pattern: &str) -> Result<Predicate> {
        self.ensure_path()?;
        let regex = RegexBuilder::new(&format!("^(?:{})", pattern)).build()?;
        self.finish(Operator::Matches { pattern: pattern.to_string(), regex })
    }

    pub fn matches_ignore_case(&self, pattern: &str) -> Result<Predicate> {
        self.ensure_path()?;
        let regex = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(true)
            .build()?;
        self.finish(Operator::MatchesIgnoreCase { pattern: pattern.to_string(), regex })
    }

    /// Regex search anywhere in a string value
    pub fn search(&self, pattern: &str) -> Result<Predicate> {
        self.ensure_path()?;
        let regex = RegexBuilder::new(pattern).build()?;
        self.finish(Operator::Search { pattern: pattern.to_string(), regex })
    }

    pub fn search_ignore_case(&self, pattern: &str) -> Result<Predicate> {
        self.ensure_path()?;
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.finish(Operator::SearchIgnoreCase { pattern: pattern.to_string(), regex })
    }

    /// Apply a caller function to the resolved value.
    ///
    /// Only `name` stands in for the function in the predicate's identity.
    /// Two tests with the same name, path and arguments are equal even when
    /// their functions differ, so a table search with one can return the
    /// cached results of the other. Give distinct functions distinct names.
    pub fn test<F>(&self, name: &str, func: F, args: Vec<Value>) -> Result<Predicate>
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.finish(Operator::Test {
            name: name.to_string(),
            func: Arc::new(func),
            args,
        })
    }

    /// At least one element matches.
    ///
    /// Elements are the items of an array, the keys of a mapping or the
    /// characters of a string; any other value makes the predicate false.
    pub fn any(&self, condition: impl Into<Condition>) -> Result<Predicate> {
        self.finish(Operator::Any(condition.into().into_membership()))
    }

    /// Every element matches the predicate, or every listed value is present
    pub fn all(&self, condition: impl Into<Condition>) -> Result<Predicate> {
        self.finish(Operator::All(condition.into().into_membership()))
    }
}
