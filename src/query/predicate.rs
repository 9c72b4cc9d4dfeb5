use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;
use regex::Regex;
use crate::core::error::Result;
use crate::core::types::Value;
use crate::query::compare::compare;
use crate::query::frozen::{freeze, Frozen};
use crate::query::path::{FieldPath, Target};

/// Caller-supplied test: resolved value plus extra arguments
pub type TestFn = Arc<dyn Fn(&Value, &[Value]) -> bool + Send + Sync>;

/// Caller-supplied test over a single `any`/`all` element
pub type ElementFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Operator tag in a predicate's hash identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpTag {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Exists,
    Matches,
    MatchesIgnoreCase,
    Search,
    SearchIgnoreCase,
    Test,
    Any,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operand {
    None,
    Literal(Frozen),
    Pattern(String),
    Test { name: String, args: Vec<Frozen> },
    Predicate(Box<PredicateKey>),
}

/// Structural identity of a predicate.
///
/// Built only from construction parameters, so two independently built
/// predicates with the same operator, path and operand share a key.
/// `And`/`Or` store their operands in sorted order, which makes them
/// commutative at the identity level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PredicateKey {
    Field { op: OpTag, path: FieldPath, operand: Operand },
    And(Box<PredicateKey>, Box<PredicateKey>),
    Or(Box<PredicateKey>, Box<PredicateKey>),
    Not(Box<PredicateKey>),
}

impl PredicateKey {
    fn unordered(a: &PredicateKey, b: &PredicateKey) -> (Box<PredicateKey>, Box<PredicateKey>) {
        if a <= b {
            (Box::new(a.clone()), Box::new(b.clone()))
        } else {
            (Box::new(b.clone()), Box::new(a.clone()))
        }
    }
}

#[derive(Clone)]
pub(crate) enum Membership {
    Predicate(Box<Predicate>),
    Test { name: String, func: ElementFn },
    Values(BTreeSet<Frozen>),
}

impl Membership {
    fn operand(&self) -> Operand {
        match self {
            Membership::Predicate(predicate) => Operand::Predicate(Box::new(predicate.key.clone())),
            Membership::Test { name, .. } => Operand::Test { name: name.clone(), args: Vec::new() },
            Membership::Values(values) => Operand::Literal(Frozen::Set(values.clone())),
        }
    }

    fn accepts(&self, item: &Value) -> Result<bool> {
        match self {
            Membership::Predicate(predicate) => predicate.eval(Target::Value(item)),
            Membership::Test { func, .. } => Ok((**func)(item)),
            Membership::Values(values) => Ok(values.contains(&freeze(item))),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Operator {
    Eq(Frozen),
    Ne(Frozen),
    Lt(Value),
    Le(Value),
    Gt(Value),
    Ge(Value),
    Exists,
    Matches { pattern: String, regex: Regex },
    MatchesIgnoreCase { pattern: String, regex: Regex },
    Search { pattern: String, regex: Regex },
    SearchIgnoreCase { pattern: String, regex: Regex },
    Test { name: String, func: TestFn, args: Vec<Value> },
    Any(Membership),
    All(Membership),
}

impl Operator {
    fn tag(&self) -> OpTag {
        match self {
            Operator::Eq(_) => OpTag::Eq,
            Operator::Ne(_) => OpTag::Ne,
            Operator::Lt(_) => OpTag::Lt,
            Operator::Le(_) => OpTag::Le,
            Operator::Gt(_) => OpTag::Gt,
            Operator::Ge(_) => OpTag::Ge,
            Operator::Exists => OpTag::Exists,
            Operator::Matches { .. } => OpTag::Matches,
            Operator::MatchesIgnoreCase { .. } => OpTag::MatchesIgnoreCase,
            Operator::Search { .. } => OpTag::Search,
            Operator::SearchIgnoreCase { .. } => OpTag::SearchIgnoreCase,
            Operator::Test { .. } => OpTag::Test,
            Operator::Any(_) => OpTag::Any,
            Operator::All(_) => OpTag::All,
        }
    }

    fn operand(&self) -> Operand {
        match self {
            Operator::Eq(frozen) | Operator::Ne(frozen) => Operand::Literal(frozen.clone()),
            Operator::Lt(rhs) | Operator::Le(rhs) | Operator::Gt(rhs) | Operator::Ge(rhs) => {
                Operand::Literal(freeze(rhs))
            }
            Operator::Exists => Operand::None,
            Operator::Matches { pattern, .. }
            | Operator::MatchesIgnoreCase { pattern, .. }
            | Operator::Search { pattern, .. }
            | Operator::SearchIgnoreCase { pattern, .. } => Operand::Pattern(pattern.clone()),
            Operator::Test { name, args, .. } => Operand::Test {
                name: name.clone(),
                args: args.iter().map(freeze).collect(),
            },
            Operator::Any(membership) | Operator::All(membership) => membership.operand(),
        }
    }

    /// Apply the terminal test to an already-resolved value
    fn apply(&self, value: &Value) -> Result<bool> {
        match self {
            Operator::Eq(rhs) => Ok(freeze(value) == *rhs),
            Operator::Ne(rhs) => Ok(freeze(value) != *rhs),
            Operator::Lt(rhs) => Ok(compare(value, rhs)? == Ordering::Less),
            Operator::Le(rhs) => Ok(compare(value, rhs)? != Ordering::Greater),
            Operator::Gt(rhs) => Ok(compare(value, rhs)? == Ordering::Greater),
            Operator::Ge(rhs) => Ok(compare(value, rhs)? != Ordering::Less),
            Operator::Exists => Ok(true),
            Operator::Matches { regex, .. }
            | Operator::MatchesIgnoreCase { regex, .. }
            | Operator::Search { regex, .. }
            | Operator::SearchIgnoreCase { regex, .. } => {
                Ok(value.as_str().is_some_and(|text| regex.is_match(text)))
            }
            Operator::Test { func, args, .. } => Ok((**func)(value, args)),
            Operator::Any(membership) => {
                let Some(items) = elements(value) else {
                    return Ok(false);
                };
                for item in &items {
                    if membership.accepts(item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Operator::All(membership) => {
                let Some(items) = elements(value) else {
                    return Ok(false);
                };
                match membership {
                    // Every listed value must be present
                    Membership::Values(values) => {
                        let present: BTreeSet<Frozen> = items.iter().map(|item| freeze(item)).collect();
                        Ok(values.iter().all(|wanted| present.contains(wanted)))
                    }
                    _ => {
                        for item in &items {
                            if !membership.accepts(item)? {
                                return Ok(false);
                            }
                        }
                        Ok(true)
                    }
                }
            }
        }
    }
}

/// Iterable view of a value: array items, mapping keys, or the characters
/// of a string as one-character strings
fn elements(value: &Value) -> Option<Vec<Cow<'_, Value>>> {
    match value {
        Value::Array(items) => Some(items.iter().map(Cow::Borrowed).collect()),
        Value::String(text) => Some(
            text.chars().map(|c| Cow::Owned(Value::String(c.to_string()))).collect()
        ),
        Value::Object(map) => Some(
            map.keys().map(|key| Cow::Owned(Value::String(key.clone()))).collect()
        ),
        _ => None,
    }
}

#[derive(Clone)]
enum Node {
    Field { path: FieldPath, op: Operator },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

/// A composable, hashable test over a record.
///
/// Equality and hashing go through [`PredicateKey`] only; the test
/// functions inside never take part.
#[derive(Clone)]
pub struct Predicate {
    node: Node,
    key: PredicateKey,
}

impl Predicate {
    pub(crate) fn field(path: FieldPath, op: Operator) -> Self {
        let key = PredicateKey::Field {
            op: op.tag(),
            path: path.clone(),
            operand: op.operand(),
        };
        Predicate {
            node: Node::Field { path, op },
            key,
        }
    }

    pub fn key(&self) -> &PredicateKey {
        &self.key
    }

    pub fn and(self, other: Predicate) -> Predicate {
        let (a, b) = PredicateKey::unordered(&self.key, &other.key);
        Predicate {
            key: PredicateKey::And(a, b),
            node: Node::And(Box::new(self), Box::new(other)),
        }
    }

    pub fn or(self, other: Predicate) -> Predicate {
        let (a, b) = PredicateKey::unordered(&self.key, &other.key);
        Predicate {
            key: PredicateKey::Or(a, b),
            node: Node::Or(Box::new(self), Box::new(other)),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate {
            key: PredicateKey::Not(Box::new(self.key.clone())),
            node: Node::Not(Box::new(self)),
        }
    }

    /// Evaluate against a record or a bare value.
    ///
    /// A path that does not resolve makes a field test false. Ordering
    /// comparisons between incompatible types fail with `TypeMismatch`.
    pub fn evaluate<'a>(&self, target: impl Into<Target<'a>>) -> Result<bool> {
        self.eval(target.into())
    }

    fn eval(&self, target: Target<'_>) -> Result<bool> {
        match &self.node {
            Node::Field { path, op } => match path.resolve(target) {
                Some(value) => op.apply(value),
                None => Ok(false),
            },
            Node::And(left, right) => Ok(left.eval(target)? && right.eval(target)?),
            Node::Or(left, right) => Ok(left.eval(target)? || right.eval(target)?),
            Node::Not(inner) => Ok(!inner.eval(target)?),
        }
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Predicate{:?}", self.key)
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::query::builder::{field, Condition, Query};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn and_or_are_commutative_by_identity() {
        let a = field("age").gt(5).unwrap();
        let b = field("name").eq("x").unwrap();

        assert_eq!(a.clone() & b.clone(), b.clone() & a.clone());
        assert_eq!(a.clone() | b.clone(), b.clone() | a.clone());
        assert_ne!(a.clone() & b.clone(), a.clone() | b.clone());
        assert_ne!(!a.clone(), a);
    }

    #[test]
    fn identity_ignores_closure_instances() {
        let first = field("n").test("even", |v, _| v.as_i64().is_some_and(|n| n % 2 == 0), vec![]).unwrap();
        let second = field("n").test("even", |_, _| false, vec![]).unwrap();
        assert_eq!(first, second);

        let mut seen = HashSet::new();
        seen.insert(first);
        assert!(seen.contains(&second));
    }

    #[test]
    fn different_operators_never_collide() {
        let keys: HashSet<PredicateKey> = [
            field("v").eq(1).unwrap(),
            field("v").ne(1).unwrap(),
            field("v").lt(1).unwrap(),
            field("v").le(1).unwrap(),
            field("v").gt(1).unwrap(),
            field("v").ge(1).unwrap(),
            field("v").exists().unwrap(),
            field("v").matches("a").unwrap(),
            field("v").matches_ignore_case("a").unwrap(),
            field("v").search("a").unwrap(),
            field("v").search_ignore_case("a").unwrap(),
        ]
        .iter()
        .map(|p| p.key().clone())
        .collect();
        assert_eq!(keys.len(), 11);
    }

    #[test]
    fn missing_path_is_false_not_an_error() {
        let record = json!({"name": "a"});
        for predicate in [
            field("age").gt(5).unwrap(),
            field("age").eq(5).unwrap(),
            field("age").exists().unwrap(),
            field("age").matches(".*").unwrap(),
            field("name").field("first").eq("a").unwrap(),
        ] {
            assert!(!predicate.evaluate(&record).unwrap(), "{:?}", predicate);
        }
    }

    #[test]
    fn ordering_type_mismatch_propagates() {
        let record = json!({"age": "old"});
        let err = field("age").gt(5).unwrap().evaluate(&record).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn equality_is_structural() {
        let record = json!({"meta": {"b": [1, 2], "a": 1.0}});
        assert!(field("meta").eq(json!({"a": 1, "b": [1, 2]})).unwrap().evaluate(&record).unwrap());
        assert!(field("meta").ne(json!({"a": 1, "b": [2, 1]})).unwrap().evaluate(&record).unwrap());
    }

    #[test]
    fn regex_operators() {
        let record = json!({"name": "John Smith", "n": 1});
        assert!(field("name").matches("John").unwrap().evaluate(&record).unwrap());
        assert!(!field("name").matches("Smith").unwrap().evaluate(&record).unwrap());
        assert!(field("name").search("Smith").unwrap().evaluate(&record).unwrap());
        assert!(field("name").matches_ignore_case("john").unwrap().evaluate(&record).unwrap());
        assert!(field("name").search_ignore_case("SMITH").unwrap().evaluate(&record).unwrap());
        assert!(!field("name").search("smith").unwrap().evaluate(&record).unwrap());
        assert!(!field("n").search("1").unwrap().evaluate(&record).unwrap());
    }

    #[test]
    fn any_and_all() {
        let record = json!({
            "tags": ["rust", "db"],
            "groups": [{"name": "admin"}, {"name": "user"}],
            "n": 4
        });

        assert!(field("tags").any(vec![json!("db"), json!("web")]).unwrap().evaluate(&record).unwrap());
        assert!(!field("tags").any(vec![json!("web")]).unwrap().evaluate(&record).unwrap());
        assert!(field("tags").all(vec![json!("db"), json!("rust")]).unwrap().evaluate(&record).unwrap());
        assert!(!field("tags").all(vec![json!("db"), json!("web")]).unwrap().evaluate(&record).unwrap());

        let admin = Query::new().field("name").eq("admin").unwrap();
        assert!(field("groups").any(admin.clone()).unwrap().evaluate(&record).unwrap());
        assert!(!field("groups").all(admin).unwrap().evaluate(&record).unwrap());

        assert!(!field("n").any(vec![json!(4)]).unwrap().evaluate(&record).unwrap());
    }

    #[test]
    fn element_functions_test_scalars() {
        let record = json!({"scores": [1, 7], "empty": []});
        let high = || Condition::test("high", |v| v.as_i64().is_some_and(|n| n > 5));
        let positive = || Condition::test("positive", |v| v.as_i64().is_some_and(|n| n > 0));

        assert!(field("scores").any(high()).unwrap().evaluate(&record).unwrap());
        assert!(!field("scores").all(high()).unwrap().evaluate(&record).unwrap());
        assert!(field("scores").all(positive()).unwrap().evaluate(&record).unwrap());
        assert!(!field("empty").any(positive()).unwrap().evaluate(&record).unwrap());
        assert!(field("empty").all(positive()).unwrap().evaluate(&record).unwrap());
    }

    #[test]
    fn strings_iterate_characters() {
        let record = json!({"code": "abc"});
        assert!(field("code").any(vec![json!("b"), json!("z")]).unwrap().evaluate(&record).unwrap());
        assert!(field("code").all(vec![json!("a"), json!("c")]).unwrap().evaluate(&record).unwrap());
        assert!(!field("code").all(vec![json!("a"), json!("z")]).unwrap().evaluate(&record).unwrap());

        let lower = Condition::test("lower", |v| v.as_str().is_some_and(|c| c.chars().all(char::is_lowercase)));
        assert!(field("code").all(lower).unwrap().evaluate(&record).unwrap());
    }

    #[test]
    fn custom_test_receives_arguments() {
        let record = json!({"score": 42});
        let between = |v: &Value, args: &[Value]| {
            let (Some(n), Some(lo), Some(hi)) = (v.as_i64(), args[0].as_i64(), args[1].as_i64()) else {
                return false;
            };
            lo <= n && n <= hi
        };
        let p = field("score").test("between", between, vec![json!(40), json!(50)]).unwrap();
        assert!(p.evaluate(&record).unwrap());

        let q = field("score").test("between", between, vec![json!(0), json!(10)]).unwrap();
        assert!(!q.evaluate(&record).unwrap());
        assert_ne!(p, q);
    }

    #[test]
    fn combinators_evaluate() {
        let record = json!({"a": 1, "b": 2});
        let a = field("a").eq(1).unwrap();
        let b = field("b").eq(3).unwrap();
        assert!(!(a.clone() & b.clone()).evaluate(&record).unwrap());
        assert!((a.clone() | b.clone()).evaluate(&record).unwrap());
        assert!((!b).evaluate(&record).unwrap());
        assert!(!(!a).evaluate(&record).unwrap());
    }
}
