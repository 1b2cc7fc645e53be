//! # Predicate Language
//!
//! A small, storage-agnostic boolean condition over the fields of an entity.
//! Repositories receive a `Predicate` in `find` and evaluate it in the store:
//! the SQLite backend compiles it into a parameterised `WHERE` clause and the
//! memory backend evaluates it row by row.
//!
//! Both evaluations follow SQL three-valued logic. Any comparison involving
//! NULL is *unknown*, `NOT unknown` stays unknown, and a row matches only when
//! the whole condition is *true*.

use std::cmp::Ordering;
use std::fmt::Debug;

/// A column of an entity that predicates can refer to.
pub trait Field: Copy + Debug + Send + Sync + 'static {
    /// Column name in the relational schema
    fn column(&self) -> &'static str;
}

/// Anything a predicate can be evaluated against in memory.
pub trait Record<F: Field> {
    fn value(&self, field: F) -> Value;
}

/// A scalar value as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// SQLite stores booleans as integers and orders every integer before any text.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (Some(_), None) => match other {
                Value::Text(_) => Some(Ordering::Less),
                _ => None,
            },
            (None, Some(_)) => match self {
                Value::Text(_) => Some(Ordering::Greater),
                _ => None,
            },
            (None, None) => match (self, other) {
                (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
                _ => None,
            },
        }
    }

    fn numeric(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Composable boolean condition over the fields `F` of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<F> {
    /// Matches every row
    Always,
    Compare { field: F, op: CompareOp, value: Value },
    /// Case-sensitive substring match on a text column
    Contains { field: F, needle: String },
    IsNull(F),
    And(Box<Predicate<F>>, Box<Predicate<F>>),
    Or(Box<Predicate<F>>, Box<Predicate<F>>),
    Not(Box<Predicate<F>>),
}

impl<F: Field> Predicate<F> {
    pub fn compare(field: F, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field,
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: F, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn ne(field: F, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    pub fn lt(field: F, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    pub fn le(field: F, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Le, value)
    }

    pub fn gt(field: F, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    pub fn ge(field: F, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ge, value)
    }

    pub fn contains(field: F, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field,
            needle: needle.into(),
        }
    }

    pub fn is_null(field: F) -> Self {
        Predicate::IsNull(field)
    }

    /// Conjunction; `Always` is the identity and is folded away.
    pub fn and(self, other: Predicate<F>) -> Self {
        match (self, other) {
            (Predicate::Always, other) => other,
            (this, Predicate::Always) => this,
            (this, other) => Predicate::And(Box::new(this), Box::new(other)),
        }
    }

    pub fn or(self, other: Predicate<F>) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// True when the record satisfies the predicate (unknown counts as no match).
    pub fn matches<R: Record<F>>(&self, record: &R) -> bool {
        self.evaluate(record) == Some(true)
    }

    /// Three-valued evaluation: `None` is SQL's *unknown*.
    pub fn evaluate<R: Record<F>>(&self, record: &R) -> Option<bool> {
        match self {
            Predicate::Always => Some(true),
            Predicate::Compare { field, op, value } => record
                .value(*field)
                .compare(value)
                .map(|ordering| op.holds(ordering)),
            Predicate::Contains { field, needle } => match record.value(*field) {
                Value::Text(text) => Some(text.contains(needle.as_str())),
                Value::Null => None,
                _ => Some(false),
            },
            Predicate::IsNull(field) => Some(record.value(*field) == Value::Null),
            Predicate::And(left, right) => match (left.evaluate(record), right.evaluate(record)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Predicate::Or(left, right) => match (left.evaluate(record), right.evaluate(record)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Predicate::Not(inner) => inner.evaluate(record).map(|matched| !matched),
        }
    }
}
