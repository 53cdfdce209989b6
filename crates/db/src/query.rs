//! Query primitives understood by every document store.

use std::cmp::Ordering;

use serde_json::Value;

use crate::store::Document;

/// A single field-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Field equals the given JSON value exactly.
    Eq { field: String, value: Value },
    /// Field is a number less than or equal to `value`.
    Lte { field: String, value: f64 },
}

impl Clause {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Clause::Eq { field, value } => document.get(field) == Some(value),
            Clause::Lte { field, value } => document
                .get(field)
                .and_then(Value::as_f64)
                .is_some_and(|actual| actual <= *value),
        }
    }
}

/// Conjunction of clauses. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match clause.
    pub fn with_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add an upper-bound clause (`field <= value`).
    pub fn with_lte(mut self, field: impl Into<String>, value: f64) -> Self {
        self.clauses.push(Clause::Lte {
            field: field.into(),
            value,
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether `document` satisfies every clause.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|clause| clause.matches(document))
    }
}

/// Sort direction for a [`SortSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Ordering directive: one field plus a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: Direction,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Compare two documents on this directive's field.
    pub fn compare(&self, left: &Document, right: &Document) -> Ordering {
        let ordering = compare_values(left.get(&self.field), right.get(&self.field));
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Sort, skip and limit applied to a `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<SortSpec>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn sorted(sort: Option<SortSpec>) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn page(skip: u64, limit: u64) -> Self {
        Self {
            sort: None,
            skip,
            limit: Some(limit),
        }
    }
}

/// Type rank used when comparing heterogeneous values:
/// missing/null < bool < number < string < array < object.
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}
