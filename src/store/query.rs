//! # Query Expressions
//!
//! Filter, sort and page descriptions understood by the collection.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use super::{Document, RawDocument};

/// Name of the identifier field; it lives on [`RawDocument::id`], not in the fields
pub const ID_FIELD: &str = "_id";

/// How a condition tests its field
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Unanchored pattern search over a text field
    Pattern(Regex),

    /// Exact value equality
    Equals(Value),
}

/// A single field condition
#[derive(Debug, Clone)]
pub struct Condition {
    /// Field to test
    pub field: String,

    /// Test applied to the field value
    pub predicate: Predicate,
}

impl Condition {
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    /// Create a pattern condition
    pub fn pattern(field: impl Into<String>, regex: Regex) -> Self {
        Self::new(field, Predicate::Pattern(regex))
    }

    /// Create an equality condition
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, Predicate::Equals(value))
    }

    /// Check if a document satisfies this condition.
    ///
    /// An absent field never satisfies a pattern; it satisfies equality only
    /// against `null`.
    pub fn matches(&self, doc: &Document) -> bool {
        let field_value = match doc.get(&self.field) {
            Some(v) => v,
            None => {
                return matches!(&self.predicate, Predicate::Equals(Value::Null));
            }
        };

        match &self.predicate {
            Predicate::Pattern(regex) => field_value
                .as_str()
                .map(|text| regex.is_match(text))
                .unwrap_or(false),
            Predicate::Equals(expected) => values_equal(field_value, expected),
        }
    }
}

/// Numbers compare by value so `1965` equals `1965.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Conditions combined with AND
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter with no conditions; matches every document
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check if a document matches all conditions
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `"asc"` sorts ascending; any other token sorts descending
    pub fn from_token(token: &str) -> Self {
        if token == "asc" {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Order two documents by the sort field
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        self.directed(compare_values(a.get(&self.field), b.get(&self.field)))
    }

    /// Order two stored documents. Sorting on `_id` compares record ids,
    /// which order by creation time.
    pub fn compare_stored(&self, a: &RawDocument, b: &RawDocument) -> Ordering {
        if self.field == ID_FIELD {
            self.directed(a.id.cmp(&b.id))
        } else {
            self.compare(&a.fields, &b.fields)
        }
    }

    fn directed(&self, cmp: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    }
}

/// Skip/limit pair.
///
/// `limit == 0` means unlimited and a negative limit acts as its absolute
/// value. A negative skip is rejected by the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// Every matching document
    pub fn unbounded() -> Self {
        Self { skip: 0, limit: 0 }
    }

    /// Maximum number of documents to return, `None` for no cap
    pub fn effective_limit(&self) -> Option<usize> {
        match self.limit.unsigned_abs() {
            0 => None,
            n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }
}

/// Rank of a value's type in the cross-type sort order
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Compare two optional JSON values for sorting
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
