//! Sort ordering for catalog views.
//!
//! Sorting always derives a new ordering over rows; the immutable initial view
//! is never reordered in place by callers (they sort a clone). Stability
//! matters: rows with equal keys keep their relative input order, in both
//! directions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::row::CatalogRow;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Preprocessor applied to both compared values (e.g. case folding).
pub type Normalizer = fn(&Value) -> Value;

/// Case-folding normalizer: lower-cases strings, passes other values through.
pub fn fold_case(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}

/// Stable sort of `rows` by one field.
///
/// Missing values order first; numbers compare numerically, strings
/// lexicographically. Incomparable value pairs compare equal, which keeps the
/// sort total and lets stability preserve input order.
pub fn sort_rows(
    rows: &mut [CatalogRow],
    field: &str,
    direction: Direction,
    normalizer: Option<Normalizer>,
) {
    rows.sort_by(|a, b| {
        let left = key(a, field, normalizer);
        let right = key(b, field, normalizer);
        direction.apply(value_ordering(left.as_ref(), right.as_ref()))
    });
}

fn key(row: &CatalogRow, field: &str, normalizer: Option<Normalizer>) -> Option<Value> {
    let value = row.field_value(field)?;
    Some(match normalizer {
        Some(f) => f(&value),
        None => value,
    })
}

fn value_ordering(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(l)), Some(Value::Number(r))) => {
            match (l.as_f64(), r.as_f64()) {
                (Some(lf), Some(rf)) => lf.partial_cmp(&rf).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        (Some(Value::String(l)), Some(Value::String(r))) => l.cmp(r),
        (Some(Value::Bool(l)), Some(Value::Bool(r))) => l.cmp(r),
        _ => Ordering::Equal,
    }
}
