//! Predicate evaluation over the row set
//!
//! A query predicate is either a field→value mapping (exact match on every
//! listed field) or an arbitrary boolean function of a row. The two shapes
//! are modeled as one tagged variant, `Matcher`, evaluated by a single
//! dispatch. Evaluation is fallible internally — a field matcher applied to
//! a non-object row is a shape mismatch — but the collection API converts
//! evaluation failure into the documented empty result, so queries never
//! crash the caller.

use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// One stored item: a field→value mapping with a primary-key field.
pub type Record = Map<String, Value>;

/// A query predicate.
pub enum Matcher {
    /// Exact match on every listed field.
    Fields(Record),
    /// Arbitrary predicate over the raw row value.
    Func(Box<dyn Fn(&Value) -> bool>),
}

impl Matcher {
    /// Field matcher from any JSON object value.
    ///
    /// Non-object values yield a matcher that matches nothing (an empty
    /// field map matches everything, so this distinction matters).
    pub fn fields(value: Value) -> Self {
        match value {
            Value::Object(map) => Matcher::Fields(map),
            _ => Matcher::Func(Box::new(|_| false)),
        }
    }

    /// Function matcher from a closure.
    pub fn func(f: impl Fn(&Value) -> bool + 'static) -> Self {
        Matcher::Func(Box::new(f))
    }

    /// Evaluate against one row.
    ///
    /// A `Fields` matcher requires the row to be a JSON object; anything
    /// else is a shape mismatch, surfaced as an error for the caller to
    /// swallow per policy.
    pub fn matches(&self, row: &Value) -> Result<bool> {
        match self {
            Matcher::Fields(wanted) => {
                let Some(row) = row.as_object() else {
                    return Err(StoreError::ShapeMismatch(json_kind(row)));
                };
                Ok(wanted.iter().all(|(k, v)| row.get(k) == Some(v)))
            }
            Matcher::Func(f) => Ok(f(row)),
        }
    }

    /// All matching rows, original relative order preserved.
    pub fn filter<'a>(&self, rows: &'a [Value]) -> Result<Vec<&'a Value>> {
        let mut out = Vec::new();
        for row in rows {
            if self.matches(row)? {
                out.push(row);
            }
        }
        Ok(out)
    }

    /// Boolean match mask over the row set, one entry per row.
    pub fn mask(&self, rows: &[Value]) -> Result<Vec<bool>> {
        rows.iter().map(|row| self.matches(row)).collect()
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Matcher::fields(value)
    }
}

impl From<Record> for Matcher {
    fn from(map: Record) -> Self {
        Matcher::Fields(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": 1, "status": "new", "title": "a"}),
            json!({"id": 2, "status": "old", "title": "b"}),
            json!({"id": 3, "status": "new", "title": "c"}),
        ]
    }

    #[test]
    fn test_fields_matcher_exact_match() {
        let rows = rows();
        let matched = Matcher::fields(json!({"status": "new"})).filter(&rows).unwrap();
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0]["id"], json!(1));
        assert_eq!(matched[1]["id"], json!(3));
    }

    #[test]
    fn test_fields_matcher_all_listed_fields_must_match() {
        let rows = rows();
        let matched = Matcher::fields(json!({"status": "new", "title": "c"}))
            .filter(&rows)
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0]["id"], json!(3));
    }

    #[test]
    fn test_empty_fields_matcher_matches_everything() {
        let rows = rows();
        let matched = Matcher::fields(json!({})).filter(&rows).unwrap();
        assert_eq!(matched.len(), 3);
    }

    #[test]
    fn test_func_matcher() {
        let rows = rows();
        let matched = Matcher::func(|row| row["id"].as_i64().unwrap_or(0) > 1)
            .filter(&rows)
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_fields_matcher_on_non_object_row_is_shape_mismatch() {
        let rows = vec![json!({"id": 1}), json!("stray string")];
        let result = Matcher::fields(json!({"id": 1})).filter(&rows);
        assert!(matches!(result, Err(StoreError::ShapeMismatch("string"))));
    }

    #[test]
    fn test_non_object_matcher_value_matches_nothing() {
        let rows = rows();
        let matched = Matcher::fields(json!("status")).filter(&rows).unwrap();
        assert!(matched.is_empty());
    }
}
