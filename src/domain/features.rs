//! Feature-space types: raw rows, the expected column schema and the
//! reconciled feature vector handed to the model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A value in a raw (not yet encoded) row.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Category(String),
}

impl RawValue {
    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Date(_) | Self::Category(_) => None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Date(_) => "date",
            Self::Category(_) => "category",
        }
    }
}

/// Single row of named columns. Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    columns: Vec<(String, RawValue)>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing the value in place if it already exists.
    pub fn push(&mut self, name: impl Into<String>, value: RawValue) {
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.columns.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<RawValue> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(idx).1)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Errors raised while validating a column schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("expected column schema is empty")]
    Empty,

    #[error("expected column schema lists {0:?} more than once")]
    Duplicate(String),
}

/// Ordered feature names the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ExpectedSchema {
    columns: Vec<String>,
}

impl ExpectedSchema {
    /// Build a schema, rejecting empty or duplicated column lists.
    ///
    /// # Errors
    /// Returns `SchemaError` if the list is empty or a name repeats.
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = std::collections::HashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(SchemaError::Duplicate(c.clone()));
            }
        }
        Ok(Self { columns })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

impl TryFrom<Vec<String>> for ExpectedSchema {
    type Error = SchemaError;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<ExpectedSchema> for Vec<String> {
    fn from(schema: ExpectedSchema) -> Self {
        schema.columns
    }
}

/// Single-row model input, aligned with an `ExpectedSchema`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pair up names and values. Both slices come from schema reconciliation.
    pub(crate) fn from_parts(columns: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Failures while turning a raw row into a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("column {0:?} is missing from the input row")]
    MissingColumn(String),

    #[error("column {column:?} must be a {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("column {0:?} holds a value that is not a finite number")]
    NonFinite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_duplicates() {
        let err = ExpectedSchema::new(vec!["Age".into(), "Age".into()]).unwrap_err();
        assert_eq!(err, SchemaError::Duplicate("Age".into()));
        assert_eq!(ExpectedSchema::new(vec![]).unwrap_err(), SchemaError::Empty);
    }

    #[test]
    fn test_schema_deserializes_from_json_array() {
        let schema: ExpectedSchema = serde_json::from_str(r#"["Age", "Credit Score"]"#).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("Credit Score"), Some(1));

        let dup = serde_json::from_str::<ExpectedSchema>(r#"["Age", "Age"]"#);
        assert!(dup.is_err());
    }

    #[test]
    fn test_raw_row_push_replaces_in_place() {
        let mut row = RawRow::new();
        row.push("a", RawValue::Int(1));
        row.push("b", RawValue::Int(2));
        row.push("a", RawValue::Int(3));
        assert_eq!(row.names(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&RawValue::Int(3)));
        assert_eq!(row.remove("a"), Some(RawValue::Int(3)));
        assert!(!row.contains("a"));
    }

    #[test]
    fn test_raw_value_numeric_view() {
        assert_eq!(RawValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(RawValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(RawValue::Category("x".into()).as_f64(), None);
    }
}
