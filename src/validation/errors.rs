//! Aggregated validation errors
//!
//! A [`ValidationErrorSet`] maps each field to the ordered list of failures
//! recorded against it during one enforcement pass. The set is raised once,
//! wrapped in an [`AggregatedValidationError`], after every field has been
//! checked.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One validator failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub field: String,
    /// The offending input value (`null` when the field was absent)
    pub value: Value,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field name -> ordered failures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrorSet {
    errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure against `field`, after any already recorded.
    pub fn add_error(&mut self, message: impl Into<String>, field: &str, value: Value) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(FieldError {
                message: message.into(),
                field: field.to_string(),
                value,
            });
    }

    /// Appends every failure of `other`, keeping per-field order.
    pub fn merge(&mut self, other: ValidationErrorSet) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of failures across all fields
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Failures recorded for `field`, in order.
    pub fn field_errors(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Messages recorded for `field`, in order.
    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.field_errors(field)
            .iter()
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Fields with at least one failure, sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Every field failure from one enforcement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedValidationError {
    type_name: String,
    errors: ValidationErrorSet,
}

impl AggregatedValidationError {
    pub fn new(type_name: impl Into<String>, errors: ValidationErrorSet) -> Self {
        Self {
            type_name: type_name.into(),
            errors,
        }
    }

    /// Type the input was validated against
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrorSet {
        self.errors
    }

    /// Renders the error set as `{field: [{message, field, value}, ...]}`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.errors).unwrap_or(Value::Null)
    }
}

impl fmt::Display for AggregatedValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation failed for {} with {} error(s)",
            self.type_name,
            self.errors.len()
        )?;
        let mut separator = ": ";
        for (_, errors) in self.errors.iter() {
            for error in errors {
                write!(f, "{}{}", separator, error.message)?;
                separator = "; ";
            }
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedValidationError {}
