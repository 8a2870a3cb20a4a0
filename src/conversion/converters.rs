//! Built-in converters

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::dates;
use crate::model::FieldValue;

/// Why a converter rejected a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("expected {expected}, got {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: String,
    },

    #[error("'{0}' is not a date")]
    InvalidDate(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    Rejected(String),
}

impl ConvertError {
    fn unexpected(expected: &'static str, found: &FieldValue) -> Self {
        ConvertError::UnexpectedValue {
            expected,
            found: found.kind_name().to_string(),
        }
    }
}

/// Bidirectional value transform attached to a storage column.
///
/// Implementations must accept values they have already converted.
pub trait Converter: fmt::Debug + Send + Sync {
    /// Field value -> column value
    fn on_save(&self, value: &FieldValue) -> Result<Value, ConvertError>;

    /// Column value -> field value
    fn on_retrieve(&self, value: &Value) -> Result<FieldValue, ConvertError>;
}

/// Built-in converters.
#[derive(Debug, Clone)]
pub enum Conversion {
    /// `true` <-> `"yes"`; anything else saves as `"no"` and retrieves as `false`
    YesNo,
    /// Date <-> ATOM date string
    DateTime,
    /// Empty strings become null in both directions
    EmptyStringToNull,
    /// Structured value <-> JSON text
    Json,
    Custom(Arc<dyn Converter>),
}

impl Conversion {
    pub fn custom(converter: impl Converter + 'static) -> Self {
        Conversion::Custom(Arc::new(converter))
    }
}

impl PartialEq for Conversion {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Conversion::Custom(a), Conversion::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl Converter for Conversion {
    fn on_save(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match self {
            Conversion::YesNo => Ok(match value {
                FieldValue::Scalar(Value::String(s)) if s == "yes" || s == "no" => {
                    Value::String(s.clone())
                }
                _ if value.as_bool() == Some(true) => Value::from("yes"),
                _ => Value::from("no"),
            }),
            Conversion::DateTime => match value {
                FieldValue::Date(date) => Ok(Value::String(dates::render_atom(date))),
                FieldValue::Scalar(Value::String(s)) => dates::parse_stored(s)
                    .map(|date| Value::String(dates::render_atom(&date)))
                    .ok_or_else(|| ConvertError::InvalidDate(s.clone())),
                other => Err(ConvertError::unexpected("a date", other)),
            },
            Conversion::EmptyStringToNull => match value {
                FieldValue::Scalar(Value::String(s)) if s.is_empty() => Ok(Value::Null),
                other => other
                    .to_json()
                    .ok_or_else(|| ConvertError::unexpected("a scalar", other)),
            },
            Conversion::Json => match value {
                FieldValue::Scalar(Value::String(s)) if is_encoded_json(s) => {
                    Ok(Value::String(s.clone()))
                }
                FieldValue::Scalar(other) => serde_json::to_string(other)
                    .map(Value::String)
                    .map_err(|e| ConvertError::InvalidJson(e.to_string())),
                other => Err(ConvertError::unexpected("a structured value", other)),
            },
            Conversion::Custom(converter) => converter.on_save(value),
        }
    }

    fn on_retrieve(&self, value: &Value) -> Result<FieldValue, ConvertError> {
        match self {
            Conversion::YesNo => Ok(match value {
                Value::Bool(b) => FieldValue::from(*b),
                other => FieldValue::from(other.as_str() == Some("yes")),
            }),
            Conversion::DateTime => {
                let text = value.as_str().ok_or_else(|| ConvertError::UnexpectedValue {
                    expected: "a date string",
                    found: value.to_string(),
                })?;
                dates::parse_stored(text)
                    .map(FieldValue::Date)
                    .ok_or_else(|| ConvertError::InvalidDate(text.to_string()))
            }
            Conversion::EmptyStringToNull => Ok(match value {
                Value::String(s) if s.is_empty() => FieldValue::Null,
                other => FieldValue::scalar(other.clone()),
            }),
            Conversion::Json => match value {
                Value::String(text) => serde_json::from_str::<Value>(text)
                    .map(FieldValue::scalar)
                    .map_err(|e| ConvertError::InvalidJson(e.to_string())),
                other => Ok(FieldValue::scalar(other.clone())),
            },
            Conversion::Custom(converter) => converter.on_retrieve(value),
        }
    }
}

/// Text that already holds an encoded map, list or string. Plain strings
/// and encoded scalars are encoded again so they retrieve with their kind.
fn is_encoded_json(text: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(text),
        Ok(Value::Object(_) | Value::Array(_) | Value::String(_))
    )
}
