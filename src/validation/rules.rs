//! Leaf validators
//!
//! Every rule passes `null` except [`Rule::NotNull`]; nullability is a
//! separate concern from the shape of a present value.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;

use crate::dates;

/// A predicate over an input value plus the message reported when it fails.
pub trait Validator: fmt::Debug + Send + Sync {
    /// Returns true if the value is acceptable.
    fn validate(&self, value: &Value) -> bool;

    /// Message reported for `field` when validation fails.
    fn error_message(&self, field: &str) -> String;
}

/// Built-in validators.
#[derive(Debug, Clone)]
pub enum Rule {
    Int,
    Float,
    String,
    Bool,
    /// ISO 8601 date string
    Date,
    NotNull,
    /// Rejects empty and whitespace-only strings
    NotBlank,
    SequentialList,
    MaxLength(usize),
    MinLength(usize),
    Email,
    Phone,
    Zip,
    /// Value must equal one of the listed values
    In(Vec<Value>),
    Custom(Arc<dyn Validator>),
}

impl Rule {
    pub fn custom(validator: impl Validator + 'static) -> Self {
        Rule::Custom(Arc::new(validator))
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rule::MaxLength(a), Rule::MaxLength(b)) => a == b,
            (Rule::MinLength(a), Rule::MinLength(b)) => a == b,
            (Rule::In(a), Rule::In(b)) => a == b,
            (Rule::Custom(a), Rule::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl Validator for Rule {
    fn validate(&self, value: &Value) -> bool {
        if let Rule::NotNull = self {
            return !value.is_null();
        }
        if value.is_null() {
            return true;
        }

        match self {
            Rule::Int => value.is_i64() || value.is_u64(),
            Rule::Float => value.is_number(),
            Rule::String => value.is_string(),
            Rule::Bool => value.is_boolean(),
            Rule::Date => value.as_str().map_or(false, dates::is_iso8601),
            Rule::NotNull => true,
            Rule::NotBlank => value.as_str().map_or(true, |s| !s.trim().is_empty()),
            Rule::SequentialList => value.is_array(),
            Rule::MaxLength(max) => length_of(value) <= *max,
            Rule::MinLength(min) => length_of(value) >= *min,
            Rule::Email => value.as_str().map_or(false, |s| email().is_match(s)),
            Rule::Phone => scalar_text(value).map_or(false, |s| is_phone(&s)),
            Rule::Zip => scalar_text(value).map_or(false, |s| s.chars().count() <= 15),
            Rule::In(allowed) => allowed.contains(value),
            Rule::Custom(validator) => validator.validate(value),
        }
    }

    fn error_message(&self, field: &str) -> String {
        match self {
            Rule::Int => format!("{} must be an integer.", field),
            Rule::Float => format!("{} must be a float.", field),
            Rule::String => format!("{} must be a string.", field),
            Rule::Bool => format!("The {} field must be a bool.", field),
            Rule::Date => format!("The {} field must be a string in ISO8601 date format.", field),
            Rule::NotNull => format!("The {} field must not be null.", field),
            Rule::NotBlank => format!("The {} field must not be blank.", field),
            Rule::SequentialList => format!(
                "The {} field must be a sequential (non-associative) zero-indexed array.",
                field
            ),
            Rule::MaxLength(max) => format!("Maximum length of {} is {} characters.", field, max),
            Rule::MinLength(min) => format!("Minimum length of {} is {} characters.", field, min),
            Rule::Email => format!("{} must be an email address.", field),
            Rule::Phone => format!("{} must be a valid phone number.", field),
            Rule::Zip => format!(
                "The {} field must not be an array and must be no longer than 15 characters.",
                field
            ),
            Rule::In(allowed) => {
                let listed: Vec<String> = allowed.iter().map(display_value).collect();
                format!("{} must be one of these values: {}", field, listed.join(", "))
            }
            Rule::Custom(validator) => validator.error_message(field),
        }
    }
}

/// Length used by the min/max length rules: characters for scalars,
/// entries for lists and maps.
fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(entries) => entries.len(),
        Value::String(s) => s.chars().count(),
        other => other.to_string().chars().count(),
    }
}

/// String form of a scalar; lists and maps have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn email() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("static email pattern")
    })
}

/// Digits, brackets, dashes, plus signs, dots and whitespace only, with
/// 10 to 15 digits. Extensions are not accepted.
fn is_phone(value: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || "()-+.".contains(c) || c.is_whitespace();
    if !value.chars().all(allowed) {
        return false;
    }
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=15).contains(&digits)
}
