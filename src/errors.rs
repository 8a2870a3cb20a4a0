//! Mapper error types
//!
//! Error codes:
//! - DO_VALIDATION_FAILED (REJECT)
//! - DO_RELATION_SHAPE (REJECT)
//! - DO_RELATION_NULL (REJECT)
//! - DO_UNKNOWN_RELATIONSHIPS (REJECT)
//! - DO_UNKNOWN_FIELD (REJECT)
//! - DO_CONVERSION_FAILED (REJECT)
//! - DO_RELATION_DEPTH (REJECT)
//! - DO_METADATA_UNRESOLVED (FATAL)
//! - DO_TYPE_REGISTERED (FATAL)
//! - DO_CONFIG_INVALID (FATAL)
//!
//! Field validation failures are never surfaced one at a time. They are
//! collected into a [`ValidationErrorSet`](crate::validation::ValidationErrorSet)
//! and raised once as [`MapperError::Validation`].

use std::fmt;

use thiserror::Error;

use crate::validation::AggregatedValidationError;

/// Severity levels for mapper errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller input rejected
    Reject,
    /// Type declarations or configuration are broken; retrying cannot help
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// One or more fields failed validation
    ValidationFailed,
    /// A nested payload or row has the wrong shape for its relation
    RelationShape,
    /// A non-nullable relation was null
    RelationNull,
    /// Relationship include paths did not resolve
    UnknownRelationships,
    /// A field name is not declared on the type
    UnknownField,
    /// A converter rejected a value
    ConversionFailed,
    /// Relation nesting exceeded the configured depth
    RelationDepth,
    /// Type metadata could not be resolved
    MetadataUnresolved,
    /// A type name was registered twice
    TypeRegistered,
    /// Configuration could not be read or parsed
    ConfigInvalid,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "DO_VALIDATION_FAILED",
            ErrorCode::RelationShape => "DO_RELATION_SHAPE",
            ErrorCode::RelationNull => "DO_RELATION_NULL",
            ErrorCode::UnknownRelationships => "DO_UNKNOWN_RELATIONSHIPS",
            ErrorCode::UnknownField => "DO_UNKNOWN_FIELD",
            ErrorCode::ConversionFailed => "DO_CONVERSION_FAILED",
            ErrorCode::RelationDepth => "DO_RELATION_DEPTH",
            ErrorCode::MetadataUnresolved => "DO_METADATA_UNRESOLVED",
            ErrorCode::TypeRegistered => "DO_TYPE_REGISTERED",
            ErrorCode::ConfigInvalid => "DO_CONFIG_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::MetadataUnresolved | ErrorCode::TypeRegistered | ErrorCode::ConfigInvalid => {
                Severity::Fatal
            }
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the metadata cache, enforcer, path parser and instantiator.
#[derive(Debug, Clone, Error)]
pub enum MapperError {
    #[error(transparent)]
    Validation(#[from] AggregatedValidationError),

    #[error("{field} {expectation}.")]
    RelationShape { field: String, expectation: String },

    #[error("{alias} relationship must not be null.")]
    RelationNullability { alias: String },

    #[error("Unknown relationships - {}", .paths.join(","))]
    UnknownRelationships { paths: Vec<String> },

    #[error("'{field}' is not a declared field of {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("Cannot convert '{field}': {reason}")]
    Conversion { field: String, reason: String },

    #[error("Relation nesting exceeds {max_depth} levels at '{path}'")]
    RelationDepthExceeded { max_depth: usize, path: String },

    #[error("Cannot resolve metadata for '{type_name}': {reason}")]
    MetadataResolution { type_name: String, reason: String },

    #[error("Type '{0}' is already registered")]
    TypeAlreadyRegistered(String),

    #[error("Invalid configuration '{origin}': {reason}")]
    Config { origin: String, reason: String },
}

impl MapperError {
    /// A nested value does not have the shape its relation requires.
    pub fn relation_shape(field: impl Into<String>, expectation: impl Into<String>) -> Self {
        MapperError::RelationShape {
            field: field.into(),
            expectation: expectation.into(),
        }
    }

    pub fn relation_nullability(alias: impl Into<String>) -> Self {
        MapperError::RelationNullability { alias: alias.into() }
    }

    pub fn metadata(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        MapperError::MetadataResolution {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn conversion(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MapperError::Conversion {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            MapperError::Validation(_) => ErrorCode::ValidationFailed,
            MapperError::RelationShape { .. } => ErrorCode::RelationShape,
            MapperError::RelationNullability { .. } => ErrorCode::RelationNull,
            MapperError::UnknownRelationships { .. } => ErrorCode::UnknownRelationships,
            MapperError::UnknownField { .. } => ErrorCode::UnknownField,
            MapperError::Conversion { .. } => ErrorCode::ConversionFailed,
            MapperError::RelationDepthExceeded { .. } => ErrorCode::RelationDepth,
            MapperError::MetadataResolution { .. } => ErrorCode::MetadataUnresolved,
            MapperError::TypeAlreadyRegistered(_) => ErrorCode::TypeRegistered,
            MapperError::Config { .. } => ErrorCode::ConfigInvalid,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns the aggregated field errors if this is a validation failure
    pub fn validation_errors(&self) -> Option<&AggregatedValidationError> {
        match self {
            MapperError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for mapper operations
pub type MapResult<T> = Result<T, MapperError>;
