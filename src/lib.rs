//! dataobjects - declarative data-object mapping and validation
//!
//! Records move between three representations:
//! - untyped external input (request payloads)
//! - typed in-memory [`DataObject`] graphs with nested relations
//! - flat storage rows keyed by column name
//!
//! Types are declared once as [`TypeDefinition`]s and registered with a
//! [`MetadataCache`]. The [`ValidationEnforcer`] checks input against the
//! declared rules, the [`RelationshipParser`] checks include paths, and the
//! [`ModelInstantiator`] performs the conversions.

pub mod config;
pub mod conversion;
pub mod dates;
pub mod errors;
pub mod metadata;
pub mod model;
pub mod observability;
pub mod parser;
pub mod validation;

pub use config::MapperConfig;
pub use conversion::{Conversion, ConvertError, Converter};
pub use errors::{ErrorCode, MapResult, MapperError, Severity};
pub use metadata::{
    FieldDescriptor, FieldKind, MetadataCache, Multiplicity, PrivacyPolicy, Property,
    RelationDescriptor, TypeDefinition, TypeDescriptor,
};
pub use model::{DataObject, FieldValue, MemoryRow, ModelInstantiator, Related, StorageRow};
pub use parser::RelationshipParser;
pub use validation::{
    AggregatedValidationError, EnforcementMode, FieldError, Rule, ValidationEnforcer,
    ValidationErrorSet, Validator, ValidatorChain,
};
