//! Metadata subsystem
//!
//! Per-field declarations (kind, nullability, validators, column mapping,
//! relations) are registered once per type as explicit descriptor tables.
//! The [`MetadataCache`] resolves each type lazily by name and memoizes the
//! result for its lifetime.

mod cache;
mod definition;
mod types;

pub use cache::MetadataCache;
pub use definition::TypeDefinition;
pub use types::{
    FieldDescriptor, FieldKind, Multiplicity, PrivacyPolicy, Property, RelationDescriptor,
    TypeDescriptor,
};
