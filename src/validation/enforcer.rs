//! Validation enforcer
//!
//! Validation semantics:
//! - Every input key must be a declared field
//! - Absent fields are skipped; partial input is allowed
//! - Present fields run their full validator chain
//! - Failures accumulate across the whole pass and are raised once
//!
//! Insert mode additionally rejects generated columns in the input and
//! requires every non-generated, non-nullable column without a default.
//! Mutate mode additionally requires primary key columns to be present and
//! non-null.

use serde_json::{Map, Value};

use crate::errors::MapResult;
use crate::metadata::{MetadataCache, TypeDescriptor};
use crate::observability::{log_event_with_fields, Event};

use super::chain::ValidatorChain;
use super::errors::{AggregatedValidationError, ValidationErrorSet};

/// Which checks run on top of the base validator chains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementMode {
    /// Validator chains only
    Base,
    /// Chains plus insert invariants
    Insert,
    /// Chains plus primary key invariants
    Mutate,
}

impl EnforcementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementMode::Base => "base",
            EnforcementMode::Insert => "insert",
            EnforcementMode::Mutate => "mutate",
        }
    }
}

/// Enforces declared field rules on external input.
///
/// The enforcer does not mutate input. Enforcement is deterministic.
pub struct ValidationEnforcer<'a> {
    cache: &'a MetadataCache,
    mode: EnforcementMode,
}

impl<'a> ValidationEnforcer<'a> {
    /// Creates a base enforcer backed by the given metadata cache.
    pub fn new(cache: &'a MetadataCache) -> Self {
        Self::with_mode(cache, EnforcementMode::Base)
    }

    pub fn for_insert(cache: &'a MetadataCache) -> Self {
        Self::with_mode(cache, EnforcementMode::Insert)
    }

    pub fn for_mutate(cache: &'a MetadataCache) -> Self {
        Self::with_mode(cache, EnforcementMode::Mutate)
    }

    pub fn with_mode(cache: &'a MetadataCache, mode: EnforcementMode) -> Self {
        Self { cache, mode }
    }

    pub fn mode(&self) -> EnforcementMode {
        self.mode
    }

    /// Builds the validator chain of every property of a type, in
    /// declaration order.
    pub fn validator_chains(&self, type_name: &str) -> MapResult<Vec<ValidatorChain>> {
        let descriptor = self.cache.descriptor(type_name)?;
        Ok(chains_for(&descriptor))
    }

    /// Validates `input` against a type.
    ///
    /// # Errors
    ///
    /// - `MetadataResolution` if the type cannot be resolved
    /// - `Validation` carrying every failure if any check failed
    pub fn enforce(&self, input: &Map<String, Value>, type_name: &str) -> MapResult<()> {
        let descriptor = self.cache.descriptor(type_name)?;

        let mut errors = base_errors(&descriptor, input);
        match self.mode {
            EnforcementMode::Base => {}
            EnforcementMode::Insert => errors.merge(insert_errors(&descriptor, input)),
            EnforcementMode::Mutate => errors.merge(mutate_errors(&descriptor, input)),
        }

        if errors.is_empty() {
            return Ok(());
        }

        let count = errors.len().to_string();
        log_event_with_fields(
            Event::ValidationRejected,
            &[
                ("type", type_name),
                ("mode", self.mode.as_str()),
                ("errors", &count),
            ],
        );

        Err(AggregatedValidationError::new(type_name, errors).into())
    }
}

fn chains_for(descriptor: &TypeDescriptor) -> Vec<ValidatorChain> {
    descriptor
        .properties()
        .iter()
        .map(ValidatorChain::for_property)
        .collect()
}

fn base_errors(descriptor: &TypeDescriptor, input: &Map<String, Value>) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();

    for (key, value) in input {
        if !descriptor.has_property(key) {
            errors.add_error(format!("{} is not a declared field.", key), key, value.clone());
        }
    }

    for chain in chains_for(descriptor) {
        if let Some(value) = input.get(chain.field()) {
            chain.run(value, &mut errors);
        }
    }

    errors
}

fn insert_errors(descriptor: &TypeDescriptor, input: &Map<String, Value>) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();

    for (property, column) in descriptor.columns() {
        let name = property.name.as_str();

        if column.is_generated && input.contains_key(name) {
            errors.add_error(
                format!("{} should not be defined for an insert.", name),
                name,
                input[name].clone(),
            );
        }

        if !column.is_generated
            && !column.has_default
            && !property.nullable
            && is_absent_or_null(input, name)
        {
            errors.add_error(
                "Non-nullable properties with no default value are required.",
                name,
                Value::Null,
            );
        }
    }

    errors
}

fn mutate_errors(descriptor: &TypeDescriptor, input: &Map<String, Value>) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();

    for (property, column) in descriptor.columns() {
        if column.is_primary && is_absent_or_null(input, &property.name) {
            errors.add_error(
                "Primary key columns are required and should not be null.",
                &property.name,
                Value::Null,
            );
        }
    }

    errors
}

fn is_absent_or_null(input: &Map<String, Value>, field: &str) -> bool {
    input.get(field).map_or(true, Value::is_null)
}
