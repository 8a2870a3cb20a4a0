//! Per-field validator chains
//!
//! Chain order for a property:
//! 1. The kind validator (`Int`, `String`, ...) if the kind has one
//! 2. `NotNull` if the property is not nullable
//! 3. `NotBlank` for string properties
//! 4. Declared validators, in declaration order
//! 5. Metadata-derived validators (`MaxLength` from the column)

use serde_json::Value;

use crate::metadata::{FieldKind, Property};

use super::errors::ValidationErrorSet;
use super::rules::{Rule, Validator};

/// Ordered validators for one field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorChain {
    field: String,
    rules: Vec<Rule>,
}

impl ValidatorChain {
    /// Builds the chain for a declared property.
    pub fn for_property(property: &Property) -> Self {
        let mut rules = Vec::new();

        if let Some(kind_rule) = property.kind.kind_rule() {
            rules.push(kind_rule);
        }
        if !property.nullable {
            rules.push(Rule::NotNull);
        }
        if property.kind == FieldKind::String {
            rules.push(Rule::NotBlank);
        }
        rules.extend(property.validators.iter().cloned());
        if let Some(max_length) = property.column.as_ref().and_then(|c| c.max_length) {
            rules.push(Rule::MaxLength(max_length));
        }

        Self {
            field: property.name.clone(),
            rules,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule against `value`, recording each failure.
    ///
    /// Returns the number of failures recorded.
    pub fn run(&self, value: &Value, errors: &mut ValidationErrorSet) -> usize {
        let mut failures = 0;
        for rule in &self.rules {
            if !rule.validate(value) {
                errors.add_error(rule.error_message(&self.field), &self.field, value.clone());
                failures += 1;
            }
        }
        failures
    }
}
