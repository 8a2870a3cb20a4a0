//! Type definitions
//!
//! A [`TypeDefinition`] is what a type declares at its definition site. The
//! metadata cache turns it into a [`TypeDescriptor`] after checking it:
//!
//! - Column external names are non-empty and unique within the row shape
//! - Relation aliases are non-empty, unique (ignoring case) and differ from
//!   the property name
//! - Related types are registered (checked by name only)
//! - No property is both a column and a relation
//! - The privacy policy names existing properties and a Bool flag

use std::collections::HashSet;

use crate::errors::{MapResult, MapperError};

use super::types::{FieldKind, PrivacyPolicy, Property, TypeDescriptor};

/// Declaration of a Data Object type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    name: String,
    table: Option<String>,
    properties: Vec<Property>,
    privacy: Option<PrivacyPolicy>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            properties: Vec::new(),
            privacy: None,
        }
    }

    /// Sets the storage table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Appends a property. Declaration order is preserved everywhere.
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn privacy(mut self, policy: PrivacyPolicy) -> Self {
        self.privacy = Some(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks the definition and produces its descriptor.
    ///
    /// `is_registered` answers whether a related type name is known. It is
    /// never asked to resolve the related type, so types may reference each
    /// other (or themselves) freely.
    pub(crate) fn resolve(
        self,
        expected_name: &str,
        is_registered: impl Fn(&str) -> bool,
    ) -> MapResult<TypeDescriptor> {
        let fail = |reason: String| MapperError::metadata(expected_name, reason);

        if self.name != expected_name {
            return Err(fail(format!(
                "definition is named '{}' but registered as '{}'",
                self.name, expected_name
            )));
        }

        let mut property_names = HashSet::new();
        let mut external_names = HashSet::new();
        let mut aliases = HashSet::new();

        for property in &self.properties {
            if property.name.is_empty() {
                return Err(fail("property names must not be empty".into()));
            }
            if !property_names.insert(property.name.as_str()) {
                return Err(fail(format!("property '{}' is declared twice", property.name)));
            }

            if property.column.is_some() && property.relation.is_some() {
                return Err(fail(format!(
                    "property '{}' cannot be both a column and a relation",
                    property.name
                )));
            }

            if let Some(column) = &property.column {
                if column.external_name.is_empty() {
                    return Err(fail(format!(
                        "column name of '{}' must not be empty",
                        property.name
                    )));
                }
                if !external_names.insert(column.external_name.as_str()) {
                    return Err(fail(format!(
                        "column '{}' is mapped more than once",
                        column.external_name
                    )));
                }
            }

            if let Some(relation) = &property.relation {
                if relation.alias.is_empty() {
                    return Err(fail(format!(
                        "relation alias of '{}' must not be empty",
                        property.name
                    )));
                }
                if relation.alias == property.name {
                    return Err(fail(format!(
                        "relation alias '{}' must differ from its property name",
                        relation.alias
                    )));
                }
                if !aliases.insert(relation.alias.to_lowercase()) {
                    return Err(fail(format!(
                        "relation alias '{}' is declared twice",
                        relation.alias
                    )));
                }
                if !is_registered(&relation.related_type) {
                    return Err(fail(format!(
                        "related type '{}' of '{}' is not registered",
                        relation.related_type, property.name
                    )));
                }
            }
        }

        if let Some(policy) = &self.privacy {
            match self.properties.iter().find(|p| p.name == policy.flag) {
                Some(flag) if flag.kind == FieldKind::Bool => {}
                Some(_) => {
                    return Err(fail(format!(
                        "privacy flag '{}' must be a bool property",
                        policy.flag
                    )))
                }
                None => {
                    return Err(fail(format!(
                        "privacy flag '{}' is not a declared property",
                        policy.flag
                    )))
                }
            }
            if let Some(missing) = policy
                .fields
                .iter()
                .find(|f| !property_names.contains(f.as_str()))
            {
                return Err(fail(format!(
                    "sensitive field '{}' is not a declared property",
                    missing
                )));
            }
        }

        Ok(TypeDescriptor {
            name: self.name,
            table: self.table,
            properties: self.properties,
            privacy: self.privacy,
        })
    }
}
