//! Data Objects and field values

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::dates;
use crate::errors::{MapResult, MapperError};
use crate::metadata::{Multiplicity, Property, TypeDescriptor};

/// The value held by one set field of a Data Object.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    /// Any non-null JSON value
    Scalar(Value),
    Date(DateTime<FixedOffset>),
    /// A MANY_TO_ONE related object
    One(Box<DataObject>),
    /// ONE_TO_MANY related objects, in order
    Many(Vec<DataObject>),
}

impl FieldValue {
    /// Wraps a JSON value; `null` becomes [`FieldValue::Null`].
    pub fn scalar(value: Value) -> Self {
        if value.is_null() {
            FieldValue::Null
        } else {
            FieldValue::Scalar(value)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            FieldValue::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DataObject> {
        match self {
            FieldValue::One(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DataObject]> {
        match self {
            FieldValue::Many(objects) => Some(objects),
            _ => None,
        }
    }

    /// JSON form of a non-relation value, dates in ATOM form.
    ///
    /// Returns `None` for related objects.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Null => Some(Value::Null),
            FieldValue::Scalar(value) => Some(value.clone()),
            FieldValue::Date(date) => Some(Value::String(dates::render_atom(date))),
            FieldValue::One(_) | FieldValue::Many(_) => None,
        }
    }

    /// Short name of the variant for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Scalar(Value::Bool(_)) => "bool",
            FieldValue::Scalar(Value::Number(_)) => "number",
            FieldValue::Scalar(Value::String(_)) => "string",
            FieldValue::Scalar(Value::Array(_)) => "list",
            FieldValue::Scalar(_) => "map",
            FieldValue::Date(_) => "date",
            FieldValue::One(_) => "object",
            FieldValue::Many(_) => "object list",
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::scalar(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Scalar(Value::Bool(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::scalar(Value::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(Value::String(value))
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DataObject> for FieldValue {
    fn from(value: DataObject) -> Self {
        FieldValue::One(Box::new(value))
    }
}

impl From<Vec<DataObject>> for FieldValue {
    fn from(value: Vec<DataObject>) -> Self {
        FieldValue::Many(value)
    }
}

/// A typed record instance. Fields are either unset or hold a [`FieldValue`].
#[derive(Clone)]
pub struct DataObject {
    descriptor: Arc<TypeDescriptor>,
    values: HashMap<String, FieldValue>,
}

impl DataObject {
    /// Creates an object with every declared property default applied.
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        let values = descriptor
            .properties()
            .iter()
            .filter_map(|p| p.default.clone().map(|d| (p.name.clone(), d)))
            .collect();
        Self { descriptor, values }
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Sets a declared field.
    ///
    /// # Errors
    ///
    /// - `UnknownField` if the type does not declare `field`
    /// - `RelationShape` if the value does not fit the field's relation
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> MapResult<()> {
        let value = value.into();
        let property = self
            .descriptor
            .property(field)
            .ok_or_else(|| MapperError::UnknownField {
                type_name: self.type_name().to_string(),
                field: field.to_string(),
            })?;
        check_shape(property, &value)?;
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Unsets a field, returning its previous value.
    pub fn unset(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    /// Set fields with their properties, in declaration order.
    pub fn set_fields(&self) -> impl Iterator<Item = (&Property, &FieldValue)> {
        self.descriptor
            .properties()
            .iter()
            .filter_map(|p| self.values.get(&p.name).map(|v| (p, v)))
    }
}

fn check_shape(property: &Property, value: &FieldValue) -> MapResult<()> {
    let relation = match &property.relation {
        Some(relation) => relation,
        None => {
            return match value {
                FieldValue::One(_) | FieldValue::Many(_) => Err(MapperError::relation_shape(
                    &property.name,
                    "must not hold related objects",
                )),
                _ => Ok(()),
            };
        }
    };

    let related_ok = |object: &DataObject| object.type_name() == relation.related_type;
    let fits = match (relation.multiplicity, value) {
        (_, FieldValue::Null) => true,
        (Multiplicity::ManyToOne, FieldValue::One(object)) => related_ok(object),
        (Multiplicity::OneToMany, FieldValue::Many(objects)) => objects.iter().all(related_ok),
        _ => false,
    };

    if fits {
        return Ok(());
    }
    let expectation = match relation.multiplicity {
        Multiplicity::ManyToOne => format!("must hold a single {}", relation.related_type),
        Multiplicity::OneToMany => format!("must hold a list of {}", relation.related_type),
    };
    Err(MapperError::relation_shape(&property.name, expectation))
}

impl PartialEq for DataObject {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.values == other.values
    }
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        for (property, value) in self.set_fields() {
            s.field(&property.name, value);
        }
        s.finish()
    }
}
