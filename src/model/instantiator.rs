//! Model instantiator
//!
//! Four conversions between the representations of a record:
//! - external input -> Data Object (`hydrate_from_input`)
//! - Data Object -> storage row (`flatten_to_storage_row`)
//! - storage row -> Data Object (`hydrate_from_storage_row`)
//! - Data Object -> output map (`flatten_to_output_map`)
//!
//! Column converters apply only between objects and storage rows. Shape and
//! nullability errors abort immediately; field validation failures are
//! raised by the enforcer as one aggregated error.

use serde_json::{Map, Value};

use crate::config::MapperConfig;
use crate::conversion::Converter;
use crate::dates;
use crate::errors::{MapResult, MapperError};
use crate::metadata::{FieldDescriptor, FieldKind, MetadataCache, Multiplicity, Property, RelationDescriptor};
use crate::observability::{log_event_with_fields, Event};
use crate::validation::ValidationEnforcer;

use super::object::{DataObject, FieldValue};
use super::row::{Related, StorageRow};

/// Converts records between external input, Data Objects, storage rows and
/// output maps for the types registered in a [`MetadataCache`].
#[derive(Debug)]
pub struct ModelInstantiator<'a> {
    cache: &'a MetadataCache,
    config: MapperConfig,
}

impl<'a> ModelInstantiator<'a> {
    pub fn new(cache: &'a MetadataCache) -> Self {
        Self::with_config(cache, MapperConfig::default())
    }

    pub fn with_config(cache: &'a MetadataCache, config: MapperConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Creates an empty object of a type, with property defaults applied.
    pub fn create(&self, type_name: &str) -> MapResult<DataObject> {
        Ok(DataObject::new(self.cache.descriptor(type_name)?))
    }

    /// Validates external input and builds the object graph it describes.
    ///
    /// Every nested payload is validated against its own type before it is
    /// hydrated.
    ///
    /// # Errors
    ///
    /// - `Validation` from the enforcer, for this object or a nested one
    /// - `RelationShape` if a nested payload is not a map (or list of maps)
    /// - `RelationDepthExceeded` if nesting passes `max_depth`
    pub fn hydrate_from_input(
        &self,
        input: &Map<String, Value>,
        type_name: &str,
    ) -> MapResult<DataObject> {
        self.input_to_object(input, type_name, 0, type_name)
    }

    fn input_to_object(
        &self,
        input: &Map<String, Value>,
        type_name: &str,
        depth: usize,
        path: &str,
    ) -> MapResult<DataObject> {
        self.check_depth(depth, path)?;
        ValidationEnforcer::new(self.cache).enforce(input, type_name)?;

        let mut object = self.create(type_name)?;
        let descriptor = object.descriptor().clone();

        for property in descriptor.properties() {
            let value = match input.get(&property.name) {
                Some(value) => value,
                None => continue,
            };

            let field_value = match &property.relation {
                None => input_scalar(property, value)?,
                Some(_) if value.is_null() => FieldValue::Null,
                Some(relation) => {
                    let nested_path = format!("{}.{}", path, relation.alias);
                    self.input_relation(property, relation, value, depth, &nested_path)?
                }
            };
            object.set(&property.name, field_value)?;
        }

        Ok(object)
    }

    fn input_relation(
        &self,
        property: &Property,
        relation: &RelationDescriptor,
        value: &Value,
        depth: usize,
        path: &str,
    ) -> MapResult<FieldValue> {
        match relation.multiplicity {
            Multiplicity::ManyToOne => {
                let nested = value.as_object().ok_or_else(|| {
                    MapperError::relation_shape(&property.name, "must be an associative structure")
                })?;
                let object = self.input_to_object(nested, &relation.related_type, depth + 1, path)?;
                Ok(FieldValue::from(object))
            }
            Multiplicity::OneToMany => {
                let items = value.as_array().ok_or_else(|| {
                    MapperError::relation_shape(&property.name, "must be a sequential list")
                })?;
                let mut objects = Vec::with_capacity(items.len());
                for item in items {
                    let nested = item.as_object().ok_or_else(|| {
                        MapperError::relation_shape(
                            &property.name,
                            "must contain only associative structures",
                        )
                    })?;
                    objects.push(self.input_to_object(
                        nested,
                        &relation.related_type,
                        depth + 1,
                        path,
                    )?);
                }
                Ok(FieldValue::Many(objects))
            }
        }
    }

    /// Flattens the column-mapped fields of an object into a storage row
    /// keyed by external name, applying save converters.
    ///
    /// Unset fields are omitted. Relations are not written.
    pub fn flatten_to_storage_row(&self, object: &DataObject) -> MapResult<Map<String, Value>> {
        let mut row = Map::new();
        for (property, value) in object.set_fields() {
            if let Some(column) = &property.column {
                let saved = Self::convert_on_save(&property.name, column, value)?;
                row.insert(column.external_name.clone(), saved);
            }
        }
        Ok(row)
    }

    /// Builds an object graph from a storage row and its loaded relations,
    /// applying retrieve converters.
    ///
    /// Columns missing from the row stay unset; relations not loaded stay
    /// unset.
    ///
    /// # Errors
    ///
    /// - `RelationNullability` if a non-nullable relation is loaded as null
    /// - `RelationShape` if a relation has the wrong multiplicity
    /// - `Conversion` if a converter rejects a column value
    /// - `RelationDepthExceeded` if nesting passes `max_depth`
    pub fn hydrate_from_storage_row(
        &self,
        row: &dyn StorageRow,
        type_name: &str,
    ) -> MapResult<DataObject> {
        self.row_to_object(row, type_name, 0, type_name)
    }

    fn row_to_object(
        &self,
        row: &dyn StorageRow,
        type_name: &str,
        depth: usize,
        path: &str,
    ) -> MapResult<DataObject> {
        self.check_depth(depth, path)?;

        let mut object = self.create(type_name)?;
        let descriptor = object.descriptor().clone();

        let attributes = row.attributes();
        for (property, column) in descriptor.columns() {
            if let Some(value) = attributes.get(&column.external_name) {
                let retrieved = Self::convert_on_retrieve(&property.name, column, value)?;
                object.set(&property.name, retrieved)?;
            }
        }

        let mut relations = row.relations();
        for (property, relation) in descriptor.relations() {
            let related = match relations.remove(&relation.alias) {
                Some(related) => related,
                None => continue,
            };
            let nested_path = format!("{}.{}", path, relation.alias);
            let value = self.row_relation(property, relation, related, depth, &nested_path)?;
            object.set(&property.name, value)?;
        }

        Ok(object)
    }

    fn row_relation(
        &self,
        property: &Property,
        relation: &RelationDescriptor,
        related: Related<'_>,
        depth: usize,
        path: &str,
    ) -> MapResult<FieldValue> {
        match (relation.multiplicity, related) {
            (_, Related::Null) if property.nullable => Ok(FieldValue::Null),
            (_, Related::Null) => {
                log_event_with_fields(
                    Event::RelationNullabilityViolated,
                    &[("alias", &relation.alias), ("path", path)],
                );
                Err(MapperError::relation_nullability(&relation.alias))
            }
            (Multiplicity::ManyToOne, Related::One(nested)) => {
                let object = self.row_to_object(nested, &relation.related_type, depth + 1, path)?;
                Ok(FieldValue::from(object))
            }
            (Multiplicity::OneToMany, Related::Many(rows)) => {
                let mut objects = Vec::with_capacity(rows.len());
                for nested in rows {
                    objects.push(self.row_to_object(
                        nested,
                        &relation.related_type,
                        depth + 1,
                        path,
                    )?);
                }
                Ok(FieldValue::Many(objects))
            }
            (Multiplicity::ManyToOne, _) => Err(MapperError::relation_shape(
                &relation.alias,
                "must be a single related row",
            )),
            (Multiplicity::OneToMany, _) => Err(MapperError::relation_shape(
                &relation.alias,
                "must be a list of related rows",
            )),
        }
    }

    /// Renders an object graph as a plain map in declaration order.
    ///
    /// Unset fields are omitted, dates use the configured format and no
    /// converters run. With `cleanse`, every object (nested ones included)
    /// whose privacy flag is `true` loses its sensitive fields.
    pub fn flatten_to_output_map(&self, object: &DataObject, cleanse: bool) -> Map<String, Value> {
        let mut output = Map::new();
        for (property, value) in object.set_fields() {
            output.insert(property.name.clone(), self.output_value(value, cleanse));
        }

        if cleanse {
            if let Some(policy) = object.descriptor().privacy() {
                if policy.is_sensitive(object) {
                    for field in &policy.fields {
                        output.remove(field);
                    }
                }
            }
        }

        output
    }

    fn output_value(&self, value: &FieldValue, cleanse: bool) -> Value {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::Date(date) => Value::String(dates::render(date, &self.config.date_format)),
            FieldValue::One(nested) => Value::Object(self.flatten_to_output_map(nested, cleanse)),
            FieldValue::Many(nested) => Value::Array(
                nested
                    .iter()
                    .map(|o| Value::Object(self.flatten_to_output_map(o, cleanse)))
                    .collect(),
            ),
        }
    }

    /// Column value for a field value. Null passes through; without a
    /// converter dates render in ATOM form and scalars pass through.
    pub fn convert_on_save(
        field: &str,
        column: &FieldDescriptor,
        value: &FieldValue,
    ) -> MapResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match &column.converter {
            Some(converter) => converter
                .on_save(value)
                .map_err(|e| MapperError::conversion(field, e.to_string())),
            None => value.to_json().ok_or_else(|| {
                MapperError::conversion(field, "related objects cannot be stored in a column")
            }),
        }
    }

    /// Field value for a column value. Null passes through; without a
    /// converter the value is kept as is.
    pub fn convert_on_retrieve(
        field: &str,
        column: &FieldDescriptor,
        value: &Value,
    ) -> MapResult<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        match &column.converter {
            Some(converter) => converter
                .on_retrieve(value)
                .map_err(|e| MapperError::conversion(field, e.to_string())),
            None => Ok(FieldValue::scalar(value.clone())),
        }
    }

    fn check_depth(&self, depth: usize, path: &str) -> MapResult<()> {
        if depth <= self.config.max_depth {
            return Ok(());
        }
        let max_depth = self.config.max_depth.to_string();
        log_event_with_fields(
            Event::RelationDepthExceeded,
            &[("max_depth", &max_depth), ("path", path)],
        );
        Err(MapperError::RelationDepthExceeded {
            max_depth: self.config.max_depth,
            path: path.to_string(),
        })
    }
}

/// Field value for a non-relation input value. Dates parse from their
/// external string form.
fn input_scalar(property: &Property, value: &Value) -> MapResult<FieldValue> {
    match (property.kind, value) {
        (FieldKind::Date, Value::String(text)) => dates::parse_external(text)
            .map(FieldValue::Date)
            .ok_or_else(|| MapperError::conversion(&property.name, format!("'{}' is not a date", text))),
        _ => Ok(FieldValue::scalar(value.clone())),
    }
}
