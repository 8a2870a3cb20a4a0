//! Storage row access
//!
//! The instantiator reads rows only through [`StorageRow`], so plain JSON
//! maps and accessor-based row objects hydrate the same way.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A relation as exposed by a storage row
pub enum Related<'a> {
    One(&'a dyn StorageRow),
    Many(Vec<&'a dyn StorageRow>),
    Null,
    /// Present under the alias but not a row or list of rows
    Value(&'a Value),
}

/// One persisted record: column values plus loaded relations.
pub trait StorageRow {
    /// Column values keyed by external name
    fn attributes(&self) -> &Map<String, Value>;

    /// Loaded relations keyed by alias
    fn relations(&self) -> BTreeMap<String, Related<'_>>;
}

/// Plain map rows: nested maps, lists of maps and nulls double as relations.
impl StorageRow for Map<String, Value> {
    fn attributes(&self) -> &Map<String, Value> {
        self
    }

    fn relations(&self) -> BTreeMap<String, Related<'_>> {
        self.iter()
            .map(|(key, value)| (key.clone(), related_value(value)))
            .collect()
    }
}

fn related_value(value: &Value) -> Related<'_> {
    match value {
        Value::Null => Related::Null,
        Value::Object(map) => Related::One(map),
        Value::Array(items) if items.iter().all(Value::is_object) => Related::Many(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| map as &dyn StorageRow)
                .collect(),
        ),
        other => Related::Value(other),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LoadedRelation {
    One(Box<MemoryRow>),
    Many(Vec<MemoryRow>),
    Null,
}

/// An accessor-based row holding column values and loaded relations
/// separately, the way ORM row objects do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRow {
    attributes: Map<String, Value>,
    relations: BTreeMap<String, LoadedRelation>,
}

impl MemoryRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            relations: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn has_one(mut self, alias: impl Into<String>, row: MemoryRow) -> Self {
        self.relations
            .insert(alias.into(), LoadedRelation::One(Box::new(row)));
        self
    }

    pub fn has_many(mut self, alias: impl Into<String>, rows: Vec<MemoryRow>) -> Self {
        self.relations.insert(alias.into(), LoadedRelation::Many(rows));
        self
    }

    /// Marks a relation as loaded but empty.
    pub fn null_relation(mut self, alias: impl Into<String>) -> Self {
        self.relations.insert(alias.into(), LoadedRelation::Null);
        self
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

impl StorageRow for MemoryRow {
    fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    fn relations(&self) -> BTreeMap<String, Related<'_>> {
        self.relations
            .iter()
            .map(|(alias, relation)| {
                let related = match relation {
                    LoadedRelation::One(row) => Related::One(row.as_ref()),
                    LoadedRelation::Many(rows) => {
                        Related::Many(rows.iter().map(|r| r as &dyn StorageRow).collect())
                    }
                    LoadedRelation::Null => Related::Null,
                };
                (alias.clone(), related)
            })
            .collect()
    }
}
