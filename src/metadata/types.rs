//! Metadata descriptor types
//!
//! A type is declared once as a [`TypeDefinition`](super::TypeDefinition) and
//! resolved into an immutable [`TypeDescriptor`]. Descriptors are value
//! objects; nothing mutates them after resolution.
//!
//! - [`Property`]: one declared field of a Data Object
//! - [`FieldDescriptor`]: how a property maps to a storage column
//! - [`RelationDescriptor`]: a nested one-to-many or many-to-one association
//! - [`PrivacyPolicy`]: fields stripped from output when a flag is set

use serde::Serialize;

use crate::conversion::Conversion;
use crate::model::{DataObject, FieldValue};
use crate::validation::Rule;

/// Declared kind of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point (integers accepted)
    Float,
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
    /// Date-time, ISO 8601 string externally
    Date,
    /// Zero-indexed sequential list
    List,
    /// Single nested Data Object
    Object,
    /// Any JSON value, no kind check
    Any,
}

impl FieldKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::Date => "date",
            FieldKind::List => "list",
            FieldKind::Object => "object",
            FieldKind::Any => "any",
        }
    }

    /// The built-in validator enforcing this kind, if any.
    ///
    /// `Object` has none: a malformed nested object is a relation shape
    /// error raised by the instantiator.
    pub fn kind_rule(&self) -> Option<Rule> {
        match self {
            FieldKind::Int => Some(Rule::Int),
            FieldKind::Float => Some(Rule::Float),
            FieldKind::String => Some(Rule::String),
            FieldKind::Bool => Some(Rule::Bool),
            FieldKind::Date => Some(Rule::Date),
            FieldKind::List => Some(Rule::SequentialList),
            FieldKind::Object | FieldKind::Any => None,
        }
    }
}

/// Relation multiplicity, read from the declaring type to the related type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Multiplicity {
    OneToMany,
    ManyToOne,
}

impl Multiplicity {
    pub fn describe(&self) -> &'static str {
        match self {
            Multiplicity::OneToMany => "OneToMany",
            Multiplicity::ManyToOne => "ManyToOne",
        }
    }
}

/// Storage column metadata for a property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Column name in the storage row
    pub external_name: String,
    /// Storage data type, informational only
    pub storage_type: Option<String>,
    /// Maximum length; adds a max-length validator
    pub max_length: Option<usize>,
    pub is_primary: bool,
    pub is_generated: bool,
    pub has_default: bool,
    /// Value transform applied between object and row
    pub converter: Option<Conversion>,
}

impl FieldDescriptor {
    pub fn new(external_name: impl Into<String>) -> Self {
        Self {
            external_name: external_name.into(),
            storage_type: None,
            max_length: None,
            is_primary: false,
            is_generated: false,
            has_default: false,
            converter: None,
        }
    }

    pub fn storage_type(mut self, storage_type: impl Into<String>) -> Self {
        self.storage_type = Some(storage_type.into());
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    pub fn has_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn converter(mut self, converter: Conversion) -> Self {
        self.converter = Some(converter);
        self
    }
}

/// A nested association declared on a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Registered name of the related type
    pub related_type: String,
    pub multiplicity: Multiplicity,
    /// Name of the relation in storage rows and include paths
    pub alias: String,
}

/// One declared field of a Data Object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Initial value of the field on a fresh Data Object
    pub default: Option<FieldValue>,
    /// Explicitly declared validators, in declaration order
    pub validators: Vec<Rule>,
    pub column: Option<FieldDescriptor>,
    pub relation: Option<RelationDescriptor>,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            default: None,
            validators: Vec::new(),
            column: None,
            relation: None,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Any)
    }

    /// A single related Data Object.
    pub fn many_to_one(
        name: impl Into<String>,
        related_type: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        let mut property = Self::new(name, FieldKind::Object);
        property.relation = Some(RelationDescriptor {
            related_type: related_type.into(),
            multiplicity: Multiplicity::ManyToOne,
            alias: alias.into(),
        });
        property
    }

    /// An ordered list of related Data Objects.
    pub fn one_to_many(
        name: impl Into<String>,
        related_type: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        let mut property = Self::new(name, FieldKind::List);
        property.relation = Some(RelationDescriptor {
            related_type: related_type.into(),
            multiplicity: Multiplicity::OneToMany,
            alias: alias.into(),
        });
        property
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validator(mut self, rule: Rule) -> Self {
        self.validators.push(rule);
        self
    }

    pub fn column(mut self, column: FieldDescriptor) -> Self {
        self.column = Some(column);
        self
    }

    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }
}

/// Type-level privacy policy.
///
/// When the Bool property named by `flag` is set to `true` on an object,
/// the `fields` are removed from that object's output map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyPolicy {
    pub flag: String,
    pub fields: Vec<String>,
}

impl PrivacyPolicy {
    pub fn new<I, S>(flag: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flag: flag.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the object carries the flag set to `true`.
    pub fn is_sensitive(&self, object: &DataObject) -> bool {
        matches!(object.get(&self.flag), Some(value) if value.as_bool() == Some(true))
    }
}

/// Resolved, immutable metadata for one Data Object type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub(crate) name: String,
    pub(crate) table: Option<String>,
    pub(crate) properties: Vec<Property>,
    pub(crate) privacy: Option<PrivacyPolicy>,
}

impl TypeDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// All properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Properties mapped to a storage column, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&Property, &FieldDescriptor)> {
        self.properties
            .iter()
            .filter_map(|p| p.column.as_ref().map(|c| (p, c)))
    }

    /// Properties declaring a relation, in declaration order.
    pub fn relations(&self) -> impl Iterator<Item = (&Property, &RelationDescriptor)> {
        self.properties
            .iter()
            .filter_map(|p| p.relation.as_ref().map(|r| (p, r)))
    }

    /// Looks up a relation by alias, ignoring case.
    pub fn relation_by_alias(&self, alias: &str) -> Option<&RelationDescriptor> {
        self.relations()
            .map(|(_, r)| r)
            .find(|r| r.alias.eq_ignore_ascii_case(alias))
    }

    pub fn privacy(&self) -> Option<&PrivacyPolicy> {
        self.privacy.as_ref()
    }
}
