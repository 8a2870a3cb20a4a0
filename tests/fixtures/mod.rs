//! Shared type declarations for integration tests
#![allow(dead_code)]

use dataobjects::{
    Conversion, FieldDescriptor, MetadataCache, PrivacyPolicy, Property, Rule, TypeDefinition,
};
use serde_json::{Map, Value};

/// A player record with converters, a privacy policy and three relations
/// back to its own type.
pub fn sensitive_player() -> TypeDefinition {
    TypeDefinition::new("SensitivePlayer")
        .table("players")
        .property(Property::int("pdgaNumber").nullable().column(FieldDescriptor::new("PDGANum")))
        .property(Property::string("firstName").nullable().column(FieldDescriptor::new("FirstName")))
        .property(Property::string("lastName").nullable().column(FieldDescriptor::new("LastName")))
        .property(
            Property::string("email")
                .nullable()
                .validator(Rule::Email)
                .column(FieldDescriptor::new("Email").max_length(100)),
        )
        .property(
            Property::bool("privacy")
                .nullable()
                .column(FieldDescriptor::new("Privacy").converter(Conversion::YesNo)),
        )
        .property(
            Property::date("birthDate")
                .nullable()
                .column(FieldDescriptor::new("BirthDate").converter(Conversion::DateTime)),
        )
        .property(Property::bool("testProperty").default_value(false))
        .property(Property::many_to_one("fakeHasOneRelation", "SensitivePlayer", "FakeHasOneRelation"))
        .property(
            Property::many_to_one(
                "nullableFakeHasOneRelation",
                "SensitivePlayer",
                "NullableFakeHasOneRelation",
            )
            .nullable(),
        )
        .property(Property::one_to_many("fakeHasManyRelation", "SensitivePlayer", "FakeHasManyRelation"))
        .privacy(PrivacyPolicy::new("privacy", ["email", "birthDate", "privacy"]))
}

pub fn member() -> TypeDefinition {
    TypeDefinition::new("Member")
        .property(Property::int("pdgaNumber").column(FieldDescriptor::new("PDGANumber").primary()))
        .property(Property::string("firstName").nullable().column(FieldDescriptor::new("FirstName")))
        .property(Property::string("lastName").nullable().column(FieldDescriptor::new("LastName")))
        .property(Property::one_to_many("phoneNumbers", "PhoneNumber", "PhoneNumbers").nullable())
}

pub fn phone_number() -> TypeDefinition {
    TypeDefinition::new("PhoneNumber")
        .property(Property::int("pdgaNumber").column(FieldDescriptor::new("PDGANumber")))
        .property(
            Property::string("phone")
                .validator(Rule::Phone)
                .column(FieldDescriptor::new("Phone")),
        )
        .property(Property::many_to_one("member", "Member", "Member").nullable())
}

pub fn person() -> TypeDefinition {
    TypeDefinition::new("Person")
        .property(
            Property::string("email")
                .nullable()
                .validator(Rule::MaxLength(15))
                .validator(Rule::Email),
        )
        .property(Property::int("id"))
        .property(Property::string("name").nullable())
}

pub fn inserted_person() -> TypeDefinition {
    TypeDefinition::new("InsertedPerson")
        .property(
            Property::string("email")
                .nullable()
                .validator(Rule::MaxLength(15))
                .validator(Rule::Email)
                .column(FieldDescriptor::new("email").max_length(30)),
        )
        .property(Property::int("id").column(FieldDescriptor::new("id").generated()))
        .property(Property::string("name").column(FieldDescriptor::new("name")))
        .property(
            Property::string("status")
                .column(FieldDescriptor::new("status").has_default()),
        )
}

pub fn mutated_person() -> TypeDefinition {
    TypeDefinition::new("MutatedPerson")
        .property(
            Property::string("email")
                .nullable()
                .validator(Rule::MaxLength(15))
                .validator(Rule::Email)
                .column(FieldDescriptor::new("email").max_length(30)),
        )
        .property(Property::int("id").column(FieldDescriptor::new("id").generated().primary()))
        .property(Property::string("name").column(FieldDescriptor::new("name")))
}

/// Family: Parent -> Child -> Parent, reachable from Household.
pub fn household() -> TypeDefinition {
    TypeDefinition::new("Household")
        .property(Property::string("name").nullable())
        .property(Property::many_to_one("parent", "Parent", "Parent").nullable())
        .property(Property::one_to_many("pets", "Pet", "Pets").nullable())
}

pub fn parent() -> TypeDefinition {
    TypeDefinition::new("Parent")
        .property(Property::string("name").nullable())
        .property(Property::one_to_many("children", "Child", "Child").nullable())
        .property(Property::one_to_many("pets", "Pet", "Pets").nullable())
}

pub fn child() -> TypeDefinition {
    TypeDefinition::new("Child")
        .property(Property::string("name").nullable())
        .property(Property::many_to_one("parent", "Parent", "Parent").nullable())
}

pub fn pet() -> TypeDefinition {
    TypeDefinition::new("Pet").property(Property::string("name").nullable())
}

/// A cache with every fixture type registered.
pub fn setup_cache() -> MetadataCache {
    let mut cache = MetadataCache::new();
    let definitions: [(&str, fn() -> TypeDefinition); 11] = [
        ("SensitivePlayer", sensitive_player),
        ("Member", member),
        ("PhoneNumber", phone_number),
        ("Person", person),
        ("InsertedPerson", inserted_person),
        ("MutatedPerson", mutated_person),
        ("Household", household),
        ("Parent", parent),
        ("Child", child),
        ("Pet", pet),
        ("Empty", || TypeDefinition::new("Empty")),
    ];
    for (name, define) in definitions {
        cache.register(name, define).unwrap();
    }
    cache
}

/// Unwraps a `json!` object literal.
pub fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
