//! Model Instantiator Invariant Tests
//!
//! - Input hydration validates first and recurses through relations
//! - Storage rows use external names and column converters
//! - Row hydration enforces relation nullability and shape
//! - Output maps omit unset fields and cleanse sensitive objects
//! - Converters never see null

mod fixtures;

use dataobjects::{
    dates, Conversion, DataObject, FieldDescriptor, FieldValue, MapperError, MemoryRow,
    MetadataCache, ModelInstantiator, Property, StorageRow, TypeDefinition,
};
use fixtures::{map, setup_cache};
use serde_json::{json, Map, Value};

fn ken_climo() -> Value {
    json!({
        "pdgaNumber": 4297,
        "firstName": "Ken",
        "lastName": "Climo",
        "email": "champ@pdga.com",
        "privacy": true,
        "birthDate": "2020-01-01T00:00:00+00:00",
        "testProperty": true
    })
}

fn keys(output: &Map<String, Value>) -> Vec<&str> {
    output.keys().map(String::as_str).collect()
}

// =============================================================================
// Input -> Data Object
// =============================================================================

#[test]
fn test_hydrate_sets_present_fields() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let player = instantiator
        .hydrate_from_input(
            &map(json!({"pdgaNumber": 24472, "firstName": "Peter", "birthDate": "2020-01-01", "testProperty": true})),
            "SensitivePlayer",
        )
        .unwrap();

    assert_eq!(player.type_name(), "SensitivePlayer");
    assert_eq!(player.get("pdgaNumber"), Some(&FieldValue::from(24472)));
    assert_eq!(player.get("firstName"), Some(&FieldValue::from("Peter")));
    assert_eq!(player.get("testProperty"), Some(&FieldValue::from(true)));
    assert_eq!(
        player.get("birthDate"),
        Some(&FieldValue::from(dates::parse_external("2020-01-01").unwrap()))
    );
    assert!(!player.is_set("lastName"));
    assert!(!player.is_set("fakeHasOneRelation"));
}

#[test]
fn test_hydrate_rejects_undeclared_keys() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let err = instantiator
        .hydrate_from_input(&map(json!({"pdgaNumber": 1, "fakeProperty": "faker"})), "SensitivePlayer")
        .unwrap_err();
    let errors = err.validation_errors().unwrap().errors();
    assert_eq!(errors.messages("fakeProperty"), vec!["fakeProperty is not a declared field."]);
}

#[test]
fn test_hydrate_nested_list_and_object() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let member = instantiator
        .hydrate_from_input(
            &map(json!({
                "pdgaNumber": 42,
                "firstName": "Jane",
                "phoneNumbers": [
                    {"pdgaNumber": 42, "phone": "123-456-7890", "member": {"pdgaNumber": 42}},
                    {"pdgaNumber": 42, "phone": "098-765-4321"}
                ]
            })),
            "Member",
        )
        .unwrap();

    let phones = member.get("phoneNumbers").and_then(FieldValue::as_list).unwrap();
    assert_eq!(phones.len(), 2);
    assert_eq!(phones[0].type_name(), "PhoneNumber");
    assert_eq!(phones[1].get("phone"), Some(&FieldValue::from("098-765-4321")));

    let nested = phones[0].get("member").and_then(FieldValue::as_object).unwrap();
    assert_eq!(nested.get("pdgaNumber"), Some(&FieldValue::from(42)));
    assert!(!phones[1].is_set("member"));
}

#[test]
fn test_hydrate_bad_nested_object() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let err = instantiator
        .hydrate_from_input(
            &map(json!({"phone": "123-456-7890", "member": "I am not an array."})),
            "PhoneNumber",
        )
        .unwrap_err();

    assert!(matches!(err, MapperError::RelationShape { .. }));
    assert_eq!(err.to_string(), "member must be an associative structure.");
}

#[test]
fn test_hydrate_nullable_relation_may_be_null() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let mut input = map(ken_climo());
    input.insert("fakeHasOneRelation".into(), ken_climo());
    input.insert("nullableFakeHasOneRelation".into(), Value::Null);
    input.insert("fakeHasManyRelation".into(), json!([ken_climo()]));

    let actual = instantiator.hydrate_from_input(&input, "SensitivePlayer").unwrap();

    let plain = instantiator
        .hydrate_from_input(&map(ken_climo()), "SensitivePlayer")
        .unwrap();
    let mut expected = plain.clone();
    expected.set("fakeHasOneRelation", plain.clone()).unwrap();
    expected.set("nullableFakeHasOneRelation", FieldValue::Null).unwrap();
    expected.set("fakeHasManyRelation", vec![plain]).unwrap();

    assert_eq!(actual, expected);
}

#[test]
fn test_hydrate_required_relation_null_fails_validation() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let mut input = map(ken_climo());
    input.insert("fakeHasOneRelation".into(), Value::Null);

    let err = instantiator.hydrate_from_input(&input, "SensitivePlayer").unwrap_err();
    let errors = err.validation_errors().unwrap().errors();
    assert_eq!(
        errors.messages("fakeHasOneRelation"),
        vec!["The fakeHasOneRelation field must not be null."]
    );
}

// =============================================================================
// Data Object -> storage row
// =============================================================================

#[test]
fn test_storage_row_applies_yes_no_converter() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let player = instantiator
        .hydrate_from_input(
            &map(json!({
                "pdgaNumber": 4297,
                "firstName": "Ken",
                "lastName": "Climo",
                "email": "champ@pdga.com",
                "privacy": true
            })),
            "SensitivePlayer",
        )
        .unwrap();

    let row = instantiator.flatten_to_storage_row(&player).unwrap();
    assert_eq!(row["Privacy"], json!("yes"));
    assert_eq!(keys(&row), vec!["PDGANum", "FirstName", "LastName", "Email", "Privacy"]);
    assert_eq!(
        Value::Object(row),
        json!({
            "PDGANum": 4297,
            "FirstName": "Ken",
            "LastName": "Climo",
            "Email": "champ@pdga.com",
            "Privacy": "yes"
        })
    );
}

/// Every column-mapped input field comes back under its external name,
/// modulo converters.
#[test]
fn test_storage_row_reproduces_input() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);
    let input = map(ken_climo());

    let player = instantiator.hydrate_from_input(&input, "SensitivePlayer").unwrap();
    let row = instantiator.flatten_to_storage_row(&player).unwrap();

    for (name, column) in cache.field_descriptors("SensitivePlayer").unwrap() {
        let given = &input[&name];
        let expected = match &column.converter {
            Some(_) => ModelInstantiator::convert_on_save(&name, &column, player.get(&name).unwrap()).unwrap(),
            None => given.clone(),
        };
        assert_eq!(row[&column.external_name], expected, "column {}", column.external_name);
    }
    assert_eq!(row["BirthDate"], json!("2020-01-01T00:00:00+00:00"));
    assert!(!row.contains_key("testProperty"));
}

#[test]
fn test_storage_row_keeps_nulls_without_converting() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let mut player = instantiator.create("SensitivePlayer").unwrap();
    player.set("pdgaNumber", 4297).unwrap();
    player.set("privacy", FieldValue::Null).unwrap();
    player.set("birthDate", FieldValue::Null).unwrap();

    let row = instantiator.flatten_to_storage_row(&player).unwrap();
    assert_eq!(
        Value::Object(row),
        json!({"PDGANum": 4297, "Privacy": null, "BirthDate": null})
    );
}

#[test]
fn test_converters_never_see_null() {
    for converter in [
        Conversion::YesNo,
        Conversion::DateTime,
        Conversion::EmptyStringToNull,
        Conversion::Json,
    ] {
        let column = FieldDescriptor::new("Column").converter(converter);
        assert_eq!(
            ModelInstantiator::convert_on_save("field", &column, &FieldValue::Null).unwrap(),
            Value::Null
        );
        assert!(ModelInstantiator::convert_on_retrieve("field", &column, &Value::Null)
            .unwrap()
            .is_null());
    }

    let plain = FieldDescriptor::new("Column");
    assert_eq!(
        ModelInstantiator::convert_on_save("field", &plain, &FieldValue::from("x")).unwrap(),
        json!("x")
    );
    assert_eq!(
        ModelInstantiator::convert_on_retrieve("field", &plain, &json!("x")).unwrap(),
        FieldValue::from("x")
    );
}

#[test]
fn test_json_column_reads_back_what_it_stored() {
    let mut cache = MetadataCache::new();
    cache
        .register("Scorecard", || {
            TypeDefinition::new("Scorecard")
                .property(Property::any("blob").nullable().column(
                    FieldDescriptor::new("Blob").converter(Conversion::Json),
                ))
        })
        .unwrap();
    let instantiator = ModelInstantiator::new(&cache);

    for blob in [json!("hello"), json!({"holes": [3, 4, 3]}), json!(54), json!("54")] {
        let card = instantiator
            .hydrate_from_input(&map(json!({ "blob": blob.clone() })), "Scorecard")
            .unwrap();
        let row = instantiator.flatten_to_storage_row(&card).unwrap();
        assert!(row["Blob"].is_string());

        let restored = instantiator.hydrate_from_storage_row(&row, "Scorecard").unwrap();
        assert_eq!(restored.get("blob"), Some(&FieldValue::from(blob)));
        assert_eq!(restored, card);
    }
}

// =============================================================================
// Storage row -> Data Object
// =============================================================================

#[test]
fn test_hydrate_from_plain_map_row() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let row = map(json!({
        "PDGANum": 4297,
        "FirstName": "Ken",
        "Privacy": "yes",
        "BirthDate": "2020-01-01 00:00:00",
        "FakeHasManyRelation": [{"PDGANum": 1}, {"PDGANum": 2}]
    }));

    let player = instantiator.hydrate_from_storage_row(&row, "SensitivePlayer").unwrap();
    assert_eq!(player.get("pdgaNumber"), Some(&FieldValue::from(4297)));
    assert_eq!(player.get("privacy"), Some(&FieldValue::from(true)));
    assert_eq!(
        player.get("birthDate").and_then(FieldValue::as_date).map(dates::render_atom),
        Some("2020-01-01T00:00:00+00:00".to_string())
    );
    assert!(!player.is_set("lastName"));

    let many = player.get("fakeHasManyRelation").and_then(FieldValue::as_list).unwrap();
    let numbers: Vec<i64> = many.iter().filter_map(|p| p.get("pdgaNumber")?.as_i64()).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[test]
fn test_hydrate_from_accessor_row() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let row = MemoryRow::new()
        .attribute("PDGANum", 123)
        .has_one("FakeHasOneRelation", MemoryRow::new().attribute("PDGANum", 456))
        .has_one("NullableFakeHasOneRelation", MemoryRow::new().attribute("PDGANum", 789));

    let player = instantiator.hydrate_from_storage_row(&row, "SensitivePlayer").unwrap();
    let one = player.get("fakeHasOneRelation").and_then(FieldValue::as_object).unwrap();
    assert_eq!(one.get("pdgaNumber"), Some(&FieldValue::from(456)));
    let nullable = player
        .get("nullableFakeHasOneRelation")
        .and_then(FieldValue::as_object)
        .unwrap();
    assert_eq!(nullable.get("pdgaNumber"), Some(&FieldValue::from(789)));
    assert!(!player.is_set("fakeHasManyRelation"));
}

#[test]
fn test_required_relation_null_in_row_fails() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let rows: Vec<Box<dyn StorageRow>> = vec![
        Box::new(map(json!({"PDGANum": 123, "FakeHasOneRelation": null}))),
        Box::new(
            MemoryRow::new()
                .attribute("PDGANum", 123)
                .null_relation("FakeHasOneRelation"),
        ),
    ];

    for row in rows {
        let err = instantiator
            .hydrate_from_storage_row(row.as_ref(), "SensitivePlayer")
            .unwrap_err();
        match &err {
            MapperError::RelationNullability { alias } => assert_eq!(alias, "FakeHasOneRelation"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(err.to_string(), "FakeHasOneRelation relationship must not be null.");
    }
}

#[test]
fn test_nullable_relation_null_in_row_is_null() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let row = MemoryRow::new()
        .attribute("PDGANum", 123)
        .null_relation("NullableFakeHasOneRelation");
    let player = instantiator.hydrate_from_storage_row(&row, "SensitivePlayer").unwrap();
    assert_eq!(player.get("nullableFakeHasOneRelation"), Some(&FieldValue::Null));
}

#[test]
fn test_row_round_trip() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let original = instantiator
        .hydrate_from_input(&map(ken_climo()), "SensitivePlayer")
        .unwrap();
    let row = instantiator.flatten_to_storage_row(&original).unwrap();
    let restored = instantiator.hydrate_from_storage_row(&row, "SensitivePlayer").unwrap();

    for (property, value) in original.set_fields() {
        if property.column.is_some() {
            assert_eq!(restored.get(&property.name), Some(value), "field {}", property.name);
        }
    }
}

// =============================================================================
// Data Object -> output map
// =============================================================================

#[test]
fn test_output_map_cleanses_sensitive_fields() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let player = instantiator
        .hydrate_from_input(&map(ken_climo()), "SensitivePlayer")
        .unwrap();

    let output = instantiator.flatten_to_output_map(&player, true);
    assert_eq!(
        Value::Object(output.clone()),
        json!({"pdgaNumber": 4297, "firstName": "Ken", "lastName": "Climo", "testProperty": true})
    );
    for sensitive in ["email", "birthDate", "privacy"] {
        assert!(!output.contains_key(sensitive));
    }
}

#[test]
fn test_output_map_keeps_fields_when_not_private() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let mut input = map(ken_climo());
    input.insert("privacy".into(), json!(false));
    let player = instantiator.hydrate_from_input(&input, "SensitivePlayer").unwrap();

    let output = instantiator.flatten_to_output_map(&player, true);
    assert_eq!(
        keys(&output),
        vec!["pdgaNumber", "firstName", "lastName", "email", "privacy", "birthDate", "testProperty"]
    );
    assert_eq!(output["birthDate"], json!("2020-01-01T00:00:00+00:00"));
}

#[test]
fn test_output_map_without_cleansing() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let player = instantiator
        .hydrate_from_input(&map(ken_climo()), "SensitivePlayer")
        .unwrap();

    let output = instantiator.flatten_to_output_map(&player, false);
    assert_eq!(Value::Object(output), ken_climo());
}

#[test]
fn test_nested_sensitive_objects_cleansed_independently() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let sensitive = instantiator
        .hydrate_from_input(&map(ken_climo()), "SensitivePlayer")
        .unwrap();
    let mut public = sensitive.clone();
    public.set("privacy", false).unwrap();

    let mut root = sensitive.clone();
    root.set("fakeHasOneRelation", public).unwrap();
    root.set("nullableFakeHasOneRelation", sensitive.clone()).unwrap();
    root.set("fakeHasManyRelation", vec![sensitive]).unwrap();

    let output = instantiator.flatten_to_output_map(&root, true);
    let cleansed = json!({"pdgaNumber": 4297, "firstName": "Ken", "lastName": "Climo", "testProperty": true});

    assert!(!output.contains_key("email"));
    assert_eq!(output["fakeHasOneRelation"]["email"], json!("champ@pdga.com"));
    assert_eq!(output["fakeHasOneRelation"]["privacy"], json!(false));
    assert_eq!(output["nullableFakeHasOneRelation"], cleansed);
    assert_eq!(output["fakeHasManyRelation"], json!([cleansed]));
}

#[test]
fn test_partial_object_output() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let mut player: DataObject = instantiator.create("SensitivePlayer").unwrap();
    player.set("firstName", "Ken").unwrap();
    player.set("lastName", "Climo").unwrap();
    player.set("email", FieldValue::Null).unwrap();

    assert_eq!(
        Value::Object(instantiator.flatten_to_output_map(&player, true)),
        json!({"firstName": "Ken", "lastName": "Climo", "email": null, "testProperty": false})
    );
}

#[test]
fn test_nested_output_recursion() {
    let cache = setup_cache();
    let instantiator = ModelInstantiator::new(&cache);

    let input = json!({
        "pdgaNumber": 42,
        "firstName": "Jane",
        "phoneNumbers": [
            {"pdgaNumber": 42, "phone": "123-456-7890", "member": {"pdgaNumber": 42, "firstName": "Jane"}}
        ]
    });
    let member = instantiator.hydrate_from_input(&map(input.clone()), "Member").unwrap();

    assert_eq!(Value::Object(instantiator.flatten_to_output_map(&member, true)), input);
}
