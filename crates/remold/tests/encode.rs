//! Encode-direction tests: annotated structs used as the decode source,
//! producing maps. Aliases rename, `-` drops, `omitempty`/`omitzero` filter,
//! squash splices, remainders flatten.

use std::collections::HashMap;

use remold::{decode, weak_decode, Mold, Value};

#[derive(Debug, Default, PartialEq, Mold)]
struct Person {
    name: String,
    #[remold("years")]
    age: i64,
    #[remold("-")]
    secret: String,
    #[remold(",omitempty")]
    nickname: String,
    #[remold(",omitzero")]
    level: Option<i64>,
}

/// Test alias naming, skip, and both omit options on the way out.
#[test]
fn test_encode_applies_tags() {
    let person = Person {
        name: "Ada".to_string(),
        age: 36,
        secret: "hidden".to_string(),
        nickname: String::new(),
        level: None,
    };

    let mut out: HashMap<String, Value> = HashMap::new();
    decode(&person, &mut out).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out.get("name"), Some(&Value::String("Ada".to_string())));
    assert_eq!(out.get("years"), Some(&Value::Int(36)));
    assert!(!out.contains_key("secret"));
    assert!(!out.contains_key("age"));
}

/// Test that omitzero keeps `Some(0)`: an option holding its inner default
/// is present, not zero.
#[test]
fn test_omitzero_distinguishes_some_default() {
    let person = Person {
        name: "Ada".to_string(),
        level: Some(0),
        ..Person::default()
    };

    let mut out: HashMap<String, Value> = HashMap::new();
    decode(&person, &mut out).unwrap();
    assert_eq!(out.get("level"), Some(&Value::Int(0)));
}

/// Test that omitempty keeps non-empty values.
#[test]
fn test_omitempty_keeps_nonempty() {
    let person = Person {
        nickname: "dot".to_string(),
        ..Person::default()
    };

    let mut out: HashMap<String, Value> = HashMap::new();
    decode(&person, &mut out).unwrap();
    assert_eq!(out.get("nickname"), Some(&Value::String("dot".to_string())));
}

#[derive(Debug, Default, PartialEq, Mold)]
struct Family {
    last_name: String,
}

#[derive(Debug, Default, PartialEq, Mold)]
struct Location {
    city: String,
}

#[derive(Debug, Default, PartialEq, Mold)]
struct Friend {
    #[remold(",squash")]
    family: Option<Family>,
    #[remold(",squash")]
    location: Option<Location>,
    first_name: String,
}

/// Test the spec's embedded-pointer example: absent squashed embeds vanish
/// from the encoded map entirely.
#[test]
fn test_encode_absent_squashed_embeds_are_omitted() {
    let friend = Friend {
        family: None,
        location: None,
        first_name: "Mitchell".to_string(),
    };

    let mut out: HashMap<String, Value> = HashMap::new();
    decode(&friend, &mut out).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(
        out.get("first_name"),
        Some(&Value::String("Mitchell".to_string()))
    );
}

/// Test that present squashed embeds splice their fields flat.
#[test]
fn test_encode_squash_splices_flat() {
    let friend = Friend {
        family: Some(Family {
            last_name: "Hashimoto".to_string(),
        }),
        location: Some(Location {
            city: "SF".to_string(),
        }),
        first_name: "Mitchell".to_string(),
    };

    let mut out: HashMap<String, Value> = HashMap::new();
    decode(&friend, &mut out).unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(
        out.get("last_name"),
        Some(&Value::String("Hashimoto".to_string()))
    );
    assert_eq!(out.get("city"), Some(&Value::String("SF".to_string())));
}

/// Test that a remainder field's entries flatten in beside named fields.
#[test]
fn test_encode_flattens_remainder() {
    #[derive(Debug, Default, Mold)]
    struct WithRemain {
        name: String,
        #[remold(",remain")]
        extra: HashMap<String, Value>,
    }

    let mut source = WithRemain {
        name: "a".to_string(),
        extra: HashMap::new(),
    };
    source.extra.insert("one".to_string(), Value::Int(1));

    let mut out: HashMap<String, Value> = HashMap::new();
    decode(&source, &mut out).unwrap();

    assert_eq!(out.get("name"), Some(&Value::String("a".to_string())));
    assert_eq!(out.get("one"), Some(&Value::Int(1)));
    assert!(!out.contains_key("extra"));
}

/// Test struct-to-struct decoding: a record source feeds a record target
/// through its visible entries.
#[test]
fn test_struct_to_struct() {
    #[derive(Debug, Default, PartialEq, Mold)]
    struct Wide {
        name: String,
        age: i64,
        city: String,
    }

    let source = Person {
        name: "Ada".to_string(),
        age: 36,
        ..Person::default()
    };

    // "years" (the alias) does not match "age" here: the alias renames the
    // field on both sides of the engine.
    let mut narrow = Wide::default();
    decode(&source, &mut narrow).unwrap();
    assert_eq!(narrow.name, "Ada");
    assert_eq!(narrow.age, 0);
    assert_eq!(narrow.city, "");
}

/// Test the weak round trip: struct to map and back reproduces the struct.
#[test]
fn test_weak_round_trip() {
    #[derive(Debug, Default, PartialEq, Mold)]
    struct Plain {
        name: String,
        age: i64,
        tags: Vec<String>,
    }

    let original = Plain {
        name: "Ada".to_string(),
        age: 36,
        tags: vec!["x".to_string(), "y".to_string()],
    };

    let mut encoded: HashMap<String, Value> = HashMap::new();
    decode(&original, &mut encoded).unwrap();

    let mut decoded = Plain::default();
    weak_decode(&encoded, &mut decoded).unwrap();
    assert_eq!(decoded, original);
}

/// Test that nested structs survive a round trip through a map of values.
#[test]
fn test_nested_round_trip() {
    #[derive(Debug, Default, PartialEq, Mold)]
    struct Outer {
        label: String,
        inner: Family,
    }

    let original = Outer {
        label: "top".to_string(),
        inner: Family {
            last_name: "H".to_string(),
        },
    };

    let mut encoded: HashMap<String, Value> = HashMap::new();
    decode(&original, &mut encoded).unwrap();
    // The nested struct is carried as a record snapshot.
    assert!(matches!(encoded.get("inner"), Some(Value::Record(_))));

    let mut decoded = Outer::default();
    decode(&encoded, &mut decoded).unwrap();
    assert_eq!(decoded, original);
}

/// Test strict identity: same-kind decode preserves values exactly.
#[test]
fn test_strict_identity_round_trip() {
    let original = Person {
        name: "Ada".to_string(),
        age: 36,
        secret: String::new(),
        nickname: "dot".to_string(),
        level: Some(3),
    };

    let mut copy = Person::default();
    decode(&original, &mut copy).unwrap();

    // The skipped field never travels; everything else is preserved.
    assert_eq!(copy.name, original.name);
    assert_eq!(copy.age, original.age);
    assert_eq!(copy.nickname, original.nickname);
    assert_eq!(copy.level, original.level);
    assert_eq!(copy.secret, "");
}
