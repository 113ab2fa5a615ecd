//! End-to-end checks of the public field API, without a database

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use jsonfield::fields::{FieldValue, LookupKind, LookupValue, PreparedLookup, ReadOutcome, Stored, Unpickled};
use jsonfield::{dumps, loads, JsonField, Mapping, PickledObjectField, StructuredValue};
use serde_json::json;

#[test]
fn test_json_field_write_then_read() {
    let field = JsonField::default();

    let mut map = Mapping::new();
    map.insert("total".to_string(), BigDecimal::from_str("0.1").unwrap().into());
    map.insert("due".to_string(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap().into());

    let stored = field.to_db(&FieldValue::from(map.clone())).unwrap().unwrap();
    assert_eq!(stored, r#"{"due":"2025-01-31","total":0.1}"#);

    match field.from_db(Some(&stored)) {
        ReadOutcome::Decoded(dict) => assert_eq!(dict.into_inner(), map),
        other => panic!("expected a decoded mapping, got {:?}", other),
    }
}

#[test]
fn test_dumps_and_loads_from_crate_root() {
    let map = loads(r#"{"n": 7, "s": "text"}"#).unwrap();
    assert_eq!(map.get("n"), Some(&StructuredValue::Integer(7)));
    assert_eq!(dumps(&StructuredValue::Mapping(map)).unwrap(), r#"{"n":7,"s":"text"}"#);
}

#[test]
fn test_pickle_field_write_read_and_lookup() {
    let field = PickledObjectField;
    let value = json!({"nested": {"list": [1, 2, 3]}});

    let stored = field.to_db(Some(jsonfield::fields::Pickled::Raw(value.clone()))).unwrap().unwrap();
    let read: Unpickled<serde_json::Value> = field.from_db(Stored::Untagged(stored.as_str().to_string())).unwrap();
    assert_eq!(read, Unpickled::Value(value.clone()));

    match field.prep_lookup(LookupKind::Exact, LookupValue::single(value)).unwrap() {
        PreparedLookup::Exact(pickled) => assert_eq!(pickled, stored),
        other => panic!("expected an exact lookup, got {:?}", other),
    }
}
