use super::*;
use crate::codec::{Charset, Mapping, StructuredValue};
use crate::errors::FieldError;
use crate::fields::{unpickle, FieldValue, Unpickled};
use crate::repo::tests::setup_test_db;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::sql_types::{Binary, Nullable, Text};
use serde_json::json;
use std::str::FromStr;

#[derive(QueryableByName, Debug)]
struct RawColumns {
    #[diesel(sql_type = Nullable<Text>)]
    data: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    payload: Option<String>,
}

fn raw_columns(pool: &DbPool, record_id: &str) -> RawColumns {
    let mut conn = pool.get().unwrap();
    diesel::sql_query("SELECT data, payload FROM records WHERE id = ?")
        .bind::<Text, _>(record_id)
        .get_result(&mut conn)
        .unwrap()
}

#[derive(QueryableByName, Debug)]
struct RawBytes {
    #[diesel(sql_type = Binary)]
    data: Vec<u8>,
}

fn raw_data_bytes(pool: &DbPool, record_id: &str) -> Vec<u8> {
    let mut conn = pool.get().unwrap();
    let row: RawBytes = diesel::sql_query("SELECT data FROM records WHERE id = ?")
        .bind::<Text, _>(record_id)
        .get_result(&mut conn)
        .unwrap();
    row.data
}

fn insert_raw(pool: &DbPool, id: &str, data: Option<&str>, payload: Option<&str>) {
    let mut conn = pool.get().unwrap();
    diesel::sql_query("INSERT INTO records (id, label, data, payload) VALUES (?, ?, ?, ?)")
        .bind::<Text, _>(id)
        .bind::<Text, _>(id)
        .bind::<Nullable<Text>, _>(data)
        .bind::<Nullable<Text>, _>(payload)
        .execute(&mut conn)
        .unwrap();
}

fn sample_mapping() -> Mapping {
    let mut map = Mapping::new();
    map.insert("price".to_string(), BigDecimal::from_str("19.990000000000000001").unwrap().into());
    map.insert("released".to_string(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().into());
    map.insert(
        "tags".to_string(),
        StructuredValue::Sequence(vec!["new".into(), "sale".into()]),
    );
    map
}

#[test]
fn test_create_and_get_record() {
    let pool = setup_test_db();

    let created = create_record(
        &pool,
        "widget".to_string(),
        Some(JsonColumn::new(sample_mapping())),
        Some(json!({"sku": "W-1", "qty": 3})),
    )
    .unwrap();

    let fetched = get_record(&pool, &created.get_id()).unwrap().unwrap();

    assert_eq!(fetched.get_label(), "widget");
    assert_eq!(
        fetched.get_data().and_then(JsonColumn::dict).map(|d| d.clone().into_inner()),
        Some(sample_mapping())
    );
    assert_eq!(
        fetched.get_payload().and_then(|p| p.0.value()),
        Some(&json!({"sku": "W-1", "qty": 3}))
    );
}

#[test]
fn test_json_column_is_stored_as_text() {
    let pool = setup_test_db();

    let data = Some(JsonColumn::new(sample_mapping()));
    let created = create_record(&pool, "text".to_string(), data, None).unwrap();

    let raw = raw_columns(&pool, &created.get_id());
    assert_eq!(
        raw.data.as_deref(),
        Some(r#"{"price":19.990000000000000001,"released":"2024-03-01","tags":["new","sale"]}"#)
    );
    assert_eq!(raw.payload, None);
}

#[test]
fn test_null_json_value_is_stored_as_null() {
    let pool = setup_test_db();

    let data = Some(JsonColumn(FieldValue::Null));
    let created = create_record(&pool, "null".to_string(), data, None).unwrap();

    assert_eq!(raw_columns(&pool, &created.get_id()).data, None);
    let fetched = get_record(&pool, &created.get_id()).unwrap().unwrap();
    assert_eq!(fetched.get_data(), None);
}

#[test]
fn test_legacy_rows_fall_back_to_raw_values() {
    let pool = setup_test_db();

    insert_raw(&pool, "legacy", Some("not json"), Some("plain text"));
    insert_raw(&pool, "empty", Some(""), None);

    let legacy = get_record(&pool, "legacy").unwrap().unwrap();
    assert_eq!(legacy.get_data(), Some(&JsonColumn(FieldValue::Text("not json".to_string()))));
    assert_eq!(
        legacy.get_payload().map(|p| p.0.clone()),
        Some(Unpickled::Raw("plain text".to_string()))
    );

    let empty = get_record(&pool, "empty").unwrap().unwrap();
    assert_eq!(empty.get_data(), Some(&JsonColumn(FieldValue::Null)));
}

#[test]
fn test_json_fallback_is_written_back_unchanged() {
    let pool = setup_test_db();

    insert_raw(&pool, "legacy", Some("not json"), None);
    let legacy = get_record(&pool, "legacy").unwrap().unwrap();

    update_record_data(&pool, "legacy", legacy.get_data().cloned()).unwrap();

    assert_eq!(raw_columns(&pool, "legacy").data.as_deref(), Some("not json"));
}

#[test]
fn test_raw_payload_is_pickled_when_saved_again() {
    let pool = setup_test_db();

    insert_raw(&pool, "legacy", None, Some("hello"));
    let legacy = get_record(&pool, "legacy").unwrap().unwrap();
    assert_eq!(
        legacy.get_payload().map(|p| p.0.clone()),
        Some(Unpickled::Raw("hello".to_string()))
    );

    let mut conn = pool.get().unwrap();
    diesel::update(records::table.filter(records::id.eq("legacy")))
        .set(records::payload.eq(legacy.get_payload().cloned()))
        .execute(&mut conn)
        .unwrap();
    drop(conn);

    let stored = raw_columns(&pool, "legacy").payload.unwrap();
    assert_eq!(unpickle::<serde_json::Value>(&stored).unwrap(), json!("hello"));

    let lookup = LookupValue::single(json!("hello"));
    let found = find_records_by_payload(&pool, LookupKind::Exact, lookup).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get_label(), "legacy");
}

#[test]
fn test_latin1_bytes_fall_back_under_utf8_charset() {
    let pool = setup_test_db();

    let mut conn = pool.get().unwrap();
    diesel::sql_query("INSERT INTO records (id, label, data) VALUES (?, ?, ?)")
        .bind::<Text, _>("latin")
        .bind::<Text, _>("latin")
        .bind::<Binary, _>(b"{\"name\": \"caf\xe9\"}".to_vec())
        .execute(&mut conn)
        .unwrap();
    drop(conn);

    // Column reads use the process charset, which is utf-8 unless set
    let record = get_record(&pool, "latin").unwrap().unwrap();
    assert_eq!(
        record.get_data(),
        Some(&JsonColumn(FieldValue::Text("{\"name\": \"caf\u{fffd}\"}".to_string())))
    );

    let bytes = raw_data_bytes(&pool, "latin");
    let column = JsonColumn::from_stored_bytes(&bytes, Charset::Latin1);
    assert_eq!(
        column.dict().and_then(|d| d.get("name").cloned()),
        Some(StructuredValue::String("caf\u{e9}".to_string()))
    );
}

#[test]
fn test_update_record_data() {
    let pool = setup_test_db();

    let created = create_record(&pool, "upd".to_string(), None, None).unwrap();

    let empty = Some(JsonColumn::new(Mapping::new()));
    let updated = update_record_data(&pool, &created.get_id(), empty)
        .unwrap()
        .unwrap();
    assert_eq!(
        updated.get_data().and_then(JsonColumn::dict).map(ToString::to_string),
        Some("{}".to_string())
    );

    assert!(update_record_data(&pool, "missing", None).unwrap().is_none());
}

#[test]
fn test_delete_record() {
    let pool = setup_test_db();

    let created = create_record(&pool, "gone".to_string(), None, None).unwrap();

    assert!(delete_record(&pool, &created.get_id()).unwrap());
    assert!(!delete_record(&pool, &created.get_id()).unwrap());
    assert!(get_record(&pool, &created.get_id()).unwrap().is_none());
}

#[test]
fn test_list_records_ordered_by_label() {
    let pool = setup_test_db();

    create_record(&pool, "b".to_string(), None, None).unwrap();
    create_record(&pool, "a".to_string(), None, None).unwrap();

    let labels: Vec<String> = list_records(&pool).unwrap().iter().map(Record::get_label).collect();
    assert_eq!(labels, vec!["a", "b"]);
}

#[test]
fn test_find_by_payload_exact() {
    let pool = setup_test_db();

    create_record(&pool, "one".to_string(), None, Some(json!({"k": 1}))).unwrap();
    create_record(&pool, "two".to_string(), None, Some(json!({"k": 2}))).unwrap();
    create_record(&pool, "none".to_string(), None, None).unwrap();

    let lookup = LookupValue::single(json!({"k": 2}));
    let found = find_records_by_payload(&pool, LookupKind::Exact, lookup).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get_label(), "two");
}

#[test]
fn test_find_by_payload_in() {
    let pool = setup_test_db();

    create_record(&pool, "one".to_string(), None, Some(json!("x"))).unwrap();
    create_record(&pool, "two".to_string(), None, Some(json!("y"))).unwrap();
    create_record(&pool, "three".to_string(), None, Some(json!("z"))).unwrap();

    let lookup = LookupValue::many(vec![json!("x"), json!("z")]);
    let found = find_records_by_payload(&pool, LookupKind::In, lookup).unwrap();
    let labels: Vec<String> = found.iter().map(Record::get_label).collect();
    assert_eq!(labels, vec!["one", "three"]);
}

#[test]
fn test_find_by_payload_rejects_unsupported_lookup() {
    let pool = setup_test_db();

    let err =
        find_records_by_payload(&pool, LookupKind::Gt, LookupValue::single(json!(1))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FieldError>(),
        Some(FieldError::UnsupportedLookup(LookupKind::Gt))
    ));
}
