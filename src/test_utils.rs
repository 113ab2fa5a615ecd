use crate::codec::{Mapping, StructuredValue};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

/// Generates an arbitrary NaiveDateTime within 2020-01-01 to 2030-01-01, whole seconds only
pub fn arb_naive_datetime() -> impl Strategy<Value = NaiveDateTime> {
    (1_577_836_800i64..1_893_456_000i64)
        .prop_map(|ts| DateTime::from_timestamp(ts, 0).unwrap().naive_utc())
}

/// Generates an arbitrary NaiveDate within 2020-01-01 to 2030-01-01
pub fn arb_naive_date() -> impl Strategy<Value = NaiveDate> {
    arb_naive_datetime().prop_map(|dt| dt.date())
}

/// Generates a decimal with up to 12 fractional digits
pub fn arb_decimal() -> impl Strategy<Value = BigDecimal> {
    (any::<i64>(), 0i64..12).prop_map(|(digits, scale)| BigDecimal::new(digits.into(), scale))
}

/// Generates strings that can never be mistaken for a timestamp
pub fn arb_plain_string() -> impl Strategy<Value = String> {
    "[a-zA-Z _.:/-]{0,16}"
}

/// Generates an arbitrary StructuredValue leaf that survives a round trip
pub fn arb_leaf() -> impl Strategy<Value = StructuredValue> {
    prop_oneof![
        Just(StructuredValue::Null),
        any::<bool>().prop_map(StructuredValue::Bool),
        any::<i64>().prop_map(StructuredValue::Integer),
        arb_decimal().prop_map(StructuredValue::Decimal),
        arb_plain_string().prop_map(StructuredValue::String),
        arb_naive_date().prop_map(StructuredValue::Date),
        arb_naive_datetime().prop_map(StructuredValue::DateTime),
    ]
}

/// Generates an arbitrary (possibly nested) StructuredValue
pub fn arb_structured() -> impl Strategy<Value = StructuredValue> {
    arb_leaf().prop_recursive(
        4,  // 4 levels deep
        64, // maximum size of 64 nodes
        8,  // up to 8 items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(StructuredValue::Sequence),
                prop::collection::btree_map("[a-z0-9_]{1,8}", inner, 0..8)
                    .prop_map(StructuredValue::Mapping),
            ]
        },
    )
}

/// Generates an arbitrary top-level mapping
pub fn arb_mapping() -> impl Strategy<Value = Mapping> {
    prop::collection::btree_map("[a-z0-9_]{1,8}", arb_structured(), 0..8)
}
