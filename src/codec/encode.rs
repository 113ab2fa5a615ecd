use bigdecimal::BigDecimal;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::value::StructuredValue;
use super::{DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use crate::errors::CodecError;

/// Encodes a mapping as JSON text
///
/// ### Errors
///
/// Returns `CodecError::NotAMapping` for any other top-level shape.
pub fn dumps(value: &StructuredValue) -> Result<String, CodecError> {
    if !value.is_mapping() {
        return Err(CodecError::NotAMapping);
    }
    dumps_value(value)
}

/// Encodes any `StructuredValue`, including a bare sequence or scalar
pub fn dumps_value(value: &StructuredValue) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::NotSerializable(e.to_string()))
}

/// Exact textual form of a decimal, always carrying a fraction or exponent so
/// that it decodes back as a decimal rather than an integer
pub(crate) fn decimal_literal(value: &BigDecimal) -> String {
    let mut text = value.to_string();
    if !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    text
}

impl Serialize for StructuredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructuredValue::Null => serializer.serialize_unit(),
            StructuredValue::Bool(b) => serializer.serialize_bool(*b),
            StructuredValue::Integer(i) => serializer.serialize_i64(*i),
            StructuredValue::Decimal(d) => {
                // serde_json keeps this literal verbatim under arbitrary_precision
                let number: serde_json::Number =
                    decimal_literal(d).parse().map_err(S::Error::custom)?;
                number.serialize(serializer)
            }
            StructuredValue::String(s) => serializer.serialize_str(s),
            StructuredValue::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            StructuredValue::DateTime(dt) => serializer.collect_str(&dt.format(DATETIME_FORMAT)),
            StructuredValue::Time(t) => serializer.collect_str(&t.format(TIME_FORMAT)),
            StructuredValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            StructuredValue::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}
