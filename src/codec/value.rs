use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::errors::CodecError;

/// String-keyed mapping, the only legal top-level shape of a JSON field
pub type Mapping = BTreeMap<String, StructuredValue>;

/// A decoded JSON field value
///
/// The variant set is closed: anything an application wants to store has to
/// be expressed as one of these. Decimals are exact, and the temporal variants
/// are naive (no zone, no sub-second precision survives encoding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredValue {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(BigDecimal),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Encoded like the other temporal values, but never reconstructed on decode
    Time(NaiveTime),
    Sequence(Vec<StructuredValue>),
    Mapping(Mapping),
}

impl StructuredValue {
    /// Converts any serializable application value into a `StructuredValue`
    ///
    /// Strings are kept as strings here; timestamp reconstruction only happens
    /// on the decode path.
    ///
    /// ### Errors
    ///
    /// Returns `CodecError::NotSerializable` if JSON cannot represent the value,
    /// e.g. a map whose keys are not strings. Non-finite floats are not
    /// rejected; they become `Null`, as in `serde_json`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        let json = serde_json::to_value(value)
            .map_err(|e| CodecError::NotSerializable(e.to_string()))?;
        Self::from_json(json)
    }

    /// Converts a parsed `serde_json::Value` without touching string leaves
    pub(crate) fn from_json(value: serde_json::Value) -> Result<Self, CodecError> {
        Ok(match value {
            serde_json::Value::Null => StructuredValue::Null,
            serde_json::Value::Bool(b) => StructuredValue::Bool(b),
            serde_json::Value::Number(n) => number_from_literal(&n.to_string())?,
            serde_json::Value::String(s) => StructuredValue::String(s),
            serde_json::Value::Array(items) => StructuredValue::Sequence(
                items.into_iter().map(Self::from_json).collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => StructuredValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Self::from_json(v)?)))
                    .collect::<Result<_, CodecError>>()?,
            ),
        })
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, StructuredValue::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            StructuredValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            StructuredValue::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

/// Literals with a fraction or exponent become decimals, everything else an
/// integer. Integers that overflow `i64` fall back to a zero-scale decimal.
fn number_from_literal(literal: &str) -> Result<StructuredValue, CodecError> {
    let parse_decimal = || {
        literal
            .parse::<BigDecimal>()
            .map_err(|e| CodecError::InvalidNumber(format!("{}: {}", literal, e)))
    };

    if literal.contains(['.', 'e', 'E']) {
        return Ok(StructuredValue::Decimal(parse_decimal()?));
    }

    match literal.parse::<i64>() {
        Ok(i) => Ok(StructuredValue::Integer(i)),
        Err(_) => Ok(StructuredValue::Decimal(parse_decimal()?)),
    }
}

impl From<bool> for StructuredValue {
    fn from(value: bool) -> Self {
        StructuredValue::Bool(value)
    }
}

impl From<i64> for StructuredValue {
    fn from(value: i64) -> Self {
        StructuredValue::Integer(value)
    }
}

impl From<i32> for StructuredValue {
    fn from(value: i32) -> Self {
        StructuredValue::Integer(value.into())
    }
}

impl From<BigDecimal> for StructuredValue {
    fn from(value: BigDecimal) -> Self {
        StructuredValue::Decimal(value)
    }
}

impl From<&str> for StructuredValue {
    fn from(value: &str) -> Self {
        StructuredValue::String(value.to_string())
    }
}

impl From<String> for StructuredValue {
    fn from(value: String) -> Self {
        StructuredValue::String(value)
    }
}

impl From<NaiveDate> for StructuredValue {
    fn from(value: NaiveDate) -> Self {
        StructuredValue::Date(value)
    }
}

impl From<NaiveDateTime> for StructuredValue {
    fn from(value: NaiveDateTime) -> Self {
        StructuredValue::DateTime(value)
    }
}

impl From<NaiveTime> for StructuredValue {
    fn from(value: NaiveTime) -> Self {
        StructuredValue::Time(value)
    }
}

impl From<Vec<StructuredValue>> for StructuredValue {
    fn from(value: Vec<StructuredValue>) -> Self {
        StructuredValue::Sequence(value)
    }
}

impl From<Mapping> for StructuredValue {
    fn from(value: Mapping) -> Self {
        StructuredValue::Mapping(value)
    }
}

impl<T: Into<StructuredValue>> From<Option<T>> for StructuredValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StructuredValue::Null, Into::into)
    }
}
