use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::lookup::LookupKind;
use crate::errors::FieldError;

/// Text known to hold a pickled object
///
/// Only produced by [`pickle`] or by a caller that vouches for the text with
/// [`PickledObject::from_trusted`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PickledObject(String);

impl PickledObject {
    pub fn from_trusted(text: impl Into<String>) -> Self {
        PickledObject(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PickledObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Struct name `serde_json` gives a `Number` when it keeps literals verbatim
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// Serializes a value to CBOR and wraps it as base64 text
///
/// JSON numbers are written as CBOR integers or floats, so a pickled
/// `serde_json::Value` matches the pickle of the equivalent typed value.
pub fn pickle<T: Serialize + ?Sized>(value: &T) -> Result<PickledObject, FieldError> {
    let mut tree =
        ciborium::Value::serialized(value).map_err(|e| FieldError::Pickle(e.to_string()))?;
    native_numbers(&mut tree)?;

    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&tree, &mut bytes).map_err(|e| FieldError::Pickle(e.to_string()))?;
    Ok(PickledObject(STANDARD.encode(bytes)))
}

/// Replaces every verbatim JSON number literal with a CBOR number
fn native_numbers(value: &mut ciborium::Value) -> Result<(), FieldError> {
    use ciborium::Value;

    if let Some(number) = json_number(value)? {
        *value = number;
        return Ok(());
    }

    match value {
        Value::Map(entries) => {
            for (key, item) in entries.iter_mut() {
                native_numbers(key)?;
                native_numbers(item)?;
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                native_numbers(item)?;
            }
        }
        Value::Tag(_, inner) => native_numbers(inner)?,
        _ => {}
    }
    Ok(())
}

/// The CBOR number for a `{"$serde_json::private::Number": literal}` map
fn json_number(value: &ciborium::Value) -> Result<Option<ciborium::Value>, FieldError> {
    use ciborium::Value;

    match value {
        Value::Map(entries) => match entries.as_slice() {
            [(Value::Text(key), Value::Text(literal))] if key == JSON_NUMBER_TOKEN => {
                number_from_literal(literal).map(Some)
            }
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

fn number_from_literal(literal: &str) -> Result<ciborium::Value, FieldError> {
    if let Ok(i) = literal.parse::<i64>() {
        return Ok(ciborium::Value::Integer(i.into()));
    }
    if let Ok(u) = literal.parse::<u64>() {
        return Ok(ciborium::Value::Integer(u.into()));
    }
    literal
        .parse::<f64>()
        .map(ciborium::Value::Float)
        .map_err(|e| FieldError::Pickle(format!("invalid number {}: {}", literal, e)))
}

/// Inverse of [`pickle`]
pub fn unpickle<T: DeserializeOwned>(text: &str) -> Result<T, FieldError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| FieldError::Unpickle(e.to_string()))?;
    ciborium::de::from_reader(bytes.as_slice()).map_err(|e| FieldError::Unpickle(e.to_string()))
}

/// A value on its way into the column: either still raw or already pickled
#[derive(Debug, Clone, PartialEq)]
pub enum Pickled<T> {
    Raw(T),
    Encoded(PickledObject),
}

/// A value read out of the column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    /// The caller asserts this is pickled; failures propagate
    Tagged(PickledObject),
    /// Could be anything, e.g. rows written before the column was pickled
    Untagged(String),
}

/// Result of the read hook
#[derive(Debug, Clone, PartialEq)]
pub enum Unpickled<T> {
    Value(T),
    /// Untagged text that did not unpickle, returned unchanged
    Raw(String),
}

impl<T> Unpickled<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Unpickled::Value(v) => Some(v),
            Unpickled::Raw(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Unpickled::Value(v) => Some(v),
            Unpickled::Raw(_) => None,
        }
    }
}

/// Comparison value(s) handed to [`PickledObjectField::prep_lookup`]
#[derive(Debug, Clone, PartialEq)]
pub enum LookupValue<T> {
    Single(Pickled<T>),
    Many(Vec<Pickled<T>>),
}

impl<T> LookupValue<T> {
    pub fn single(value: T) -> Self {
        LookupValue::Single(Pickled::Raw(value))
    }

    pub fn many(values: impl IntoIterator<Item = T>) -> Self {
        LookupValue::Many(values.into_iter().map(Pickled::Raw).collect())
    }
}

/// A lookup rewritten in terms of the stored text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedLookup {
    Exact(PickledObject),
    In(Vec<PickledObject>),
}

impl PreparedLookup {
    pub fn kind(&self) -> LookupKind {
        match self {
            PreparedLookup::Exact(_) => LookupKind::Exact,
            PreparedLookup::In(_) => LookupKind::In,
        }
    }

    /// Stored text to compare the column against
    pub fn values(&self) -> Vec<&str> {
        match self {
            PreparedLookup::Exact(p) => vec![p.as_str()],
            PreparedLookup::In(ps) => ps.iter().map(PickledObject::as_str).collect(),
        }
    }
}

/// A text column holding arbitrary serializable objects
#[derive(Debug, Clone, Copy, Default)]
pub struct PickledObjectField;

impl PickledObjectField {
    /// Column type reported to schema tooling
    pub fn internal_type(&self) -> &'static str {
        "TextField"
    }

    /// Database to application conversion
    ///
    /// ### Errors
    ///
    /// Returns `FieldError::Unpickle` only for tagged input. Untagged input
    /// that fails to unpickle comes back as `Unpickled::Raw`.
    pub fn from_db<T: DeserializeOwned>(&self, stored: Stored) -> Result<Unpickled<T>, FieldError> {
        match stored {
            Stored::Tagged(pickled) => unpickle(pickled.as_str()).map(Unpickled::Value),
            Stored::Untagged(text) => match unpickle(&text) {
                Ok(value) => Ok(Unpickled::Value(value)),
                Err(e) => {
                    debug!(error = %e, "Stored value is not pickled, returning it unchanged");
                    Ok(Unpickled::Raw(text))
                }
            },
        }
    }

    /// Application to database conversion; already pickled values pass through
    pub fn to_db<T: Serialize>(
        &self,
        value: Option<Pickled<T>>,
    ) -> Result<Option<PickledObject>, FieldError> {
        value.map(|v| self.prep_save(v)).transpose()
    }

    fn prep_save<T: Serialize>(&self, value: Pickled<T>) -> Result<PickledObject, FieldError> {
        match value {
            Pickled::Raw(raw) => pickle(&raw),
            Pickled::Encoded(pickled) => Ok(pickled),
        }
    }

    /// Translates a lookup into one over the pickled text
    ///
    /// Only `exact` and `in` make sense against pickled text. Every other kind
    /// is rejected with `FieldError::UnsupportedLookup`.
    pub fn prep_lookup<T: Serialize>(
        &self,
        kind: LookupKind,
        value: LookupValue<T>,
    ) -> Result<PreparedLookup, FieldError> {
        match (kind, value) {
            (LookupKind::Exact, LookupValue::Single(v)) => {
                Ok(PreparedLookup::Exact(self.prep_save(v)?))
            }
            (LookupKind::In, LookupValue::Many(vs)) => Ok(PreparedLookup::In(
                vs.into_iter().map(|v| self.prep_save(v)).collect::<Result<_, _>>()?,
            )),
            (LookupKind::Exact | LookupKind::In, _) => Err(FieldError::LookupShape(kind)),
            (other, _) => Err(FieldError::UnsupportedLookup(other)),
        }
    }
}

/// Diesel wrapper running the pickle field hooks on a `Text` column
///
/// Column text is always read as untagged. Text that fails to unpickle is
/// kept as `Unpickled::Raw`; saving it again pickles it as a string.
#[derive(Debug, Clone, PartialEq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct PickleColumn<T>(pub Unpickled<T>);

impl<T> PickleColumn<T> {
    pub fn new(value: T) -> Self {
        PickleColumn(Unpickled::Value(value))
    }
}

impl<T: DeserializeOwned> FromSql<Text, Sqlite> for PickleColumn<T> {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(PickleColumn(PickledObjectField.from_db(Stored::Untagged(text))?))
    }
}

impl<T: Serialize + fmt::Debug> ToSql<Text, Sqlite> for PickleColumn<T> {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        match &self.0 {
            Unpickled::Value(value) => out.set_value(pickle(value)?.into_inner()),
            Unpickled::Raw(raw) => out.set_value(pickle(raw)?.into_inner()),
        }
        Ok(IsNull::No)
    }
}
