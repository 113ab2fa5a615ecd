use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::{Binary, Text};
use diesel::sqlite::{Sqlite, SqliteValue};
use tracing::debug;

use crate::codec::{self, Charset, Mapping, StructuredValue};
use crate::errors::CodecError;

/// A decoded JSON field mapping
///
/// Behaves like the mapping it wraps; its `Display` form is the JSON encoding,
/// so fixture and export tooling writes it back out as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonDict(Mapping);

impl JsonDict {
    pub fn new(map: Mapping) -> Self {
        JsonDict(map)
    }

    pub fn into_inner(self) -> Mapping {
        self.0
    }

    /// JSON text of this mapping
    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(&self.0).map_err(|e| CodecError::NotSerializable(e.to_string()))
    }
}

impl Deref for JsonDict {
    type Target = Mapping;

    fn deref(&self) -> &Mapping {
        &self.0
    }
}

impl DerefMut for JsonDict {
    fn deref_mut(&mut self) -> &mut Mapping {
        &mut self.0
    }
}

impl From<Mapping> for JsonDict {
    fn from(map: Mapping) -> Self {
        JsonDict(map)
    }
}

impl fmt::Display for JsonDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Result of the read hook
///
/// `Fallback` carries stored text that could not be decoded. It is handed back
/// unchanged instead of failing the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Absent,
    Decoded(JsonDict),
    Fallback(String),
}

impl ReadOutcome {
    pub fn decoded(&self) -> Option<&JsonDict> {
        match self {
            ReadOutcome::Decoded(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }
}

/// Application-side value accepted by the write hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Dict(JsonDict),
    Sequence(Vec<StructuredValue>),
    /// Assumed to already be JSON text
    Text(String),
}

impl From<Mapping> for FieldValue {
    fn from(map: Mapping) -> Self {
        FieldValue::Dict(JsonDict(map))
    }
}

impl From<JsonDict> for FieldValue {
    fn from(dict: JsonDict) -> Self {
        FieldValue::Dict(dict)
    }
}

impl From<Vec<StructuredValue>> for FieldValue {
    fn from(items: Vec<StructuredValue>) -> Self {
        FieldValue::Sequence(items)
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<ReadOutcome> for FieldValue {
    fn from(outcome: ReadOutcome) -> Self {
        match outcome {
            ReadOutcome::Absent => FieldValue::Null,
            ReadOutcome::Decoded(dict) => FieldValue::Dict(dict),
            ReadOutcome::Fallback(raw) => FieldValue::Text(raw),
        }
    }
}

/// A text column holding a JSON mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonField {
    charset: Charset,
}

impl JsonField {
    pub fn new(charset: Charset) -> Self {
        Self { charset }
    }

    /// Column type reported to schema tooling
    pub fn internal_type(&self) -> &'static str {
        "TextField"
    }

    /// Database to application conversion
    pub fn from_db(&self, stored: Option<&str>) -> ReadOutcome {
        match stored {
            None | Some("") => ReadOutcome::Absent,
            Some(text) => match codec::loads(text) {
                Ok(map) => ReadOutcome::Decoded(JsonDict(map)),
                Err(e) => {
                    debug!(error = %e, "Stored JSON could not be decoded, returning raw text");
                    ReadOutcome::Fallback(text.to_string())
                }
            },
        }
    }

    /// Like [`JsonField::from_db`], but decodes raw column bytes with this field's charset first
    pub fn from_db_bytes(&self, stored: Option<&[u8]>) -> Result<ReadOutcome, CodecError> {
        match stored {
            None => Ok(ReadOutcome::Absent),
            Some(bytes) => {
                let text = self.charset.decode(bytes)?;
                Ok(self.from_db(Some(&text)))
            }
        }
    }

    /// Application to database conversion
    ///
    /// Null and empty text are stored as NULL. Mappings and sequences are
    /// encoded, including empty ones; text is stored as-is.
    pub fn to_db(&self, value: &FieldValue) -> Result<Option<String>, CodecError> {
        match value {
            FieldValue::Null => Ok(None),
            FieldValue::Text(text) if text.is_empty() => Ok(None),
            FieldValue::Text(text) => Ok(Some(text.clone())),
            FieldValue::Dict(dict) => dict.to_json().map(Some),
            FieldValue::Sequence(items) => serde_json::to_string(items)
                .map(Some)
                .map_err(|e| CodecError::NotSerializable(e.to_string())),
        }
    }
}

/// Diesel wrapper running the JSON field hooks on a `Text` column
///
/// Use `Option<JsonColumn>` for nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct JsonColumn(pub FieldValue);

impl JsonColumn {
    pub fn new(value: impl Into<FieldValue>) -> Self {
        JsonColumn(value.into())
    }

    pub fn dict(&self) -> Option<&JsonDict> {
        match &self.0 {
            FieldValue::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Runs the read hook on raw column bytes
    ///
    /// Bytes that are not valid in `charset` fall back to lossy UTF-8 text
    /// rather than failing the read.
    pub fn from_stored_bytes(bytes: &[u8], charset: Charset) -> Self {
        match JsonField::new(charset).from_db_bytes(Some(bytes)) {
            Ok(outcome) => JsonColumn(outcome.into()),
            Err(e) => {
                debug!(error = %e, %charset, "Stored bytes do not match the column charset");
                JsonColumn(FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()))
            }
        }
    }
}

static COLUMN_CHARSET: OnceLock<Charset> = OnceLock::new();

/// Sets the charset every `JsonColumn` read uses for the rest of the process
///
/// Returns `false` if it was already set; the first value wins.
pub fn set_column_charset(charset: Charset) -> bool {
    COLUMN_CHARSET.set(charset).is_ok()
}

/// Charset used by `JsonColumn` reads, utf-8 unless set
pub fn column_charset() -> Charset {
    COLUMN_CHARSET.get().copied().unwrap_or_default()
}

impl FromSql<Text, Sqlite> for JsonColumn {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        // Raw bytes, so a non UTF-8 column charset can be honoured
        let bytes = <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(value)?;
        Ok(JsonColumn::from_stored_bytes(&bytes, column_charset()))
    }
}

impl ToSql<Text, Sqlite> for JsonColumn {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        match JsonField::default().to_db(&self.0)? {
            Some(text) => {
                out.set_value(text);
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }
}
