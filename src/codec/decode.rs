use chrono::{NaiveDate, NaiveDateTime};

use super::charset::Charset;
use super::value::{Mapping, StructuredValue};
use super::{DATETIME_FORMAT, DATE_FORMAT};
use crate::errors::CodecError;

/// Decodes JSON text into a mapping
///
/// Fractional and exponent literals become exact decimals, and every string
/// leaf that looks like a timestamp is turned back into one (see
/// [`reconstruct_timestamps`]).
///
/// ### Errors
///
/// - `CodecError::Decode` if the text is not well-formed JSON
/// - `CodecError::NotAMapping` if the top-level value is not an object
pub fn loads(text: &str) -> Result<Mapping, CodecError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    let mut value = StructuredValue::from_json(json)?;
    reconstruct_timestamps(&mut value);
    value.into_mapping().ok_or(CodecError::NotAMapping)
}

/// Decodes raw column bytes with the given charset, then behaves like [`loads`]
pub fn loads_bytes(bytes: &[u8], charset: Charset) -> Result<Mapping, CodecError> {
    let text = charset.decode(bytes)?;
    loads(&text)
}

/// Walks every mapping and sequence, replacing timestamp-shaped strings
///
/// A string matching `YYYY-MM-DDTHH:MM:SS` becomes a `DateTime`; failing that,
/// one matching `YYYY-MM-DD` becomes a `Date`. Anything else is left alone.
/// Strings that merely look like timestamps are converted too: the encoded
/// form carries no type information to tell them apart.
pub fn reconstruct_timestamps(value: &mut StructuredValue) {
    match value {
        StructuredValue::Mapping(map) => map.values_mut().for_each(reconstruct_timestamps),
        StructuredValue::Sequence(items) => items.iter_mut().for_each(reconstruct_timestamps),
        StructuredValue::String(s) => {
            if let Some(parsed) = parse_timestamp(s) {
                *value = parsed;
            }
        }
        _ => {}
    }
}

fn parse_timestamp(text: &str) -> Option<StructuredValue> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(StructuredValue::DateTime(dt));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .map(StructuredValue::Date)
}
