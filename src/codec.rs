//! JSON codec for structured field values
//!
//! `dumps` and `loads` convert between a top-level [`Mapping`] and JSON text.
//! On top of plain JSON, the codec:
//!
//! - writes decimals as exact numeric literals and reads fractional literals
//!   back as [`bigdecimal::BigDecimal`]
//! - writes dates, datetimes and times as ISO-8601 strings
//! - turns timestamp-shaped strings back into dates and datetimes on read

mod charset;
mod decode;
mod encode;
mod value;

pub use charset::Charset;
pub use decode::{loads, loads_bytes, reconstruct_timestamps};
pub use encode::{dumps, dumps_value};
pub use value::{Mapping, StructuredValue};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";
