//! jsonfield: JSON and pickled-object column types for diesel
//!
//! Two independent text-column field types:
//!
//! - a JSON field that stores a string-keyed mapping as JSON text, keeping
//!   decimals exact and turning dates and datetimes into ISO-8601 strings
//! - a pickled object field that stores any serde-serializable value as a
//!   base64-wrapped CBOR blob
//!
//! ### Modules
//!
//! - `codec`: the JSON `dumps`/`loads` pair and the `StructuredValue` model
//! - `fields`: read/write hooks, lookup translation and the diesel column wrappers
//! - `config`: layered configuration (defaults, TOML file, environment, CLI)
//! - `db`, `schema`, `models`, `repo`: a SQLite table exercising both fields

/// JSON codec module
pub mod codec;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Error types
pub mod errors;

/// Field adapter module
pub mod fields;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

#[cfg(test)]
pub mod test_utils;

pub use codec::{dumps, loads, Mapping, StructuredValue};
pub use errors::{CodecError, FieldError};
pub use fields::{JsonField, PickledObjectField};
