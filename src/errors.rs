use thiserror::Error;

use crate::fields::LookupKind;

/// Errors raised by the JSON codec
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Top-level value must be a mapping")]
    NotAMapping,
    #[error("Value is not JSON serializable: {0}")]
    NotSerializable(String),
    #[error("Malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid numeric literal: {0}")]
    InvalidNumber(String),
    #[error("Charset error: {0}")]
    Charset(String),
}

/// Errors raised by the field adapters
#[derive(Error, Debug)]
pub enum FieldError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Failed to pickle value: {0}")]
    Pickle(String),
    #[error("Failed to unpickle value: {0}")]
    Unpickle(String),
    #[error("Lookup type {0} is not supported.")]
    UnsupportedLookup(LookupKind),
    #[error("Lookup type {0} got the wrong number of values")]
    LookupShape(LookupKind),
    #[error("Unknown lookup type: {0}")]
    UnknownLookup(String),
}
