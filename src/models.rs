//! Data models backed by the field adapters

mod record;
pub use record::Record;
