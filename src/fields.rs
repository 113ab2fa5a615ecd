//! Field adapters plugging the codecs into diesel
//!
//! Each field exposes the three hooks a column type needs: a read conversion
//! (`from_db`), a write conversion (`to_db`) and, for the pickle field, lookup
//! translation (`prep_lookup`). The `*Column` wrappers wire the read and write
//! hooks into diesel's `FromSql`/`ToSql`.

mod json_field;
mod lookup;
mod pickle_field;

pub use json_field::{
    column_charset, set_column_charset, FieldValue, JsonColumn, JsonDict, JsonField, ReadOutcome,
};
pub use lookup::LookupKind;
pub use pickle_field::{
    pickle, unpickle, LookupValue, PickleColumn, Pickled, PickledObject, PickledObjectField,
    PreparedLookup, Stored, Unpickled,
};
