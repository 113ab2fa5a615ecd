use diesel::prelude::*;
use uuid::Uuid;

use crate::fields::{JsonColumn, PickleColumn};

/// A labelled row carrying one JSON field and one pickled field
///
/// This struct maps directly to the `records` table in the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Record {
    /// Unique identifier for the record (UUID v4 as string)
    id: String,

    /// Free-form label
    label: String,

    /// Structured data, stored as JSON text
    data: Option<JsonColumn>,

    /// Arbitrary object, stored pickled
    payload: Option<PickleColumn<serde_json::Value>>,
}

impl Record {
    /// Creates a new record with a fresh UUID v4 id
    pub fn new(
        label: String,
        data: Option<JsonColumn>,
        payload: Option<PickleColumn<serde_json::Value>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label,
            data,
            payload,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_label(&self) -> String {
        self.label.clone()
    }

    pub fn get_data(&self) -> Option<&JsonColumn> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: Option<JsonColumn>) {
        self.data = data;
    }

    pub fn get_payload(&self) -> Option<&PickleColumn<serde_json::Value>> {
        self.payload.as_ref()
    }
}
