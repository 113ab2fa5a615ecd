use crate::db::DbPool;
use crate::fields::{
    JsonColumn, LookupKind, LookupValue, PickleColumn, PickledObjectField, PreparedLookup,
};
use crate::models::Record;
use crate::schema::records;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Creates a new record in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `label` - The label for the new record
/// * `data` - Structured data for the JSON column, if any
/// * `payload` - Object for the pickled column, if any
///
/// ### Returns
///
/// A Result containing the newly created Record if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - A value cannot be encoded for its column
/// - The database insert operation fails
#[instrument(skip(pool, data, payload), fields(label = %label))]
pub fn create_record(
    pool: &DbPool,
    label: String,
    data: Option<JsonColumn>,
    payload: Option<serde_json::Value>,
) -> Result<Record> {
    debug!("Creating new record");

    let mut conn = pool.get()?;

    let new_record = Record::new(label, data, payload.map(PickleColumn::new));

    diesel::insert_into(records::table)
        .values(new_record.clone())
        .execute(&mut conn)?;

    info!("Successfully created record with id: {}", new_record.get_id());

    Ok(new_record)
}

/// Retrieves a record from the database by its ID
///
/// ### Returns
///
/// A Result containing an Option with the Record if found, or None if not found
#[instrument(skip(pool), fields(record_id = %record_id))]
pub fn get_record(pool: &DbPool, record_id: &str) -> Result<Option<Record>> {
    debug!("Retrieving record by id");

    let mut conn = pool.get()?;

    let result = records::table
        .filter(records::id.eq(record_id))
        .select(Record::as_select())
        .first(&mut conn)
        .optional()?;

    Ok(result)
}

/// Retrieves all records from the database
#[instrument(skip(pool))]
pub fn list_records(pool: &DbPool) -> Result<Vec<Record>> {
    debug!("Listing all records");

    let mut conn = pool.get()?;

    let result = records::table
        .order(records::label.asc())
        .select(Record::as_select())
        .load(&mut conn)?;

    info!("Retrieved {} records", result.len());

    Ok(result)
}

/// Replaces the JSON data of a record
///
/// ### Returns
///
/// A Result containing the updated Record, or None if no record has that ID
#[instrument(skip(pool, data), fields(record_id = %record_id))]
pub fn update_record_data(
    pool: &DbPool,
    record_id: &str,
    data: Option<JsonColumn>,
) -> Result<Option<Record>> {
    debug!("Updating record data");

    let mut conn = pool.get()?;

    let updated = diesel::update(records::table.filter(records::id.eq(record_id)))
        .set(records::data.eq(data))
        .execute(&mut conn)?;

    drop(conn);

    if updated == 0 {
        debug!("No record with that id");
        return Ok(None);
    }

    get_record(pool, record_id)
}

/// Deletes a record
///
/// ### Returns
///
/// `true` if a record was deleted
#[instrument(skip(pool), fields(record_id = %record_id))]
pub fn delete_record(pool: &DbPool, record_id: &str) -> Result<bool> {
    let mut conn = pool.get()?;

    let deleted =
        diesel::delete(records::table.filter(records::id.eq(record_id))).execute(&mut conn)?;

    Ok(deleted > 0)
}

/// Finds records whose pickled payload matches a lookup
///
/// The comparison values are pickled before the query is built, so only
/// `exact` and `in` lookups are accepted.
///
/// ### Errors
///
/// Returns an error if:
/// - The lookup kind is not supported by the pickled column
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool, value), fields(kind = %kind))]
pub fn find_records_by_payload(
    pool: &DbPool,
    kind: LookupKind,
    value: LookupValue<serde_json::Value>,
) -> Result<Vec<Record>> {
    let prepared = PickledObjectField.prep_lookup(kind, value)?;

    debug!("Prepared lookup with {} value(s)", prepared.values().len());

    let mut conn = pool.get()?;

    let query = records::table.select(Record::as_select()).order(records::label.asc());
    let result = match prepared {
        PreparedLookup::Exact(pickled) => query
            .filter(records::payload.eq(pickled.into_inner()))
            .load(&mut conn)?,
        PreparedLookup::In(pickled) => query
            .filter(records::payload.eq_any(
                pickled.into_iter().map(|p| p.into_inner()).collect::<Vec<_>>(),
            ))
            .load(&mut conn)?,
    };

    Ok(result)
}

#[cfg(test)]
mod tests;
