//! Repository module
//!
//! Data access for the `records` table. Every read and write goes through the
//! field adapters via the column types on [`crate::models::Record`].

mod record_repo;

pub use record_repo::*;
