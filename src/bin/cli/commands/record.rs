use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use jsonfield::codec;
use jsonfield::config::Config;
use jsonfield::db::{self, DbPool};
use jsonfield::fields::{JsonColumn, LookupKind, LookupValue};
use jsonfield::repo;

use crate::output::{self, OutputConfig};

/// Record management commands
#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// Create a new record
    Add {
        /// Label of the record
        #[clap(long)]
        label: String,
        /// JSON object stored in the JSON column
        #[clap(long)]
        data: Option<String>,
        /// JSON value stored in the pickled column
        #[clap(long)]
        payload: Option<String>,
    },
    /// Show a record
    Get {
        /// The record ID
        id: String,
    },
    /// List all records
    List,
    /// Replace the JSON data of a record; clears it when omitted
    SetData {
        /// The record ID
        id: String,
        /// JSON object stored in the JSON column
        data: Option<String>,
    },
    /// Delete a record
    Delete {
        /// The record ID
        id: String,
    },
    /// Find records by their pickled payload
    Find {
        /// Lookup type (only exact and in are supported)
        #[clap(long, default_value = "exact")]
        lookup: LookupKind,
        /// JSON values to compare against
        #[clap(required = true)]
        values: Vec<String>,
    },
}

/// Opens the configured database and applies pending migrations
fn open_pool(config: &Config) -> Result<DbPool> {
    let pool = db::init_pool(&config.database_url);
    let mut conn = pool.get()?;
    db::run_migrations(&mut conn)?;
    drop(conn);
    Ok(pool)
}

fn parse_data(text: &str) -> Result<JsonColumn> {
    let map = codec::loads(text).context("Data must be a JSON object")?;
    Ok(JsonColumn::new(map))
}

fn parse_value(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).with_context(|| format!("Not valid JSON: {}", text))
}

/// Executes a record command
pub fn execute(cmd: RecordCommands, config: &Config, out: &OutputConfig) -> Result<()> {
    let pool = open_pool(config)?;

    match cmd {
        RecordCommands::Add { label, data, payload } => {
            let data = data.as_deref().map(parse_data).transpose()?;
            let payload = payload.as_deref().map(parse_value).transpose()?;
            let record = repo::create_record(&pool, label, data, payload)?;
            output::print_record(&record, out)?;
        }
        RecordCommands::Get { id } => {
            let record = repo::get_record(&pool, &id)?
                .ok_or_else(|| anyhow!("Record not found: {}", id))?;
            output::print_record(&record, out)?;
        }
        RecordCommands::List => {
            let records = repo::list_records(&pool)?;
            output::print_records(&records, out)?;
        }
        RecordCommands::SetData { id, data } => {
            let data = data.as_deref().map(parse_data).transpose()?;
            let record = repo::update_record_data(&pool, &id, data)?
                .ok_or_else(|| anyhow!("Record not found: {}", id))?;
            output::print_record(&record, out)?;
        }
        RecordCommands::Delete { id } => {
            if !repo::delete_record(&pool, &id)? {
                return Err(anyhow!("Record not found: {}", id));
            }
            output::print_success(&format!("Deleted record {}", id), out);
        }
        RecordCommands::Find { lookup, values } => {
            let mut values = values.iter().map(|v| parse_value(v)).collect::<Result<Vec<_>>>()?;
            let value = if lookup != LookupKind::In && values.len() == 1 {
                LookupValue::single(values.remove(0))
            } else {
                LookupValue::many(values)
            };
            let records = repo::find_records_by_payload(&pool, lookup, value)?;
            output::print_records(&records, out)?;
        }
    }
    Ok(())
}
