use anyhow::Result;
use clap::ValueEnum;
use jsonfield::fields::{FieldValue, JsonColumn, PickleColumn, ReadOutcome, Unpickled};
use jsonfield::models::Record;
use serde_json::{json, Value};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

/// Prints a bare text result
pub fn print_text(text: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => println!("{}", text),
        OutputFormat::Json => println!("{}", json!({ "result": text })),
    }
}

/// Prints a JSON value
pub fn print_json(value: &Value, config: &OutputConfig) -> Result<()> {
    match config.format {
        OutputFormat::Human => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Prints a success message
pub fn print_success(message: &str, config: &OutputConfig) {
    if config.quiet {
        return;
    }
    match config.format {
        OutputFormat::Human => println!("{}", message),
        OutputFormat::Json => println!("{}", json!({ "success": true, "message": message })),
    }
}

/// Prints the result of the JSON field read hook
pub fn print_read_outcome(outcome: &ReadOutcome, config: &OutputConfig) -> Result<()> {
    match config.format {
        OutputFormat::Human => match outcome {
            ReadOutcome::Absent => println!("absent"),
            ReadOutcome::Decoded(dict) => println!("decoded: {}", dict),
            ReadOutcome::Fallback(raw) => println!("fallback: {}", raw),
        },
        OutputFormat::Json => {
            let rendered = match outcome {
                ReadOutcome::Absent => json!({ "outcome": "absent" }),
                ReadOutcome::Decoded(dict) => {
                    let value: Value = serde_json::from_str(&dict.to_json()?)?;
                    json!({ "outcome": "decoded", "value": value })
                }
                ReadOutcome::Fallback(raw) => json!({ "outcome": "fallback", "value": raw }),
            };
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }
    Ok(())
}

fn data_text(data: Option<&JsonColumn>) -> Result<Option<String>> {
    let Some(JsonColumn(value)) = data else {
        return Ok(None);
    };
    Ok(match value {
        FieldValue::Null => None,
        FieldValue::Dict(dict) => Some(dict.to_json()?),
        FieldValue::Sequence(items) => Some(serde_json::to_string(items)?),
        FieldValue::Text(text) => Some(text.clone()),
    })
}

fn payload_text(payload: Option<&PickleColumn<Value>>) -> Result<Option<String>> {
    Ok(match payload.map(|p| &p.0) {
        None => None,
        Some(Unpickled::Value(value)) => Some(serde_json::to_string(value)?),
        Some(Unpickled::Raw(raw)) => Some(raw.clone()),
    })
}

fn record_json(record: &Record) -> Result<Value> {
    let data = match record.get_data() {
        Some(JsonColumn(FieldValue::Text(raw))) => Value::String(raw.clone()),
        other => match data_text(other)? {
            Some(text) => serde_json::from_str(&text)?,
            None => Value::Null,
        },
    };
    let payload = match record.get_payload().map(|p| &p.0) {
        Some(Unpickled::Value(value)) => value.clone(),
        Some(Unpickled::Raw(raw)) => Value::String(raw.clone()),
        None => Value::Null,
    };
    Ok(json!({
        "id": record.get_id(),
        "label": record.get_label(),
        "data": data,
        "payload": payload,
    }))
}

/// Prints a single record in the specified format
pub fn print_record(record: &Record, config: &OutputConfig) -> Result<()> {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", record.get_id());
                return Ok(());
            }
            println!("ID:      {}", record.get_id());
            println!("Label:   {}", record.get_label());
            println!(
                "Data:    {}",
                data_text(record.get_data())?.unwrap_or_else(|| "-".to_string())
            );
            println!(
                "Payload: {}",
                payload_text(record.get_payload())?.unwrap_or_else(|| "-".to_string())
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record_json(record)?)?);
        }
    }
    Ok(())
}

/// Prints a list of records in the specified format
pub fn print_records(records: &[Record], config: &OutputConfig) -> Result<()> {
    match config.format {
        OutputFormat::Human => {
            if records.is_empty() {
                if !config.quiet {
                    println!("No records found.");
                }
                return Ok(());
            }
            if config.quiet {
                for record in records {
                    println!("{}", record.get_id());
                }
                return Ok(());
            }
            let max_id = records.iter().map(|r| r.get_id().len()).max().unwrap_or(2);
            let max_label = records.iter().map(|r| r.get_label().len()).max().unwrap_or(5).max(5);
            println!("{:<id$}  {:<label$}  DATA", "ID", "LABEL", id = max_id, label = max_label);
            for record in records {
                println!(
                    "{:<id$}  {:<label$}  {}",
                    record.get_id(),
                    record.get_label(),
                    data_text(record.get_data())?.unwrap_or_else(|| "-".to_string()),
                    id = max_id,
                    label = max_label
                );
            }
        }
        OutputFormat::Json => {
            let rendered = records.iter().map(record_json).collect::<Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }
    Ok(())
}
