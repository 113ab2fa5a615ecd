use std::io::{self, Read};

use anyhow::{Context, Result};
use jsonfield::codec::{self, StructuredValue};
use jsonfield::config::Config;
use jsonfield::fields::{self, JsonField, PickledObject, PickledObjectField, Stored};
use tracing::debug;

use crate::output::{self, OutputConfig};

/// Returns the argument bytes, or everything on stdin without its trailing newline
fn read_input(text: Option<String>) -> Result<Vec<u8>> {
    if let Some(text) = text {
        return Ok(text.into_bytes());
    }

    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf).context("Failed to read stdin")?;
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    debug!("Read {} bytes from stdin", buf.len());
    Ok(buf)
}

/// Decodes JSON text and prints its canonical encoding
pub fn normalize(text: Option<String>, config: &Config, out: &OutputConfig) -> Result<()> {
    let bytes = read_input(text)?;
    let map = codec::loads_bytes(&bytes, config.default_charset)?;
    let encoded = codec::dumps(&StructuredValue::Mapping(map))?;
    output::print_text(&encoded, out);
    Ok(())
}

/// Runs the JSON field read hook and reports what it produced
pub fn inspect(text: Option<String>, config: &Config, out: &OutputConfig) -> Result<()> {
    let bytes = read_input(text)?;
    let outcome = JsonField::new(config.default_charset).from_db_bytes(Some(&bytes))?;
    output::print_read_outcome(&outcome, out)
}

/// Pickles a JSON value
pub fn pickle(value: &str, out: &OutputConfig) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(value).context("Value is not valid JSON")?;
    let pickled = fields::pickle(&value)?;
    output::print_text(pickled.as_str(), out);
    Ok(())
}

/// Unpickles a payload the caller asserts is pickled, failing on corrupt input
pub fn unpickle(text: &str, out: &OutputConfig) -> Result<()> {
    let stored = Stored::Tagged(PickledObject::from_trusted(text));
    let value = PickledObjectField
        .from_db::<serde_json::Value>(stored)?
        .into_value()
        .context("Payload did not unpickle")?;
    output::print_json(&value, out)
}
