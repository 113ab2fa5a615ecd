use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CodecError;

/// Text encoding used to turn stored column bytes into a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
}

impl Charset {
    pub fn decode(self, bytes: &[u8]) -> Result<String, CodecError> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| CodecError::Charset(e.to_string())),
            // Every byte maps to the code point of the same value
            Charset::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "latin-1",
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Charset {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Charset::Latin1),
            other => Err(CodecError::Charset(format!("unsupported charset {}", other))),
        }
    }
}

impl TryFrom<String> for Charset {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Charset> for String {
    fn from(value: Charset) -> Self {
        value.as_str().to_string()
    }
}
