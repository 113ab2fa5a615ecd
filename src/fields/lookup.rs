use std::fmt;
use std::str::FromStr;

use crate::errors::FieldError;

/// Comparison operator a query asks a field to translate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Exact,
    IExact,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    IContains,
    StartsWith,
    EndsWith,
    Range,
    IsNull,
    Regex,
}

impl LookupKind {
    pub const ALL: [LookupKind; 14] = [
        LookupKind::Exact,
        LookupKind::IExact,
        LookupKind::In,
        LookupKind::Gt,
        LookupKind::Gte,
        LookupKind::Lt,
        LookupKind::Lte,
        LookupKind::Contains,
        LookupKind::IContains,
        LookupKind::StartsWith,
        LookupKind::EndsWith,
        LookupKind::Range,
        LookupKind::IsNull,
        LookupKind::Regex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LookupKind::Exact => "exact",
            LookupKind::IExact => "iexact",
            LookupKind::In => "in",
            LookupKind::Gt => "gt",
            LookupKind::Gte => "gte",
            LookupKind::Lt => "lt",
            LookupKind::Lte => "lte",
            LookupKind::Contains => "contains",
            LookupKind::IContains => "icontains",
            LookupKind::StartsWith => "startswith",
            LookupKind::EndsWith => "endswith",
            LookupKind::Range => "range",
            LookupKind::IsNull => "isnull",
            LookupKind::Regex => "regex",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookupKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FieldError::UnknownLookup(s.to_string()))
    }
}
