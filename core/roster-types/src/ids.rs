//! Identifier types for server-held records.
//!
//! The remote resource owns identity. Ids arrive either as JSON integers or
//! as strings and are kept in the form the server used, so they can be sent
//! back verbatim in request bodies and rendered into URL paths.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Wire representation shared by all record identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(s.to_string()),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Identifier of an employee record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(RawId);

impl EmployeeId {
    /// Creates an id from a numeric server key.
    #[must_use]
    pub const fn from_number(n: i64) -> Self {
        Self(RawId::Number(n))
    }

    /// Returns the numeric key, if the server issued one.
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self.0 {
            RawId::Number(n) => Some(n),
            RawId::Text(_) => None,
        }
    }

    /// Parses an id from its textual form. Integers become numeric ids.
    pub fn parse(s: &str) -> Self {
        Self(RawId::parse(s))
    }
}

impl From<i64> for EmployeeId {
    fn from(n: i64) -> Self {
        Self::from_number(n)
    }
}

impl From<&str> for EmployeeId {
    fn from(s: &str) -> Self {
        Self(RawId::Text(s.to_string()))
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EmployeeId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Identifier of a `sex` reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SexId(RawId);

impl SexId {
    /// Creates an id from a numeric server key.
    #[must_use]
    pub const fn from_number(n: i64) -> Self {
        Self(RawId::Number(n))
    }

    /// Parses an id from its textual form.
    pub fn parse(s: &str) -> Self {
        Self(RawId::parse(s))
    }
}

impl From<i64> for SexId {
    fn from(n: i64) -> Self {
        Self::from_number(n)
    }
}

impl fmt::Display for SexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SexId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
