//! Audit trail domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State change recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeAction {
    Added,
    Reserved,
    Released,
    Deleted,
}

impl CodeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Reserved => "RESERVED",
            Self::Released => "RELEASED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string cannot be parsed as a [`CodeAction`].
#[derive(Debug, Error)]
#[error("unknown code action: {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for CodeAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADDED" => Ok(Self::Added),
            "RESERVED" => Ok(Self::Reserved),
            "RELEASED" => Ok(Self::Released),
            "DELETED" => Ok(Self::Deleted),
            other => Err(UnknownAction(other.to_owned())),
        }
    }
}
