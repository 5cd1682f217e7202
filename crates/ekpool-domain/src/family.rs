//! Code family domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level code category. Each family owns exactly one pool.
///
/// Wire format: upper-case (`"HSV"`, `"OSV"`, `"COMMON"`). Parsing is
/// case-insensitive so `"Common"` and `"hsv"` are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    Hsv,
    Osv,
    Common,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Hsv, Family::Osv, Family::Common];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hsv => "HSV",
            Self::Osv => "OSV",
            Self::Common => "COMMON",
        }
    }

    /// Country-scoped families draw only codes added for the requested country.
    pub fn requires_country(self) -> bool {
        !matches!(self, Self::Common)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string cannot be parsed as a [`Family`].
#[derive(Debug, Error)]
#[error("unknown code family: {0:?}")]
pub struct UnknownFamily(pub String);

impl FromStr for Family {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HSV" => Ok(Self::Hsv),
            "OSV" => Ok(Self::Osv),
            "COMMON" => Ok(Self::Common),
            _ => Err(UnknownFamily(s.to_owned())),
        }
    }
}

impl Serialize for Family {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Family {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::unknown_variant(&s, &["HSV", "OSV", "COMMON"]))
    }
}

/// Whether a code is free to draw or currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeState {
    Available,
    Reserved,
}

impl CodeState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(Self::Available),
            "RESERVED" => Some(Self::Reserved),
            _ => None,
        }
    }
}
