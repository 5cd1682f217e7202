//! Country catalog and region grouping.
//!
//! Region is display-only and never persisted per code; it is looked up from
//! the catalog at request time.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse geographic grouping of countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "EU")]
    Europe,
    #[serde(rename = "AP")]
    AsiaPacific,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NorthAmerica => "NA",
            Self::Europe => "EU",
            Self::AsiaPacific => "AP",
        }
    }

    /// Parse the two-letter wire code. Returns `None` for unknown values.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NA" => Some(Self::NorthAmerica),
            "EU" => Some(Self::Europe),
            "AP" => Some(Self::AsiaPacific),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted country and the region it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub name: String,
    pub region: Region,
}

/// Errors raised while loading a catalog table.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate country in catalog: {0:?}")]
    Duplicate(String),
    #[error("blank country name in catalog")]
    BlankName,
}

/// Accepted countries with their region mapping.
///
/// Lookups are case-insensitive and ignore surrounding whitespace; the
/// catalog spelling is the canonical one stored on codes and audit entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCatalog {
    entries: Vec<CountryEntry>,
}

const NORTH_AMERICA: &[&str] = &["US", "Canada", "Puerto Rico"];

const EUROPE: &[&str] = &[
    "Austria",
    "Belgium",
    "Bulgaria",
    "Cyprus",
    "Czech Republic",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "Ireland",
    "Italy",
    "Latvia",
    "Lithuania",
    "Luxembourg",
    "Malta",
    "Netherlands",
    "Norway",
    "Poland",
    "Portugal",
    "Romania",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
    "Switzerland",
    "UK",
];

const ASIA_PACIFIC: &[&str] = &["Australia", "Hong Kong", "NZ", "Singapore"];

impl CountryCatalog {
    /// Build a catalog, rejecting blank or repeated names.
    pub fn new(entries: Vec<CountryEntry>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            let key = entry.name.trim().to_lowercase();
            if key.is_empty() {
                return Err(CatalogError::BlankName);
            }
            if !seen.insert(key) {
                return Err(CatalogError::Duplicate(entry.name.clone()));
            }
        }
        let mut entries = entries;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { entries })
    }

    /// Parse a JSON array of `{ "name": ..., "region": "NA" | "EU" | "AP" }`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CountryEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// The compiled-in table used when no catalog file is configured.
    pub fn builtin() -> Self {
        let mut entries = Vec::new();
        for (region, names) in [
            (Region::NorthAmerica, NORTH_AMERICA),
            (Region::Europe, EUROPE),
            (Region::AsiaPacific, ASIA_PACIFIC),
        ] {
            entries.extend(names.iter().map(|name| CountryEntry {
                name: (*name).to_owned(),
                region,
            }));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    pub fn lookup(&self, country: &str) -> Option<&CountryEntry> {
        let needle = country.trim();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(needle))
    }

    pub fn region_of(&self, country: &str) -> Option<Region> {
        self.lookup(country).map(|e| e.region)
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }
}

impl Default for CountryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
