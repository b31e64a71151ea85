//! Public service categories and their known providers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator used when several providers share one report
pub const PROVIDER_SEPARATOR: &str = " + ";

/// Kind of public service affected by an outage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Power outage
    #[serde(alias = "luz")]
    Electricity,

    /// Water supply outage
    #[serde(alias = "agua")]
    Water,

    /// Internet or telephony outage
    Internet,

    /// Anything else
    #[serde(alias = "otros", alias = "otro")]
    Other,
}

impl ServiceType {
    /// All service types, in display order
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Electricity,
        ServiceType::Water,
        ServiceType::Internet,
        ServiceType::Other,
    ];

    /// Stable lowercase code used for storage and the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Internet => "internet",
            Self::Other => "other",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Electricity => "Electricity",
            Self::Water => "Water",
            Self::Internet => "Internet",
            Self::Other => "Other services",
        }
    }

    /// Known providers for this service. Free-form providers are still accepted.
    pub fn providers(&self) -> &'static [&'static str] {
        match self {
            Self::Electricity => &[
                "ICE",
                "CNFL",
                "ESPH",
                "JASEC",
                "COOPELESCA",
                "COOPEGUANACASTE",
                "Other",
            ],
            Self::Water => &["AyA", "ESPH", "ASADAS", "Municipalidad", "Other"],
            Self::Internet => &["ICE/Kolbi", "Claro", "Movistar", "Tigo", "Cable Tica", "Other"],
            Self::Other => &["Other"],
        }
    }

    /// Whether the provider is in this service's catalog
    pub fn is_known_provider(&self, provider: &str) -> bool {
        self.providers().iter().any(|p| *p == provider)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a service type string is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service type: {0}")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "electricity" | "luz" => Ok(Self::Electricity),
            "water" | "agua" => Ok(Self::Water),
            "internet" => Ok(Self::Internet),
            "other" | "otros" | "otro" => Ok(Self::Other),
            _ => Err(UnknownServiceType(s.to_string())),
        }
    }
}

/// Read-only view over a possibly merged provider string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Providers<'a>(&'a str);

impl<'a> Providers<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    /// The individual providers in merge order
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.0
            .split(PROVIDER_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// More than one provider has been merged into this report
    pub fn is_merged(&self) -> bool {
        self.len() > 1
    }

    /// Substring containment against the raw value.
    ///
    /// This is intentionally looser than membership: "ICE" is found inside
    /// "SERVICE-X", which blocks the merge of "ICE".
    pub fn contains(&self, provider: &str) -> bool {
        self.0.contains(provider)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

/// Append a provider to a merged provider string
pub fn append_provider(existing: &str, provider: &str) -> String {
    if existing.trim().is_empty() {
        return provider.to_string();
    }
    format!("{}{}{}", existing, PROVIDER_SEPARATOR, provider)
}
