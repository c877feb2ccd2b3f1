use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifiers are kept as the search service returns them; only surrounding
/// whitespace is dropped. Extended ids such as `pdb_00001abc` carry an underscore.
impl FromStr for EntryId {
    type Err = FetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !is_valid {
            return Err(FetchError::InvalidEntryId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperimentalMethod {
    XrayDiffraction,
    ElectronMicroscopy,
    Nmr,
}

impl ExperimentalMethod {
    pub const ALL: [ExperimentalMethod; 3] = [
        ExperimentalMethod::XrayDiffraction,
        ExperimentalMethod::ElectronMicroscopy,
        ExperimentalMethod::Nmr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentalMethod::XrayDiffraction => "X-RAY DIFFRACTION",
            ExperimentalMethod::ElectronMicroscopy => "ELECTRON MICROSCOPY",
            ExperimentalMethod::Nmr => "NMR",
        }
    }
}

impl fmt::Display for ExperimentalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentalMethod {
    type Err = FetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "X RAY DIFFRACTION" | "XRAY" | "X RAY" => Ok(ExperimentalMethod::XrayDiffraction),
            "ELECTRON MICROSCOPY" | "EM" | "CRYO EM" => Ok(ExperimentalMethod::ElectronMicroscopy),
            "NMR" => Ok(ExperimentalMethod::Nmr),
            _ => Err(FetchError::InvalidMethod(value.to_string())),
        }
    }
}
