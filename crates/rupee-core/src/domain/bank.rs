use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical bank identifiers. The set is closed; a registry may enable any
/// subset of the banks that have an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BankCode {
    Sampath,
    Commercial,
    Hnb,
    Nsb,
    Seylan,
    Nation,
}

impl BankCode {
    pub const ALL: [Self; 6] = [
        Self::Sampath,
        Self::Commercial,
        Self::Hnb,
        Self::Nsb,
        Self::Seylan,
        Self::Nation,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sampath => "SAMPATH",
            Self::Commercial => "COMMERCIAL",
            Self::Hnb => "HNB",
            Self::Nsb => "NSB",
            Self::Seylan => "SEYLAN",
            Self::Nation => "NATION",
        }
    }

    /// Whether this crate ships an extractor for the bank.
    pub const fn has_extractor(self) -> bool {
        matches!(self, Self::Sampath | Self::Commercial | Self::Hnb)
    }
}

impl Display for BankCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BankCode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SAMPATH" => Ok(Self::Sampath),
            "COMMERCIAL" => Ok(Self::Commercial),
            "HNB" => Ok(Self::Hnb),
            "NSB" => Ok(Self::Nsb),
            "SEYLAN" => Ok(Self::Seylan),
            "NATION" => Ok(Self::Nation),
            _ => Err(ValidationError::UnknownBank {
                value: value.trim().to_owned(),
            }),
        }
    }
}
