use crate::error::{ZkYieldError, ZkYieldResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Jurisdictions a credential may claim. The numeric code is what the
/// KYC circuit and the compliance contract compare against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jurisdiction {
    Us,
    Eu,
    Singapore,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 3] = [Self::Us, Self::Eu, Self::Singapore];

    pub fn code(&self) -> u8 {
        match self {
            Self::Us => 1,
            Self::Eu => 2,
            Self::Singapore => 3,
        }
    }

    pub fn from_code(code: u64) -> ZkYieldResult<Self> {
        match code {
            1 => Ok(Self::Us),
            2 => Ok(Self::Eu),
            3 => Ok(Self::Singapore),
            other => Err(ZkYieldError::InputValidation(format!(
                "Unknown jurisdiction code: {}",
                other
            ))),
        }
    }

    /// Country component mixed into the credential hash.
    pub fn country_code(&self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Eu => "EU",
            Self::Singapore => "SG",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Eu => "European Union",
            Self::Singapore => "Singapore",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.code())
    }
}

impl FromStr for Jurisdiction {
    type Err = ZkYieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "us" | "usa" | "united-states" | "1" => Ok(Self::Us),
            "eu" | "european-union" | "2" => Ok(Self::Eu),
            "sg" | "singapore" | "3" => Ok(Self::Singapore),
            _ => Err(ZkYieldError::InputValidation(format!(
                "Unknown jurisdiction: {}",
                s
            ))),
        }
    }
}
