use crate::error::{ZkYieldError, ZkYieldResult};
use crate::ETH_DECIMALS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native-token amount held as base units (wei for ETH).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: u128,
    pub decimals: u8,
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self::zero(ETH_DECIMALS)
    }
}

impl TokenAmount {
    pub fn from_raw(raw: u128, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn wei(raw: u128) -> Self {
        Self::from_raw(raw, ETH_DECIMALS)
    }

    pub fn from_decimal(s: &str, decimals: u8) -> ZkYieldResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ZkYieldError::InputValidation("Amount is required".into()));
        }
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 2 {
            return Err(ZkYieldError::InputValidation(format!(
                "Invalid decimal format: {}",
                s
            )));
        }

        let whole: u128 = if parts[0].is_empty() {
            0
        } else {
            parts[0]
                .parse()
                .map_err(|_| ZkYieldError::InputValidation(format!("Invalid number: {}", s)))?
        };

        let frac = if parts.len() == 2 && !parts[1].is_empty() {
            let frac_str = parts[1];
            if frac_str.len() > decimals as usize {
                return Err(ZkYieldError::InputValidation(
                    "Too many decimal places".into(),
                ));
            }
            let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
            padded
                .parse::<u128>()
                .map_err(|_| ZkYieldError::InputValidation(format!("Invalid fraction: {}", s)))?
        } else {
            0
        };

        let multiplier = 10u128.pow(decimals as u32);
        let raw = whole
            .checked_mul(multiplier)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(|| ZkYieldError::InputValidation("Amount overflow".into()))?;

        Ok(Self { raw, decimals })
    }

    pub fn ether(amount: &str) -> ZkYieldResult<Self> {
        Self::from_decimal(amount, ETH_DECIMALS)
    }

    pub fn to_decimal(&self) -> String {
        let multiplier = 10u128.pow(self.decimals as u32);
        let whole = self.raw / multiplier;
        let frac = self.raw % multiplier;

        if frac == 0 {
            whole.to_string()
        } else {
            let frac_str = format!("{:0>width$}", frac, width = self.decimals as usize);
            let trimmed = frac_str.trim_end_matches('0');
            format!("{}.{}", whole, trimmed)
        }
    }

    /// Decimal rendering truncated to `places` fractional digits.
    pub fn to_fixed(&self, places: usize) -> String {
        let multiplier = 10u128.pow(self.decimals as u32);
        let whole = self.raw / multiplier;
        let frac = self.raw % multiplier;
        if places == 0 {
            return whole.to_string();
        }
        let frac_str = format!("{:0>width$}", frac, width = self.decimals as usize);
        let cut = places.min(frac_str.len());
        format!("{}.{:0<places$}", whole, &frac_str[..cut], places = places)
    }

    pub fn zero(decimals: u8) -> Self {
        Self { raw: 0, decimals }
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.decimals != other.decimals {
            return None;
        }
        self.raw.checked_add(other.raw).map(|raw| Self {
            raw,
            decimals: self.decimals,
        })
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.decimals != other.decimals {
            return None;
        }
        self.raw.checked_sub(other.raw).map(|raw| Self {
            raw,
            decimals: self.decimals,
        })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
