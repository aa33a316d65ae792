//! Monetary amounts.
//!
//! Amounts are integers of base units; one whole unit is `UNIT` base units (18 decimals),
//! which keeps fractional premiums like `0.2` exact.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuretyError};

pub type Amount = u128;

pub const DECIMALS: u32 = 18;
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Parses a decimal string (`"10"`, `"0.2"`, `"1.5"`) into base units.
pub fn parse_units(s: &str) -> Result<Amount> {
    let s = s.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(SuretyError::Config(format!("Invalid amount: '{}'", s)));
    }
    if frac.len() > DECIMALS as usize {
        return Err(SuretyError::Config(format!("Too many decimals in amount: '{}'", s)));
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| SuretyError::Config(format!("Invalid amount: '{}'", s)))?
    };

    let frac_value: Amount = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
        padded
            .parse()
            .map_err(|_| SuretyError::Config(format!("Invalid amount: '{}'", s)))?
    };

    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or_else(|| SuretyError::Config(format!("Amount overflow: '{}'", s)))
}

/// Renders base units as a decimal string without trailing zeros.
pub fn format_units(amount: Amount) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Serde adapter writing amounts as decimal unit strings (`"0.2"`).
///
/// Needed inside internally tagged enums, whose field buffer has no `u128`.
pub mod as_units {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{format_units, parse_units, Amount};

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_units(*amount))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_units(&s).map_err(D::Error::custom)
    }
}

/// Ratio applied to a premium to obtain the payout (`3/2` = 1.5x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutMultiplier {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for PayoutMultiplier {
    fn default() -> Self {
        Self { numerator: 3, denominator: 2 }
    }
}

impl PayoutMultiplier {
    /// Payout for a premium, rounded down to the base unit.
    pub fn apply(&self, premium: Amount) -> Amount {
        premium * self.numerator as Amount / self.denominator as Amount
    }

    pub fn validate(&self) -> Result<()> {
        if self.denominator == 0 {
            return Err(SuretyError::Config("payout multiplier denominator is zero".into()));
        }
        if self.numerator < self.denominator {
            return Err(SuretyError::Config(format!(
                "payout multiplier {}/{} is below 1",
                self.numerator, self.denominator
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PayoutMultiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
