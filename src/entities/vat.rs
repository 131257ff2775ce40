//! VAT rates accepted on catalog items and quote lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::PricingError;

/// Closed set of VAT rates, in percentage points
///
/// Serialized as the bare integer (`vat_rate: 20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[derive(Default)]
pub enum VatRate {
    Zero,
    Seven,
    Ten,
    Fourteen,
    #[default]
    Twenty,
}

impl VatRate {
    /// Every rate, in ascending order
    pub fn all() -> &'static [VatRate] {
        &[
            VatRate::Zero,
            VatRate::Seven,
            VatRate::Ten,
            VatRate::Fourteen,
            VatRate::Twenty,
        ]
    }

    /// Rate in percentage points
    pub fn percent(&self) -> u8 {
        match self {
            VatRate::Zero => 0,
            VatRate::Seven => 7,
            VatRate::Ten => 10,
            VatRate::Fourteen => 14,
            VatRate::Twenty => 20,
        }
    }

    /// Rate in percentage points, as a decimal
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.percent())
    }
}

impl TryFrom<u8> for VatRate {
    type Error = PricingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VatRate::Zero),
            7 => Ok(VatRate::Seven),
            10 => Ok(VatRate::Ten),
            14 => Ok(VatRate::Fourteen),
            20 => Ok(VatRate::Twenty),
            _ => Err(PricingError::UnknownVatRate {
                value: value.to_string(),
            }),
        }
    }
}

impl From<VatRate> for u8 {
    fn from(rate: VatRate) -> Self {
        rate.percent()
    }
}

impl std::fmt::Display for VatRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl std::str::FromStr for VatRate {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        trimmed
            .parse::<u8>()
            .map_err(|_| PricingError::UnknownVatRate {
                value: s.to_string(),
            })
            .and_then(VatRate::try_from)
    }
}
