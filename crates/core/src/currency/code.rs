//! Supported ISO 4217 currency codes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Currency codes accepted on expenses and conversions.
pub const SUPPORTED_CURRENCIES: [&str; 20] = [
    "USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF", "CNY", "NZD", "SEK", "MXN", "SGD", "HKD",
    "NOK", "KRW", "TRY", "RUB", "INR", "BRL", "ZAR",
];

/// Errors raised while handling currencies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Not a three-letter code.
    #[error("Currency code must be exactly 3 letters, got '{0}'")]
    Malformed(String),

    /// Well-formed but outside the supported list.
    #[error("Currency {0} not supported")]
    Unsupported(String),

    /// The rate table has no entry for the requested target.
    #[error("No exchange rate from {from} to {to}")]
    MissingRate {
        /// Base currency of the rate table.
        from: CurrencyCode,
        /// Requested target currency.
        to: CurrencyCode,
    },

    /// Amount to convert must be positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,
}

/// A validated, upper-case currency code from [`SUPPORTED_CURRENCIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(&'static str);

impl CurrencyCode {
    /// US dollar, the default currency for new expenses.
    pub const USD: Self = Self("USD");

    /// Parses a code, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::Malformed` unless the input is three ASCII
    /// letters, and `CurrencyError::Unsupported` for codes outside the list.
    pub fn parse(input: &str) -> Result<Self, CurrencyError> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(CurrencyError::Malformed(input.to_string()));
        }

        SUPPORTED_CURRENCIES
            .iter()
            .find(|supported| **supported == code)
            .map(|supported| Self(supported))
            .ok_or(CurrencyError::Unsupported(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// The stored code always points into the static allow-list, never into the input.
impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
