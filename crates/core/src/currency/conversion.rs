//! Currency conversion logic.
//!
//! Converted amounts are always rounded to 2 decimal places using
//! banker's rounding (round half to even).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::code::{CurrencyCode, CurrencyError};

/// Decimal places kept on converted amounts.
pub const CONVERTED_DECIMAL_PLACES: u32 = 2;

/// Converts an amount using the given exchange rate.
#[must_use]
pub fn convert(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate)
        .round_dp_with_strategy(CONVERTED_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Rate table for one base currency as returned by a rate provider.
///
/// Keys are kept as raw strings because providers return codes
/// outside the supported list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    /// Currency every rate is quoted against.
    pub base: CurrencyCode,
    /// Units of the keyed currency per one unit of `base`.
    pub rates: BTreeMap<String, Decimal>,
    /// When the table was fetched.
    pub timestamp: DateTime<Utc>,
}

impl ExchangeRates {
    /// Returns the rate from `base` to `target`.
    ///
    /// Converting a currency into itself always has a rate of one.
    #[must_use]
    pub fn rate_for(&self, target: CurrencyCode) -> Option<Decimal> {
        if target == self.base {
            return Some(self.rates.get(target.as_str()).copied().unwrap_or(Decimal::ONE));
        }
        self.rates.get(target.as_str()).copied()
    }

    /// Converts `amount` of the base currency into `target`.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::NonPositiveAmount` for zero or negative
    /// amounts and `CurrencyError::MissingRate` when the table has no rate.
    pub fn quote(
        &self,
        amount: Decimal,
        target: CurrencyCode,
    ) -> Result<ConversionQuote, CurrencyError> {
        if amount <= Decimal::ZERO {
            return Err(CurrencyError::NonPositiveAmount);
        }

        let rate = self.rate_for(target).ok_or(CurrencyError::MissingRate {
            from: self.base,
            to: target,
        })?;

        Ok(ConversionQuote {
            from: self.base,
            to: target,
            original_amount: amount,
            converted_amount: convert(amount, rate),
            rate,
            timestamp: Utc::now(),
        })
    }
}

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionQuote {
    /// Source currency.
    pub from: CurrencyCode,
    /// Target currency.
    pub to: CurrencyCode,
    /// Amount in the source currency.
    pub original_amount: Decimal,
    /// Amount in the target currency, rounded to 2 dp.
    pub converted_amount: Decimal,
    /// Rate applied.
    pub rate: Decimal,
    /// When the quote was produced.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd_table() -> ExchangeRates {
        let mut rates = BTreeMap::new();
        rates.insert("USD".to_string(), dec!(1));
        rates.insert("EUR".to_string(), dec!(0.9215));
        rates.insert("JPY".to_string(), dec!(151.37));
        rates.insert("IDR".to_string(), dec!(15850));
        ExchangeRates {
            base: CurrencyCode::USD,
            rates,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_convert_rounds_to_two_places() {
        assert_eq!(convert(dec!(100), dec!(0.9215)), dec!(92.15));
        assert_eq!(convert(dec!(10.01), dec!(0.333)), dec!(3.33));
    }

    #[test]
    fn test_bankers_rounding() {
        // 0.125 -> 0.12, 0.135 -> 0.14
        assert_eq!(convert(dec!(1), dec!(0.125)), dec!(0.12));
        assert_eq!(convert(dec!(1), dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn test_quote_uses_table_rate() {
        let quote = usd_table()
            .quote(dec!(100), CurrencyCode::parse("JPY").unwrap())
            .unwrap();
        assert_eq!(quote.from, CurrencyCode::USD);
        assert_eq!(quote.rate, dec!(151.37));
        assert_eq!(quote.converted_amount, dec!(15137.00));
    }

    #[test]
    fn test_quote_same_currency_without_entry() {
        let table = ExchangeRates {
            base: CurrencyCode::USD,
            rates: BTreeMap::new(),
            timestamp: Utc::now(),
        };
        let quote = table.quote(dec!(42.5), CurrencyCode::USD).unwrap();
        assert_eq!(quote.converted_amount, dec!(42.50));
    }

    #[test]
    fn test_quote_missing_rate() {
        let err = usd_table()
            .quote(dec!(1), CurrencyCode::parse("GBP").unwrap())
            .unwrap_err();
        assert!(matches!(err, CurrencyError::MissingRate { .. }));
    }

    #[test]
    fn test_quote_rejects_non_positive_amount() {
        let eur = CurrencyCode::parse("EUR").unwrap();
        assert_eq!(
            usd_table().quote(Decimal::ZERO, eur),
            Err(CurrencyError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_rate_table_from_json() {
        let table: ExchangeRates = serde_json::from_str(
            r#"{"base": "usd", "rates": {"EUR": "0.9215", "IDR": "15850"}, "timestamp": "2025-01-15T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(table.base, CurrencyCode::USD);
        assert_eq!(
            table.rate_for(CurrencyCode::parse("EUR").unwrap()),
            Some(dec!(0.9215))
        );
    }
}
