//! Multi-currency handling: supported codes and amount conversion.

pub mod code;
pub mod conversion;

#[cfg(test)]
mod props;

pub use code::{CurrencyCode, CurrencyError, SUPPORTED_CURRENCIES};
pub use conversion::{ConversionQuote, ExchangeRates, convert};
