//! Property-based tests for currency operations.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::code::{CurrencyCode, SUPPORTED_CURRENCIES};
use super::conversion::{CONVERTED_DECIMAL_PLACES, convert};

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn supported_code() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SUPPORTED_CURRENCIES.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Converted amounts never carry more than two decimal places.
    #[test]
    fn prop_convert_scale_is_bounded(amount in positive_amount(), rate in positive_rate()) {
        let converted = convert(amount, rate);
        prop_assert!(converted.scale() <= CONVERTED_DECIMAL_PLACES);
    }

    /// Rounding moves the exact product by at most half a cent.
    #[test]
    fn prop_convert_error_within_half_cent(amount in positive_amount(), rate in positive_rate()) {
        let exact = amount * rate;
        let diff = (convert(amount, rate) - exact).abs();
        prop_assert!(diff <= Decimal::new(5, 3));
    }

    /// A rate of one leaves two-decimal amounts untouched.
    #[test]
    fn prop_convert_identity_rate(amount in positive_amount()) {
        prop_assert_eq!(convert(amount, Decimal::ONE), amount);
    }

    /// Every supported code parses in any letter case.
    #[test]
    fn prop_supported_codes_parse_case_insensitively(code in supported_code()) {
        let lower = code.to_ascii_lowercase();
        prop_assert_eq!(CurrencyCode::parse(&lower).unwrap().as_str(), code);
    }

    /// Codes with the wrong length never parse.
    #[test]
    fn prop_wrong_length_rejected(code in "[A-Z]{4,8}") {
        prop_assert!(CurrencyCode::parse(&code).is_err());
    }
}
