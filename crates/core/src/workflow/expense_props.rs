//! Property-based tests for expense input validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::currency::SUPPORTED_CURRENCIES;
use crate::workflow::error::WorkflowError;
use crate::workflow::expense::{ExpensePatch, NewExpense};

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

fn new_expense(amount: Decimal, currency: &str, category: &str, date: NaiveDate) -> NewExpense {
    NewExpense {
        description: None,
        amount,
        currency_code: Some(currency.to_string()),
        category: category.to_string(),
        expense_date: date,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Positive amounts in a supported currency with a category always validate.
    #[test]
    fn prop_valid_payload_accepted(
        amount in positive_amount(),
        currency in prop::sample::select(SUPPORTED_CURRENCIES.to_vec()),
        category in "[A-Za-z][A-Za-z ]{0,30}",
        date in arb_date(),
    ) {
        let fields = new_expense(amount, currency, &category, date).validate().unwrap();
        prop_assert_eq!(fields.amount, amount);
        prop_assert_eq!(fields.currency_code.as_str(), currency);
        prop_assert_eq!(fields.expense_date, date);
        prop_assert!(!fields.category.is_empty());
    }

    /// Zero and negative amounts never validate, on create or update.
    #[test]
    fn prop_non_positive_amount_rejected(amount in non_positive_amount(), date in arb_date()) {
        let created = new_expense(amount, "USD", "Travel", date).validate();
        let is_validation = matches!(created, Err(WorkflowError::Validation(_)));
        prop_assert!(is_validation);

        let patched = ExpensePatch { amount: Some(amount), ..ExpensePatch::default() }.validate();
        let is_validation = matches!(patched, Err(WorkflowError::Validation(_)));
        prop_assert!(is_validation);
    }

    /// Blank categories never validate.
    #[test]
    fn prop_blank_category_rejected(category in "[ \t]{0,5}", amount in positive_amount()) {
        let result = new_expense(amount, "EUR", &category, NaiveDate::default()).validate();
        prop_assert!(result.is_err());
    }
}
