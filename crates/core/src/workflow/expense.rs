//! Expense records and their validated inputs.
//!
//! Raw request payloads (`NewExpense`, `ExpensePatch`) are validated into
//! typed values (`ExpenseFields`, `ExpenseChanges`) before they reach a store.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::CurrencyCode;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::ExpenseStatus;

/// A single reimbursement request owned by its submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID.
    pub id: Uuid,
    /// Employee who created the expense.
    pub submitter_id: Uuid,
    /// Company the submitter belongs to.
    pub company_id: Uuid,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Amount in `currency_code`, always positive.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency_code: CurrencyCode,
    /// Expense category.
    pub category: String,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Current workflow status.
    pub status: ExpenseStatus,
    /// Set when the expense leaves draft.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a new draft expense from validated fields.
    #[must_use]
    pub fn draft(
        submitter_id: Uuid,
        company_id: Uuid,
        fields: ExpenseFields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitter_id,
            company_id,
            description: fields.description,
            amount: fields.amount,
            currency_code: fields.currency_code,
            category: fields.category,
            expense_date: fields.expense_date,
            status: ExpenseStatus::Draft,
            submitted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating an expense.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Currency code, defaults to USD.
    #[serde(default)]
    pub currency_code: Option<String>,
    /// Expense category.
    pub category: String,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
}

/// Validated fields of a new expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFields {
    /// Description, empty when none was given.
    pub description: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Supported currency.
    pub currency_code: CurrencyCode,
    /// Non-empty category.
    pub category: String,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
}

impl NewExpense {
    /// Validates the payload.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Validation` when the amount is not positive,
    /// the currency is malformed or unsupported, or the category is blank.
    pub fn validate(self) -> Result<ExpenseFields, WorkflowError> {
        Ok(ExpenseFields {
            description: self.description.unwrap_or_default(),
            amount: validate_amount(self.amount)?,
            currency_code: match self.currency_code {
                Some(code) => validate_currency(&code)?,
                None => CurrencyCode::default(),
            },
            category: validate_category(self.category)?,
            expense_date: self.expense_date,
        })
    }
}

/// Partial update of a draft expense.
///
/// Only the listed fields are mutable; anything else is rejected
/// at deserialization time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpensePatch {
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New currency code.
    pub currency_code: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New expense date.
    pub expense_date: Option<NaiveDate>,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseChanges {
    /// New description.
    pub description: Option<String>,
    /// New positive amount.
    pub amount: Option<Decimal>,
    /// New supported currency.
    pub currency_code: Option<CurrencyCode>,
    /// New non-empty category.
    pub category: Option<String>,
    /// New expense date.
    pub expense_date: Option<NaiveDate>,
}

impl ExpensePatch {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.currency_code.is_none()
            && self.category.is_none()
            && self.expense_date.is_none()
    }

    /// Validates each present field with the same rules as creation.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Validation` for an empty patch or any
    /// invalid field.
    pub fn validate(self) -> Result<ExpenseChanges, WorkflowError> {
        if self.is_empty() {
            return Err(WorkflowError::Validation("No fields to update".to_string()));
        }

        Ok(ExpenseChanges {
            description: self.description,
            amount: self.amount.map(validate_amount).transpose()?,
            currency_code: self
                .currency_code
                .as_deref()
                .map(validate_currency)
                .transpose()?,
            category: self.category.map(validate_category).transpose()?,
            expense_date: self.expense_date,
        })
    }
}

impl ExpenseChanges {
    /// Applies the changes to `expense` and bumps `updated_at`.
    pub fn apply_to(&self, expense: &mut Expense, now: DateTime<Utc>) {
        if let Some(description) = &self.description {
            expense.description.clone_from(description);
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(currency_code) = self.currency_code {
            expense.currency_code = currency_code;
        }
        if let Some(category) = &self.category {
            expense.category.clone_from(category);
        }
        if let Some(expense_date) = self.expense_date {
            expense.expense_date = expense_date;
        }
        expense.updated_at = now;
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal, WorkflowError> {
    if amount <= Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(amount)
}

fn validate_currency(code: &str) -> Result<CurrencyCode, WorkflowError> {
    CurrencyCode::parse(code).map_err(|e| WorkflowError::Validation(e.to_string()))
}

fn validate_category(category: String) -> Result<String, WorkflowError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(
            "Category is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
