//! Expense form validation and submission.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tally_types::{NewRecord, RecordId};
use tracing::info;

use crate::store::{ExpenseStore, StoreError};

/// Errors raised while submitting the expense form.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A field was left blank.
    #[error("Please enter the value before submitting")]
    MissingValue,

    /// The cost is not a non-negative decimal number.
    #[error("cost must be a non-negative number, got {input:?}")]
    InvalidCost {
        /// What was entered.
        input: String,
    },

    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseForm {
    /// What the money was spent on.
    #[serde(default)]
    pub name: String,
    /// Amount spent, as text.
    #[serde(default)]
    pub cost: String,
}

impl ExpenseForm {
    /// Build a form from its fields.
    pub fn new(name: impl Into<String>, cost: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: cost.into(),
        }
    }

    /// Check both fields and turn them into a [`NewRecord`].
    ///
    /// Surrounding whitespace is trimmed from both fields.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingValue`] if either field is blank, or
    /// [`FormError::InvalidCost`] if the cost does not parse or is negative.
    pub fn validate(&self) -> Result<NewRecord, FormError> {
        let name = self.name.trim();
        let cost = self.cost.trim();
        if name.is_empty() || cost.is_empty() {
            return Err(FormError::MissingValue);
        }
        let parsed = Decimal::from_str(cost)
            .ok()
            .filter(|c| !c.is_sign_negative())
            .ok_or_else(|| FormError::InvalidCost {
                input: cost.to_owned(),
            })?;
        Ok(NewRecord {
            name: name.to_owned(),
            cost: parsed,
        })
    }
}

/// Validate `form` and create the expense in `store`.
///
/// # Errors
///
/// Returns a validation [`FormError`] without touching the store, or
/// [`FormError::Store`] if the write fails.
pub async fn submit<S: ExpenseStore>(
    store: &S,
    form: &ExpenseForm,
) -> Result<RecordId, FormError> {
    let record = form.validate()?;
    let id = store.create(record).await?;
    info!(%id, "expense submitted");
    Ok(id)
}
