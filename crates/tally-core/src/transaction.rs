//! Transactions: dated, categorised money movements owned by one user.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, category::Category};

/// Inclusive bounds on the trimmed description length, in characters.
pub const DESCRIPTION_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// A persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id:          Uuid,
  pub owner_id:    Uuid,
  /// Always strictly positive; `category` decides whether it is income.
  pub amount:      Decimal,
  pub date:        DateTime<Utc>,
  pub description: String,
  pub category:    Category,
  /// Server-assigned; never changes, not even on update.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::FinanceStore::add_transaction`] and
/// [`crate::store::FinanceStore::update_transaction`].
#[derive(Debug, Clone)]
pub struct NewTransaction {
  pub owner_id:    Uuid,
  pub amount:      Decimal,
  pub date:        DateTime<Utc>,
  pub description: String,
  pub category:    Category,
}

impl NewTransaction {
  /// Check field constraints and return the normalised input (description
  /// trimmed).
  pub fn validated(mut self) -> Result<Self> {
    if self.amount <= Decimal::ZERO {
      return Err(Error::validation("Amount must be a positive number."));
    }

    self.description = self.description.trim().to_owned();
    let chars = self.description.chars().count();
    if chars < DESCRIPTION_MIN_CHARS {
      return Err(Error::validation(format!(
        "Description must be at least {DESCRIPTION_MIN_CHARS} characters long."
      )));
    }
    if chars > DESCRIPTION_MAX_CHARS {
      return Err(Error::validation(format!(
        "Description cannot exceed {DESCRIPTION_MAX_CHARS} characters."
      )));
    }

    Ok(self)
  }
}
