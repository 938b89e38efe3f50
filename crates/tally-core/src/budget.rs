//! Monthly budgets: one planned amount per owner, category, and month.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, category::Category};

/// Budgets and comparisons before this year are rejected.
pub const MIN_YEAR: i32 = 2000;

/// A persisted budget. Unique per `(owner_id, category, month, year)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
  pub id:              Uuid,
  pub owner_id:        Uuid,
  pub category:        Category,
  /// 1-12.
  pub month:           u32,
  pub year:            i32,
  pub budgeted_amount: Decimal,
  pub created_at:      DateTime<Utc>,
  /// Bumped every time the amount is set again.
  pub updated_at:      DateTime<Utc>,
}

/// Input to [`crate::store::FinanceStore::upsert_budget`].
#[derive(Debug, Clone)]
pub struct NewBudget {
  pub owner_id:        Uuid,
  pub category:        Category,
  pub month:           u32,
  pub year:            i32,
  pub budgeted_amount: Decimal,
}

impl NewBudget {
  pub fn validated(self) -> Result<Self> {
    if !self.category.is_expense() {
      return Err(Error::validation("Income cannot be budgeted."));
    }
    if !(1..=12).contains(&self.month) {
      return Err(Error::validation("Month must be between 1 and 12."));
    }
    if self.year < MIN_YEAR {
      return Err(Error::validation("Year is invalid."));
    }
    if self.budgeted_amount < Decimal::ZERO {
      return Err(Error::validation("Budgeted amount cannot be negative."));
    }
    Ok(self)
  }
}

/// Optional filters for [`crate::store::FinanceStore::list_budgets`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetFilter {
  pub month: Option<u32>,
  pub year:  Option<i32>,
}

impl BudgetFilter {
  pub fn period(month: u32, year: i32) -> Self {
    Self { month: Some(month), year: Some(year) }
  }
}
