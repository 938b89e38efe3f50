//! Derived read models built on top of the aggregations: spending insights
//! for a budget month, and the dashboard summary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  aggregate::{ComparisonRow, checked_sum},
  category::Category,
  transaction::Transaction,
};

/// Number of transactions included in [`Summary::recent`].
pub const RECENT_LIMIT: usize = 5;

// ─── Spending insights ───────────────────────────────────────────────────────

/// Overall position of a month's spending against its budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
  /// Spent less than the total budget.
  Under,
  Over,
  OnTrack,
  /// Nothing budgeted and nothing spent.
  NoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVariance {
  pub category:   Category,
  /// Always positive: how far over (or under) the budget spending landed.
  pub difference: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbudgetedSpend {
  pub category: Category,
  pub amount:   Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingInsights {
  pub total_budgeted:     Decimal,
  pub total_actual:       Decimal,
  /// `total_budgeted - total_actual`; negative when overspent.
  pub overall_difference: Decimal,
  pub status:             BudgetStatus,
  pub overspent:          Vec<CategoryVariance>,
  pub underspent:         Vec<CategoryVariance>,
  pub unbudgeted:         Vec<UnbudgetedSpend>,
}

impl SpendingInsights {
  /// Classify each comparison row. Only categories with a positive budget
  /// can be over- or underspent; spending with no budget is reported
  /// separately.
  pub fn from_rows(rows: &[ComparisonRow]) -> Result<Self> {
    let mut total_budgeted = Decimal::ZERO;
    let mut total_actual = Decimal::ZERO;
    let mut overspent = Vec::new();
    let mut underspent = Vec::new();
    let mut unbudgeted = Vec::new();

    for row in rows {
      total_budgeted = checked_sum(total_budgeted, row.budgeted)?;
      total_actual = checked_sum(total_actual, row.actual)?;

      if row.budgeted > Decimal::ZERO && row.actual > row.budgeted {
        overspent.push(CategoryVariance {
          category:   row.category,
          difference: row.actual - row.budgeted,
        });
      } else if row.budgeted > Decimal::ZERO && row.actual < row.budgeted {
        underspent.push(CategoryVariance {
          category:   row.category,
          difference: row.budgeted - row.actual,
        });
      } else if row.budgeted.is_zero() && row.actual > Decimal::ZERO {
        unbudgeted.push(UnbudgetedSpend { category: row.category, amount: row.actual });
      }
    }

    let overall_difference = total_budgeted - total_actual;
    let status = if total_budgeted.is_zero() && total_actual.is_zero() {
      BudgetStatus::NoData
    } else if overall_difference > Decimal::ZERO {
      BudgetStatus::Under
    } else if overall_difference < Decimal::ZERO {
      BudgetStatus::Over
    } else {
      BudgetStatus::OnTrack
    };

    Ok(Self {
      total_budgeted,
      total_actual,
      overall_difference,
      status,
      overspent,
      underspent,
      unbudgeted,
    })
  }
}

// ─── Dashboard summary ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub total_income:   Decimal,
  pub total_expenses: Decimal,
  /// `total_income - total_expenses`.
  pub balance:        Decimal,
  pub recent:         Vec<Transaction>,
}

impl Summary {
  /// `transactions` must already be in list order (most recent first).
  pub fn from_transactions(transactions: &[Transaction]) -> Result<Self> {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    for tx in transactions {
      if tx.category.is_expense() {
        total_expenses = checked_sum(total_expenses, tx.amount)?;
      } else {
        total_income = checked_sum(total_income, tx.amount)?;
      }
    }

    // Both totals are non-negative, so the difference stays in range.
    Ok(Self {
      total_income,
      total_expenses,
      balance: total_income - total_expenses,
      recent: transactions.iter().take(RECENT_LIMIT).cloned().collect(),
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn row(category: Category, budgeted: i64, actual: i64) -> ComparisonRow {
    ComparisonRow {
      category,
      budgeted: Decimal::from(budgeted),
      actual: Decimal::from(actual),
    }
  }

  #[test]
  fn classifies_each_row() {
    let insights = SpendingInsights::from_rows(&[
      row(Category::Food, 120, 150),
      row(Category::Housing, 800, 700),
      row(Category::Shopping, 0, 30),
      row(Category::Utilities, 90, 90),
    ])
    .unwrap();

    assert_eq!(insights.overspent, vec![CategoryVariance {
      category:   Category::Food,
      difference: Decimal::from(30),
    }]);
    assert_eq!(insights.underspent, vec![CategoryVariance {
      category:   Category::Housing,
      difference: Decimal::from(100),
    }]);
    assert_eq!(insights.unbudgeted, vec![UnbudgetedSpend {
      category: Category::Shopping,
      amount:   Decimal::from(30),
    }]);
    assert_eq!(insights.total_budgeted, Decimal::from(1010));
    assert_eq!(insights.total_actual, Decimal::from(970));
    assert_eq!(insights.overall_difference, Decimal::from(40));
    assert_eq!(insights.status, BudgetStatus::Under);
  }

  #[test]
  fn overall_status_over_and_on_track() {
    let over = SpendingInsights::from_rows(&[row(Category::Food, 100, 130)]).unwrap();
    assert_eq!(over.status, BudgetStatus::Over);
    assert_eq!(over.overall_difference, Decimal::from(-30));

    let even = SpendingInsights::from_rows(&[row(Category::Food, 100, 100)]).unwrap();
    assert_eq!(even.status, BudgetStatus::OnTrack);
  }

  #[test]
  fn empty_rows_have_no_data() {
    let insights = SpendingInsights::from_rows(&[]).unwrap();
    assert_eq!(insights.status, BudgetStatus::NoData);
    assert!(insights.overspent.is_empty());
  }

  #[test]
  fn summary_totals_and_recent() {
    let txs: Vec<Transaction> = (0..7)
      .map(|i| Transaction {
        id:          Uuid::new_v4(),
        owner_id:    Uuid::nil(),
        amount:      Decimal::from(10 * (i + 1)),
        date:        Utc.with_ymd_and_hms(2024, 3, 10 - i as u32, 0, 0, 0).unwrap(),
        description: format!("entry {i}"),
        category:    if i == 0 { Category::Income } else { Category::Food },
        created_at:  Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
      })
      .collect();

    let summary = Summary::from_transactions(&txs).unwrap();
    assert_eq!(summary.total_income, Decimal::from(10));
    assert_eq!(summary.total_expenses, Decimal::from(270));
    assert_eq!(summary.balance, Decimal::from(-260));
    assert_eq!(summary.recent.len(), RECENT_LIMIT);
    assert_eq!(summary.recent[0].id, txs[0].id);
  }

  #[test]
  fn overflowing_totals_are_an_error() {
    let huge = ComparisonRow {
      category: Category::Food,
      budgeted: Decimal::MAX,
      actual:   Decimal::ZERO,
    };
    let rows = [huge.clone(), ComparisonRow { category: Category::Housing, ..huge }];
    assert!(matches!(
      SpendingInsights::from_rows(&rows),
      Err(crate::Error::InvalidArgument(_))
    ));

    let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let txs: Vec<Transaction> = (0..2)
      .map(|_| Transaction {
        id:          Uuid::new_v4(),
        owner_id:    Uuid::nil(),
        amount:      Decimal::MAX,
        date:        at,
        description: "windfall".into(),
        category:    Category::Income,
        created_at:  at,
      })
      .collect();
    assert!(matches!(
      Summary::from_transactions(&txs),
      Err(crate::Error::InvalidArgument(_))
    ));
  }
}
