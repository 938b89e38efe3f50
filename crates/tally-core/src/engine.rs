//! The aggregation engine: fetches from a [`FinanceStore`] and delegates the
//! arithmetic to [`crate::aggregate`] and [`crate::insight`].
//!
//! Each operation performs independent reads; under concurrent writes the
//! budget and spending reads of a comparison may see different snapshots.

use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{
    self, CategoryTotal, ComparisonRow, DateWindow, ExpenseBucket, Granularity,
  },
  budget::BudgetFilter,
  insight::{SpendingInsights, Summary},
  store::FinanceStore,
};

fn backend<E: Into<Error>>(e: E) -> Error { e.into() }

/// Expense totals per time bucket, ascending.
pub async fn aggregate_expenses<S: FinanceStore>(
  store: &S,
  owner_id: Uuid,
  granularity: Granularity,
) -> Result<Vec<ExpenseBucket>> {
  let expenses = store
    .expense_transactions(owner_id, None)
    .await
    .map_err(backend)?;
  aggregate::bucket_expenses(&expenses, granularity)
}

/// Expense totals per category, largest first.
pub async fn aggregate_by_category<S: FinanceStore>(
  store: &S,
  owner_id: Uuid,
) -> Result<Vec<CategoryTotal>> {
  let expenses = store
    .expense_transactions(owner_id, None)
    .await
    .map_err(backend)?;
  aggregate::totals_by_category(&expenses)
}

/// One row per category that was budgeted or spent on in `month`/`year`.
pub async fn compare_budget_to_actual<S: FinanceStore>(
  store: &S,
  owner_id: Uuid,
  month: u32,
  year: i32,
) -> Result<Vec<ComparisonRow>> {
  let window = DateWindow::month(month, year)?;

  let budgets = store
    .list_budgets(owner_id, BudgetFilter::period(month, year))
    .await
    .map_err(backend)?;
  let spent = store
    .expense_transactions(owner_id, Some(window))
    .await
    .map_err(backend)?;

  aggregate::compare(&budgets, &aggregate::totals_by_category(&spent)?)
}

pub async fn spending_insights<S: FinanceStore>(
  store: &S,
  owner_id: Uuid,
  month: u32,
  year: i32,
) -> Result<SpendingInsights> {
  let rows = compare_budget_to_actual(store, owner_id, month, year).await?;
  SpendingInsights::from_rows(&rows)
}

/// Income and expense totals plus the most recent transactions.
pub async fn summary<S: FinanceStore>(store: &S, owner_id: Uuid) -> Result<Summary> {
  let transactions = store.list_transactions(owner_id).await.map_err(backend)?;
  Summary::from_transactions(&transactions)
}
