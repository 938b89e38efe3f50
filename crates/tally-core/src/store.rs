//! The `FinanceStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, the aggregation [`engine`](crate::engine))
//! depend on this abstraction, not on any concrete backend.
//!
//! Every record lookup is scoped by owner: a record that exists but belongs to
//! someone else is reported exactly like a record that does not exist.

use std::future::Future;

use uuid::Uuid;

use crate::{
  aggregate::DateWindow,
  budget::{Budget, BudgetFilter, NewBudget},
  transaction::{NewTransaction, Transaction},
  user::User,
};

/// Abstraction over a Tally store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FinanceStore: Send + Sync {
  /// Backend errors must be expressible in the shared taxonomy so the API
  /// layer can pick a status class.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Return the user bound to `device_id`, creating it on first contact.
  /// Concurrent first contacts from the same device yield a single user.
  fn find_or_create_user(
    &self,
    device_id: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Transactions ──────────────────────────────────────────────────────

  /// All of an owner's transactions, newest `date` first; equal dates are
  /// ordered newest `created_at` first.
  fn list_transactions(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Transaction>, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::NotFound`] unless `(id, owner_id)` matches.
  fn get_transaction(
    &self,
    id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Transaction, Self::Error>> + Send + '_;

  /// Validate and persist a new transaction. `id` and `created_at` are
  /// assigned by the store.
  fn add_transaction(
    &self,
    input: NewTransaction,
  ) -> impl Future<Output = Result<Transaction, Self::Error>> + Send + '_;

  /// Replace every mutable field of the transaction `id` owned by
  /// `input.owner_id`.
  fn update_transaction(
    &self,
    id: Uuid,
    input: NewTransaction,
  ) -> impl Future<Output = Result<Transaction, Self::Error>> + Send + '_;

  fn delete_transaction(
    &self,
    id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every non-`Income` transaction of the owner, optionally restricted to
  /// `window` on `date`. Order is unspecified.
  fn expense_transactions(
    &self,
    owner_id: Uuid,
    window: Option<DateWindow>,
  ) -> impl Future<Output = Result<Vec<Transaction>, Self::Error>> + Send + '_;

  // ── Budgets ───────────────────────────────────────────────────────────

  /// Ordered by `(year, month, category)` ascending.
  fn list_budgets(
    &self,
    owner_id: Uuid,
    filter: BudgetFilter,
  ) -> impl Future<Output = Result<Vec<Budget>, Self::Error>> + Send + '_;

  /// Create the budget for `(owner, category, month, year)` or overwrite the
  /// amount of the existing one. Never produces a duplicate.
  fn upsert_budget(
    &self,
    input: NewBudget,
  ) -> impl Future<Output = Result<Budget, Self::Error>> + Send + '_;

  fn delete_budget(
    &self,
    id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
