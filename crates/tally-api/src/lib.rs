//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::FinanceStore`].
//! CORS, tracing, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```
//!
//! `/transactions/{id}` and `/budgets/{id}` share one path pattern per
//! collection: on `GET` the segment is the owner's user id, on `PUT` and
//! `DELETE` it is the record id.
//!
//! Ids arrive as plain strings and are parsed by the handlers, so a malformed
//! id is a 400 with a `{"message"}` body like every other client error.

pub mod budgets;
pub mod categories;
pub mod error;
pub mod transactions;
pub mod users;

mod date;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tally_core::store::FinanceStore;
use uuid::Uuid;

pub use error::ApiError;

/// `?userId=<uuid>`: identifies the owner on routes whose path carries a
/// record id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerParams {
  pub user_id: String,
}

impl OwnerParams {
  pub fn owner_id(&self) -> Result<Uuid, ApiError> {
    error::parse_id(&self.user_id, "User")
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FinanceStore + 'static,
{
  Router::new()
    // Identity
    .route("/users", post(users::find_or_create::<S>))
    .route("/categories", get(categories::list))
    // Transactions
    .route("/transactions", post(transactions::create::<S>))
    .route(
      "/transactions/{id}",
      get(transactions::list::<S>)
        .put(transactions::update::<S>)
        .delete(transactions::remove::<S>),
    )
    .route("/transactions/detail/{id}", get(transactions::get_one::<S>))
    .route(
      "/transactions/{id}/aggregated-expenses",
      get(transactions::aggregated_expenses::<S>),
    )
    .route(
      "/transactions/{id}/category-breakdown",
      get(transactions::category_breakdown::<S>),
    )
    .route("/transactions/{id}/summary", get(transactions::summary::<S>))
    // Budgets
    .route("/budgets", post(budgets::set::<S>))
    .route(
      "/budgets/{id}",
      get(budgets::list::<S>).delete(budgets::remove::<S>),
    )
    .route("/budgets/{id}/comparison", get(budgets::comparison::<S>))
    .route("/budgets/{id}/insights", get(budgets::insights::<S>))
    .with_state(store)
}
