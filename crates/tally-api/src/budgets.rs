//! Handlers for `/budgets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/budgets/{user_id}` | Optional `?month=` and `?year=` filters |
//! | `POST`   | `/budgets` | Body: [`BudgetBody`]; create or overwrite |
//! | `DELETE` | `/budgets/{id}?userId=` | |
//! | `GET`    | `/budgets/{user_id}/comparison?month=&year=` | Budget vs actual |
//! | `GET`    | `/budgets/{user_id}/insights?month=&year=` | Over/under spending |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::{
  aggregate::ComparisonRow,
  budget::{Budget, BudgetFilter, NewBudget},
  category,
  engine,
  insight::SpendingInsights,
  store::FinanceStore,
};

use crate::{
  OwnerParams,
  error::{ApiError, parse_id, store_error},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub month: Option<u32>,
  pub year:  Option<i32>,
}

/// `GET /budgets/{user_id}[?month=<1-12>][&year=<yyyy>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Budget>>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  let Query(params) = params?;
  let filter = BudgetFilter { month: params.month, year: params.year };
  let budgets = store
    .list_budgets(user_id, filter)
    .await
    .map_err(store_error)?;
  Ok(Json(budgets))
}

// ─── Set ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /budgets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBody {
  pub user_id:         Option<String>,
  pub category:        Option<String>,
  pub month:           Option<u32>,
  pub year:            Option<i32>,
  pub budgeted_amount: Option<Decimal>,
}

impl TryFrom<BudgetBody> for NewBudget {
  type Error = ApiError;

  fn try_from(b: BudgetBody) -> Result<Self, ApiError> {
    let (Some(raw_owner), Some(raw_category), Some(month), Some(year), Some(budgeted_amount)) =
      (b.user_id, b.category, b.month, b.year, b.budgeted_amount)
    else {
      return Err(ApiError::BadRequest(
        "Please provide userId, category, month, year, and budgetedAmount.".into(),
      ));
    };

    Ok(NewBudget {
      owner_id: parse_id(&raw_owner, "User")?,
      category: category::parse(&raw_category)?,
      month,
      year,
      budgeted_amount,
    })
  }
}

/// `POST /budgets`: returns the stored [`Budget`], new or overwritten.
pub async fn set<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<BudgetBody>, JsonRejection>,
) -> Result<Json<Budget>, ApiError>
where
  S: FinanceStore,
{
  let Json(body) = body?;
  let input = NewBudget::try_from(body)?;
  let budget = store.upsert_budget(input).await.map_err(store_error)?;
  Ok(Json(budget))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /budgets/{id}?userId=<uuid>`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  owner: Result<Query<OwnerParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: FinanceStore,
{
  let Query(owner) = owner?;
  let owner_id = owner.owner_id()?;
  let id = parse_id(&id, "Budget")?;
  store
    .delete_budget(id, owner_id)
    .await
    .map_err(store_error)?;
  Ok(Json(json!({ "message": "Budget deleted successfully." })))
}

// ─── Comparison ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
  pub month: Option<u32>,
  pub year:  Option<i32>,
}

impl PeriodParams {
  fn required(&self) -> Result<(u32, i32), ApiError> {
    match (self.month, self.year) {
      (Some(month), Some(year)) => Ok((month, year)),
      _ => Err(ApiError::BadRequest(
        "Month and year are required for budget comparison.".into(),
      )),
    }
  }
}

/// `GET /budgets/{user_id}/comparison?month=<1-12>&year=<yyyy>`
pub async fn comparison<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
  params: Result<Query<PeriodParams>, QueryRejection>,
) -> Result<Json<Vec<ComparisonRow>>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  let Query(params) = params?;
  let (month, year) = params.required()?;
  let rows = engine::compare_budget_to_actual(store.as_ref(), user_id, month, year).await?;
  Ok(Json(rows))
}

/// `GET /budgets/{user_id}/insights?month=<1-12>&year=<yyyy>`
pub async fn insights<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
  params: Result<Query<PeriodParams>, QueryRejection>,
) -> Result<Json<SpendingInsights>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  let Query(params) = params?;
  let (month, year) = params.required()?;
  let insights = engine::spending_insights(store.as_ref(), user_id, month, year).await?;
  Ok(Json(insights))
}
