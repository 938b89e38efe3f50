//! Handlers for `/transactions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/transactions/{user_id}` | Newest first |
//! | `POST`   | `/transactions` | Body: [`TransactionBody`]; returns 201 |
//! | `PUT`    | `/transactions/{id}` | Body: [`TransactionBody`] |
//! | `DELETE` | `/transactions/{id}?userId=` | |
//! | `GET`    | `/transactions/detail/{id}?userId=` | Single transaction |
//! | `GET`    | `/transactions/{user_id}/aggregated-expenses?granularity=` | `day`, `month` or `year` |
//! | `GET`    | `/transactions/{user_id}/category-breakdown` | Largest total first |
//! | `GET`    | `/transactions/{user_id}/summary` | Income/expense totals |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::{
  aggregate::{CategoryTotal, ExpenseBucket, Granularity},
  category,
  engine,
  insight::Summary,
  store::FinanceStore,
  transaction::{NewTransaction, Transaction},
};

use crate::{
  OwnerParams, date,
  error::{ApiError, parse_id, store_error},
};

// ─── Body ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /transactions` and `PUT /transactions/{id}`.
///
/// Every field is optional at the wire level so a missing field becomes a
/// 400 with a readable message rather than a deserialisation failure. The
/// user id is parsed after the presence check.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBody {
  pub user_id:     Option<String>,
  pub amount:      Option<Decimal>,
  /// RFC 3339 timestamp or `YYYY-MM-DD`.
  pub date:        Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
}

impl TryFrom<TransactionBody> for NewTransaction {
  type Error = ApiError;

  fn try_from(b: TransactionBody) -> Result<Self, ApiError> {
    let (Some(raw_owner), Some(amount), Some(raw_date), Some(description), Some(raw_category)) =
      (b.user_id, b.amount, b.date, b.description, b.category)
    else {
      return Err(ApiError::BadRequest(
        "Please provide userId, amount, date, description, and category.".into(),
      ));
    };

    let owner_id = parse_id(&raw_owner, "User")?;
    let date = date::parse(&raw_date)
      .ok_or_else(|| ApiError::BadRequest(format!("Invalid date: {raw_date:?}.")))?;

    Ok(NewTransaction {
      owner_id,
      amount,
      date,
      description,
      category: category::parse(&raw_category)?,
    })
  }
}

// ─── CRUD ────────────────────────────────────────────────────────────────────

/// `GET /transactions/{user_id}`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<Transaction>>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  let transactions = store
    .list_transactions(user_id)
    .await
    .map_err(store_error)?;
  Ok(Json(transactions))
}

/// `GET /transactions/detail/{id}?userId=<uuid>`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  owner: Result<Query<OwnerParams>, QueryRejection>,
) -> Result<Json<Transaction>, ApiError>
where
  S: FinanceStore,
{
  let Query(owner) = owner?;
  let owner_id = owner.owner_id()?;
  let id = parse_id(&id, "Transaction")?;
  let tx = store
    .get_transaction(id, owner_id)
    .await
    .map_err(store_error)?;
  Ok(Json(tx))
}

/// `POST /transactions`: returns 201 + the stored [`Transaction`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<TransactionBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FinanceStore,
{
  let Json(body) = body?;
  let input = NewTransaction::try_from(body)?;
  let tx = store.add_transaction(input).await.map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(tx)))
}

/// `PUT /transactions/{id}`: the owner comes from the body's `userId`.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Result<Json<TransactionBody>, JsonRejection>,
) -> Result<Json<Transaction>, ApiError>
where
  S: FinanceStore,
{
  let id = parse_id(&id, "Transaction")?;
  let Json(body) = body?;
  let input = NewTransaction::try_from(body)?;
  let tx = store
    .update_transaction(id, input)
    .await
    .map_err(store_error)?;
  Ok(Json(tx))
}

/// `DELETE /transactions/{id}?userId=<uuid>`
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
  let id = parse_id(&id, "Transaction")?;
  store
    .delete_transaction(id, owner_id)
    .await
    .map_err(store_error)?;
  Ok(Json(json!({ "message": "Transaction deleted successfully." })))
}

// ─── Aggregations ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AggregateParams {
  pub granularity: Option<String>,
}

/// `GET /transactions/{user_id}/aggregated-expenses?granularity=day|month|year`
pub async fn aggregated_expenses<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
  params: Result<Query<AggregateParams>, QueryRejection>,
) -> Result<Json<Vec<ExpenseBucket>>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  let Query(params) = params?;
  let granularity = Granularity::parse(params.granularity.as_deref().unwrap_or_default())?;
  let buckets = engine::aggregate_expenses(store.as_ref(), user_id, granularity).await?;
  Ok(Json(buckets))
}

/// `GET /transactions/{user_id}/category-breakdown`
pub async fn category_breakdown<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<CategoryTotal>>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  let totals = engine::aggregate_by_category(store.as_ref(), user_id).await?;
  Ok(Json(totals))
}

/// `GET /transactions/{user_id}/summary`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<String>,
) -> Result<Json<Summary>, ApiError>
where
  S: FinanceStore,
{
  let user_id = parse_id(&user_id, "User")?;
  Ok(Json(engine::summary(store.as_ref(), user_id).await?))
}
