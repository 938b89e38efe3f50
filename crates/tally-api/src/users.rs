//! Handler for `POST /users`: device-identity bootstrap.

use std::sync::Arc;

use axum::{Json, extract::{State, rejection::JsonRejection}};
use serde::Deserialize;
use tally_core::{store::FinanceStore, user::User};

use crate::error::{ApiError, store_error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBody {
  pub device_id: Option<String>,
}

/// `POST /users`: body: `{"deviceId":"..."}`. Returns the existing user for
/// the device, or a newly created one.
pub async fn find_or_create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<DeviceBody>, JsonRejection>,
) -> Result<Json<User>, ApiError>
where
  S: FinanceStore,
{
  let Json(body) = body?;
  let device_id = body
    .device_id
    .ok_or_else(|| ApiError::BadRequest("Device ID is required.".into()))?;

  let user = store
    .find_or_create_user(device_id)
    .await
    .map_err(store_error)?;
  tracing::debug!(user_id = %user.user_id, "resolved device identity");
  Ok(Json(user))
}
