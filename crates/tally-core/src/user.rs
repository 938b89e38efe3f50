//! User: a minimal identity bound to a client-generated device token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Created on first contact from a device; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:    Uuid,
  /// Opaque, client-chosen; unique across users.
  pub device_id:  String,
  pub created_at: DateTime<Utc>,
}

/// Reject blank device tokens.
pub fn check_device_id(device_id: &str) -> Result<()> {
  if device_id.trim().is_empty() {
    return Err(Error::validation("Device ID is required."));
  }
  Ok(())
}
