//! Handler for `GET /categories`.

use axum::Json;
use serde::Serialize;
use tally_core::category::{self, Category};

#[derive(Debug, Serialize)]
pub struct CategoryEntry {
  pub value: Category,
  pub label: &'static str,
}

/// `GET /categories`: the registry, in registry order.
pub async fn list() -> Json<Vec<CategoryEntry>> {
  Json(
    category::all()
      .map(|value| CategoryEntry { value, label: value.label() })
      .collect(),
  )
}
