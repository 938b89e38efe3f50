//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! width, so lexical order in SQL equals chronological order. Amounts are
//! stored as decimal strings. UUIDs are stored as hyphenated lowercase
//! strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;
use tally_core::{
  budget::Budget,
  category::Category,
  transaction::Transaction,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Drop precision the column cannot hold, so a value handed back to the caller
/// equals the value read back later.
pub fn truncate_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

/// The current instant at storage precision.
pub fn now() -> DateTime<Utc> { truncate_dt(Utc::now()) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

// ─── Category ────────────────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str { c.key() }

pub fn decode_category(s: &str) -> Result<Category> {
  Category::from_str(s).map_err(|_| Error::UnknownCategory(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const TRANSACTION_COLUMNS: &str =
  "transaction_id, owner_id, amount, date, description, category, created_at";

/// Raw strings read directly from a `transactions` row.
pub struct RawTransaction {
  pub transaction_id: String,
  pub owner_id:       String,
  pub amount:         String,
  pub date:           String,
  pub description:    String,
  pub category:       String,
  pub created_at:     String,
}

impl RawTransaction {
  /// Map a row selected with [`TRANSACTION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      transaction_id: row.get(0)?,
      owner_id:       row.get(1)?,
      amount:         row.get(2)?,
      date:           row.get(3)?,
      description:    row.get(4)?,
      category:       row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_transaction(self) -> Result<Transaction> {
    Ok(Transaction {
      id:          decode_uuid(&self.transaction_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      amount:      decode_decimal(&self.amount)?,
      date:        decode_dt(&self.date)?,
      description: self.description,
      category:    decode_category(&self.category)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const BUDGET_COLUMNS: &str =
  "budget_id, owner_id, category, month, year, budgeted_amount, created_at, updated_at";

/// Raw values read directly from a `budgets` row.
pub struct RawBudget {
  pub budget_id:       String,
  pub owner_id:        String,
  pub category:        String,
  pub month:           u32,
  pub year:            i32,
  pub budgeted_amount: String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawBudget {
  /// Map a row selected with [`BUDGET_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      budget_id:       row.get(0)?,
      owner_id:        row.get(1)?,
      category:        row.get(2)?,
      month:           row.get(3)?,
      year:            row.get(4)?,
      budgeted_amount: row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_budget(self) -> Result<Budget> {
    Ok(Budget {
      id:              decode_uuid(&self.budget_id)?,
      owner_id:        decode_uuid(&self.owner_id)?,
      category:        decode_category(&self.category)?,
      month:           self.month,
      year:            self.year,
      budgeted_amount: decode_decimal(&self.budgeted_amount)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub device_id:  String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      device_id:  self.device_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
