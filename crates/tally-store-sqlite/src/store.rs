//! [`SqliteStore`]: the SQLite implementation of [`FinanceStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tally_core::{
  aggregate::DateWindow,
  budget::{Budget, BudgetFilter, NewBudget},
  category::Category,
  store::FinanceStore,
  transaction::{NewTransaction, Transaction},
  user::{self, User},
};

use crate::{
  encode::{
    BUDGET_COLUMNS, RawBudget, RawTransaction, RawUser, TRANSACTION_COLUMNS,
    encode_category, encode_decimal, encode_dt, encode_uuid, now, truncate_dt,
  },
  schema::SCHEMA,
  Error, Result,
};

const TRANSACTION_NOT_FOUND: &str =
  "Transaction not found or does not belong to this user.";
const BUDGET_NOT_FOUND: &str = "Budget not found or does not belong to this user.";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn not_found(message: &str) -> Error {
  Error::Core(tally_core::Error::not_found(message))
}

// ─── FinanceStore impl ───────────────────────────────────────────────────────

impl FinanceStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn find_or_create_user(&self, device_id: String) -> Result<User> {
    user::check_device_id(&device_id)?;

    let id_str = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(now());

    // A single upsert-by-unique-key: concurrent first contacts from the same
    // device cannot create two users.
    let raw: RawUser = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, device_id, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (device_id) DO NOTHING",
          rusqlite::params![id_str, device_id, at_str],
        )?;
        Ok(conn.query_row(
          "SELECT user_id, device_id, created_at FROM users WHERE device_id = ?1",
          rusqlite::params![device_id],
          |row| {
            Ok(RawUser {
              user_id:    row.get(0)?,
              device_id:  row.get(1)?,
              created_at: row.get(2)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_user()
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  async fn list_transactions(&self, owner_id: Uuid) -> Result<Vec<Transaction>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawTransaction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRANSACTION_COLUMNS} FROM transactions
           WHERE owner_id = ?1
           ORDER BY date DESC, created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawTransaction::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransaction::into_transaction).collect()
  }

  async fn get_transaction(&self, id: Uuid, owner_id: Uuid) -> Result<Transaction> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner_id);

    let raw: Option<RawTransaction> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {TRANSACTION_COLUMNS} FROM transactions
               WHERE transaction_id = ?1 AND owner_id = ?2"
            ),
            rusqlite::params![id_str, owner_str],
            RawTransaction::from_row,
          )
          .optional()?)
      })
      .await?;

    raw
      .ok_or_else(|| not_found(TRANSACTION_NOT_FOUND))?
      .into_transaction()
  }

  async fn add_transaction(&self, input: NewTransaction) -> Result<Transaction> {
    let input = input.validated()?;
    let tx = Transaction {
      id:          Uuid::new_v4(),
      owner_id:    input.owner_id,
      amount:      input.amount,
      date:        truncate_dt(input.date),
      description: input.description,
      category:    input.category,
      created_at:  now(),
    };

    let id_str       = encode_uuid(tx.id);
    let owner_str    = encode_uuid(tx.owner_id);
    let amount_str   = encode_decimal(tx.amount);
    let date_str     = encode_dt(tx.date);
    let description  = tx.description.clone();
    let category_str = encode_category(tx.category);
    let created_str  = encode_dt(tx.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO transactions (
             transaction_id, owner_id, amount, date, description, category, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            owner_str,
            amount_str,
            date_str,
            description,
            category_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(tx)
  }

  async fn update_transaction(
    &self,
    id:    Uuid,
    input: NewTransaction,
  ) -> Result<Transaction> {
    let input = input.validated()?;

    let id_str       = encode_uuid(id);
    let owner_str    = encode_uuid(input.owner_id);
    let amount_str   = encode_decimal(input.amount);
    let date_str     = encode_dt(truncate_dt(input.date));
    let description  = input.description;
    let category_str = encode_category(input.category);

    let raw: Option<RawTransaction> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE transactions
               SET amount = ?1, date = ?2, description = ?3, category = ?4
               WHERE transaction_id = ?5 AND owner_id = ?6
               RETURNING {TRANSACTION_COLUMNS}"
            ),
            rusqlite::params![
              amount_str,
              date_str,
              description,
              category_str,
              id_str,
              owner_str,
            ],
            RawTransaction::from_row,
          )
          .optional()?)
      })
      .await?;

    raw
      .ok_or_else(|| not_found(TRANSACTION_NOT_FOUND))?
      .into_transaction()
  }

  async fn delete_transaction(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM transactions WHERE transaction_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(not_found(TRANSACTION_NOT_FOUND));
    }
    Ok(())
  }

  async fn expense_transactions(
    &self,
    owner_id: Uuid,
    window:   Option<DateWindow>,
  ) -> Result<Vec<Transaction>> {
    let owner_str  = encode_uuid(owner_id);
    let income_str = encode_category(Category::Income);
    let from_str   = window.map(|w| encode_dt(w.from));
    let until_str  = window.map(|w| encode_dt(w.until));

    let raws: Vec<RawTransaction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRANSACTION_COLUMNS} FROM transactions
           WHERE owner_id = ?1
             AND category != ?2
             AND (?3 IS NULL OR date >= ?3)
             AND (?4 IS NULL OR date <  ?4)"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, income_str, from_str, until_str],
            RawTransaction::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransaction::into_transaction).collect()
  }

  // ── Budgets ───────────────────────────────────────────────────────────────

  async fn list_budgets(&self, owner_id: Uuid, filter: BudgetFilter) -> Result<Vec<Budget>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<RawBudget> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BUDGET_COLUMNS} FROM budgets
           WHERE owner_id = ?1
             AND (?2 IS NULL OR month = ?2)
             AND (?3 IS NULL OR year  = ?3)
           ORDER BY year ASC, month ASC, category ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, filter.month, filter.year],
            RawBudget::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBudget::into_budget).collect()
  }

  async fn upsert_budget(&self, input: NewBudget) -> Result<Budget> {
    let input = input.validated()?;

    let id_str       = encode_uuid(Uuid::new_v4());
    let owner_str    = encode_uuid(input.owner_id);
    let category_str = encode_category(input.category);
    let amount_str   = encode_decimal(input.budgeted_amount);
    let at_str       = encode_dt(now());
    let (month, year) = (input.month, input.year);

    // Insert-or-update in one statement against the UNIQUE key, so racing
    // writers for the same period converge on a single row.
    let raw: RawBudget = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO budgets (
               budget_id, owner_id, category, month, year,
               budgeted_amount, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT (owner_id, category, month, year) DO UPDATE SET
               budgeted_amount = excluded.budgeted_amount,
               updated_at      = excluded.updated_at
             RETURNING {BUDGET_COLUMNS}"
          ),
          rusqlite::params![
            id_str,
            owner_str,
            category_str,
            month,
            year,
            amount_str,
            at_str,
          ],
          RawBudget::from_row,
        )?)
      })
      .await?;

    raw.into_budget()
  }

  async fn delete_budget(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM budgets WHERE budget_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(not_found(BUDGET_NOT_FOUND));
    }
    Ok(())
  }
}
