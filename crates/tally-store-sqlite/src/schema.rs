//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    device_id   TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    transaction_id TEXT PRIMARY KEY,
    owner_id       TEXT NOT NULL,
    amount         TEXT NOT NULL,   -- exact decimal, always > 0
    date           TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    description    TEXT NOT NULL,
    category       TEXT NOT NULL,   -- category key, e.g. 'Food'
    created_at     TEXT NOT NULL
);

-- One budget per owner, category and month. Upserts target this key.
CREATE TABLE IF NOT EXISTS budgets (
    budget_id       TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL,
    category        TEXT NOT NULL,
    month           INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    year            INTEGER NOT NULL CHECK (year >= 2000),
    budgeted_amount TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (owner_id, category, month, year)
);

CREATE INDEX IF NOT EXISTS transactions_owner_date_idx ON transactions(owner_id, date);
CREATE INDEX IF NOT EXISTS budgets_owner_period_idx    ON budgets(owner_id, year, month);

PRAGMA user_version = 1;
";
