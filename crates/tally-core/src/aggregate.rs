//! Pure aggregation over in-memory records.
//!
//! These functions hold the arithmetic of the aggregation engine. They never
//! touch a store, so the async wrappers in [`crate::engine`] only fetch and
//! delegate. Every function skips `Income` on its own, regardless of what
//! the caller passes in.
//!
//! Sums are checked: a total outside the `Decimal` range is reported as
//! [`Error::InvalidArgument`] instead of panicking.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Error, Result,
  budget::{Budget, MIN_YEAR},
  category::Category,
  transaction::Transaction,
};

// ─── Granularity ─────────────────────────────────────────────────────────────

/// Time-bucket resolution for [`bucket_expenses`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
  Day,
  Month,
  Year,
}

impl Granularity {
  /// Parse a caller-supplied granularity; anything but `day`, `month` or
  /// `year` is an [`Error::InvalidArgument`].
  pub fn parse(raw: &str) -> Result<Self> {
    raw.parse().map_err(|_| {
      Error::invalid_argument(
        "Invalid granularity specified. Must be \"day\", \"month\", or \"year\".",
      )
    })
  }
}

// ─── Date window ─────────────────────────────────────────────────────────────

/// A half-open range of instants, `[from, until)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
  pub from:  DateTime<Utc>,
  pub until: DateTime<Utc>,
}

impl DateWindow {
  /// The calendar month `month`/`year` in UTC: from the first instant of the
  /// month up to, but excluding, the first instant of the next one.
  pub fn month(month: u32, year: i32) -> Result<Self> {
    if !(1..=12).contains(&month) || year < MIN_YEAR {
      return Err(Error::invalid_argument("Invalid month or year provided."));
    }
    let (next_year, next_month) =
      if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    Ok(Self {
      from:  first_instant(year, month)?,
      until: first_instant(next_year, next_month)?,
    })
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.from <= at && at < self.until
  }
}

fn first_instant(year: i32, month: u32) -> Result<DateTime<Utc>> {
  NaiveDate::from_ymd_opt(year, month, 1)
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
    .ok_or_else(|| Error::invalid_argument("Invalid month or year provided."))
}

// ─── Output rows ─────────────────────────────────────────────────────────────

/// One time bucket of expense totals. `month` and `day` are present only at
/// the granularities that use them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBucket {
  pub year:         i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub month:        Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub day:          Option<u32>,
  pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
  pub category:     Category,
  pub total_amount: Decimal,
}

/// Budgeted versus actual spending for one category in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
  pub category: Category,
  pub budgeted: Decimal,
  pub actual:   Decimal,
}

// ─── Aggregations ────────────────────────────────────────────────────────────

/// Add `amount` to `total`, failing when the result leaves the `Decimal` range.
pub fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal> {
  total
    .checked_add(amount)
    .ok_or_else(|| Error::invalid_argument("Totals exceed the supported amount range."))
}

fn accumulate(slot: &mut Decimal, amount: Decimal) -> Result<()> {
  *slot = checked_sum(*slot, amount)?;
  Ok(())
}

/// Bucket key ordered by (year, month, day).
type BucketKey = (i32, Option<u32>, Option<u32>);

fn bucket_key(at: DateTime<Utc>, granularity: Granularity) -> BucketKey {
  match granularity {
    Granularity::Day => (at.year(), Some(at.month()), Some(at.day())),
    Granularity::Month => (at.year(), Some(at.month()), None),
    Granularity::Year => (at.year(), None, None),
  }
}

/// Sum expense amounts per time bucket, ascending by bucket.
pub fn bucket_expenses<'a>(
  transactions: impl IntoIterator<Item = &'a Transaction>,
  granularity: Granularity,
) -> Result<Vec<ExpenseBucket>> {
  let mut buckets: BTreeMap<BucketKey, Decimal> = BTreeMap::new();
  for tx in transactions.into_iter().filter(|tx| tx.category.is_expense()) {
    accumulate(
      buckets.entry(bucket_key(tx.date, granularity)).or_default(),
      tx.amount,
    )?;
  }

  Ok(
    buckets
      .into_iter()
      .map(|((year, month, day), total_amount)| ExpenseBucket {
        year,
        month,
        day,
        total_amount,
      })
      .collect(),
  )
}

/// Sum expense amounts per category, largest total first. Equal totals are
/// ordered by category key, alphabetically.
pub fn totals_by_category<'a>(
  transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<Vec<CategoryTotal>> {
  let mut totals: HashMap<Category, Decimal> = HashMap::new();
  for tx in transactions.into_iter().filter(|tx| tx.category.is_expense()) {
    accumulate(totals.entry(tx.category).or_default(), tx.amount)?;
  }

  let mut rows: Vec<CategoryTotal> = totals
    .into_iter()
    .map(|(category, total_amount)| CategoryTotal { category, total_amount })
    .collect();
  rows.sort_by(|a, b| {
    b.total_amount
      .cmp(&a.total_amount)
      .then_with(|| a.category.key().cmp(b.category.key()))
  });
  Ok(rows)
}

/// Merge budgets and actual spending into one row per category.
///
/// The row set is the union of both inputs' categories minus `Income`;
/// whichever side is missing reads as zero. Rows come out in registry order.
pub fn compare(
  budgets: &[Budget],
  spending: &[CategoryTotal],
) -> Result<Vec<ComparisonRow>> {
  let mut rows: BTreeMap<Category, ComparisonRow> = BTreeMap::new();

  for budget in budgets.iter().filter(|b| b.category.is_expense()) {
    rows
      .entry(budget.category)
      .or_insert_with(|| empty_row(budget.category))
      .budgeted = budget.budgeted_amount;
  }

  for spent in spending.iter().filter(|s| s.category.is_expense()) {
    let row = rows
      .entry(spent.category)
      .or_insert_with(|| empty_row(spent.category));
    accumulate(&mut row.actual, spent.total_amount)?;
  }

  Ok(rows.into_values().collect())
}

fn empty_row(category: Category) -> ComparisonRow {
  ComparisonRow { category, budgeted: Decimal::ZERO, actual: Decimal::ZERO }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use uuid::Uuid;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
  }

  fn tx(category: Category, amount: i64, date: DateTime<Utc>) -> Transaction {
    Transaction {
      id: Uuid::new_v4(),
      owner_id: Uuid::nil(),
      amount: Decimal::from(amount),
      date,
      description: "test entry".into(),
      category,
      created_at: date,
    }
  }

  fn budget(category: Category, amount: i64) -> Budget {
    Budget {
      id: Uuid::new_v4(),
      owner_id: Uuid::nil(),
      category,
      month: 3,
      year: 2024,
      budgeted_amount: Decimal::from(amount),
      created_at: at(2024, 3, 1),
      updated_at: at(2024, 3, 1),
    }
  }

  fn sample() -> Vec<Transaction> {
    vec![
      tx(Category::Food, 100, at(2024, 3, 5)),
      tx(Category::Food, 50, at(2024, 3, 20)),
      tx(Category::Income, 2000, at(2024, 3, 1)),
      tx(Category::Housing, 700, at(2024, 2, 1)),
      tx(Category::Shopping, 25, at(2023, 12, 31)),
      tx(Category::Food, 5, at(2024, 3, 5)),
    ]
  }

  fn grand_total(txs: &[Transaction]) -> Decimal {
    txs
      .iter()
      .filter(|t| t.category.is_expense())
      .map(|t| t.amount)
      .sum()
  }

  #[test]
  fn granularity_parses_known_values_only() {
    assert_eq!(Granularity::parse("day").unwrap(), Granularity::Day);
    assert_eq!(Granularity::parse("month").unwrap(), Granularity::Month);
    assert_eq!(Granularity::parse("year").unwrap(), Granularity::Year);
    assert!(matches!(Granularity::parse("week"), Err(Error::InvalidArgument(_))));
    assert!(matches!(Granularity::parse(""), Err(Error::InvalidArgument(_))));
    assert!(matches!(Granularity::parse("Month"), Err(Error::InvalidArgument(_))));
  }

  #[test]
  fn monthly_buckets_are_sorted_and_exclude_income() {
    let rows = bucket_expenses(&sample(), Granularity::Month).unwrap();
    let keys: Vec<_> = rows.iter().map(|r| (r.year, r.month, r.day)).collect();
    assert_eq!(keys, vec![
      (2023, Some(12), None),
      (2024, Some(2), None),
      (2024, Some(3), None),
    ]);
    assert_eq!(rows[2].total_amount, Decimal::from(155));
  }

  #[test]
  fn daily_buckets_split_by_day() {
    let rows = bucket_expenses(&sample(), Granularity::Day).unwrap();
    assert_eq!(rows.len(), 4);
    let march_5 = rows
      .iter()
      .find(|r| r.month == Some(3) && r.day == Some(5))
      .unwrap();
    assert_eq!(march_5.total_amount, Decimal::from(105));
  }

  #[test]
  fn yearly_buckets_omit_month_and_day() {
    let rows = bucket_expenses(&sample(), Granularity::Year).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.month.is_none() && r.day.is_none()));
    assert_eq!(rows[0].year, 2023);
    assert_eq!(rows[1].total_amount, Decimal::from(855));
  }

  #[test]
  fn bucket_totals_match_grand_total_for_every_granularity() {
    let txs = sample();
    for g in [Granularity::Day, Granularity::Month, Granularity::Year] {
      let sum: Decimal = bucket_expenses(&txs, g).unwrap().iter().map(|r| r.total_amount).sum();
      assert_eq!(sum, grand_total(&txs), "granularity {g}");
    }
  }

  #[test]
  fn empty_input_gives_empty_output() {
    assert!(bucket_expenses(&[], Granularity::Day).unwrap().is_empty());
    assert!(totals_by_category(&[]).unwrap().is_empty());
    assert!(compare(&[], &[]).unwrap().is_empty());
  }

  #[test]
  fn only_income_gives_empty_output() {
    let txs = vec![tx(Category::Income, 10, at(2024, 1, 1))];
    assert!(bucket_expenses(&txs, Granularity::Year).unwrap().is_empty());
    assert!(totals_by_category(&txs).unwrap().is_empty());
  }

  #[test]
  fn decimal_sums_are_exact() {
    let mut a = tx(Category::Food, 0, at(2024, 1, 1));
    a.amount = Decimal::new(10, 2);
    let mut b = tx(Category::Food, 0, at(2024, 1, 1));
    b.amount = Decimal::new(20, 2);
    let rows = bucket_expenses(&[a, b], Granularity::Year).unwrap();
    assert_eq!(rows[0].total_amount, Decimal::new(30, 2));
  }

  #[test]
  fn overflowing_totals_are_an_error() {
    let mut a = tx(Category::Food, 0, at(2024, 1, 1));
    a.amount = Decimal::MAX;
    let mut b = tx(Category::Food, 0, at(2024, 1, 2));
    b.amount = Decimal::ONE;
    let txs = vec![a, b];

    assert!(matches!(
      bucket_expenses(&txs, Granularity::Year),
      Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(totals_by_category(&txs), Err(Error::InvalidArgument(_))));

    let spending = vec![
      CategoryTotal { category: Category::Food, total_amount: Decimal::MAX },
      CategoryTotal { category: Category::Food, total_amount: Decimal::MAX },
    ];
    assert!(matches!(compare(&[], &spending), Err(Error::InvalidArgument(_))));
  }

  #[test]
  fn month_buckets_split_exactly_at_midnight_utc() {
    let first_of_march = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let last_of_february = first_of_march - chrono::Duration::microseconds(1);
    let txs = vec![
      tx(Category::Food, 7, first_of_march),
      tx(Category::Food, 3, last_of_february),
    ];

    let rows = bucket_expenses(&txs, Granularity::Month).unwrap();
    assert_eq!(rows, vec![
      ExpenseBucket {
        year:         2024,
        month:        Some(2),
        day:          None,
        total_amount: Decimal::from(3),
      },
      ExpenseBucket {
        year:         2024,
        month:        Some(3),
        day:          None,
        total_amount: Decimal::from(7),
      },
    ]);
  }

  #[test]
  fn category_totals_sorted_descending_and_positive() {
    let txs = sample();
    let rows = totals_by_category(&txs).unwrap();
    let cats: Vec<_> = rows.iter().map(|r| r.category).collect();
    assert_eq!(cats, vec![Category::Housing, Category::Food, Category::Shopping]);
    assert!(rows.iter().all(|r| r.total_amount > Decimal::ZERO));
    let sum: Decimal = rows.iter().map(|r| r.total_amount).sum();
    assert_eq!(sum, grand_total(&txs));
  }

  #[test]
  fn category_ties_break_alphabetically() {
    let txs = vec![
      tx(Category::Utilities, 40, at(2024, 1, 1)),
      tx(Category::Education, 40, at(2024, 1, 2)),
      tx(Category::Other, 40, at(2024, 1, 3)),
      tx(Category::Food, 90, at(2024, 1, 4)),
    ];
    let cats: Vec<_> = totals_by_category(&txs).unwrap().into_iter().map(|r| r.category).collect();
    assert_eq!(cats, vec![
      Category::Food,
      Category::Education,
      Category::Other,
      Category::Utilities,
    ]);
  }

  #[test]
  fn compare_merges_both_sources_with_zero_defaults() {
    let budgets = vec![budget(Category::Food, 120), budget(Category::Housing, 800)];
    let spending = vec![
      CategoryTotal { category: Category::Food, total_amount: Decimal::from(150) },
      CategoryTotal { category: Category::Shopping, total_amount: Decimal::from(30) },
    ];

    let rows = compare(&budgets, &spending).unwrap();
    assert_eq!(rows, vec![
      ComparisonRow {
        category: Category::Food,
        budgeted: Decimal::from(120),
        actual:   Decimal::from(150),
      },
      ComparisonRow {
        category: Category::Housing,
        budgeted: Decimal::from(800),
        actual:   Decimal::ZERO,
      },
      ComparisonRow {
        category: Category::Shopping,
        budgeted: Decimal::ZERO,
        actual:   Decimal::from(30),
      },
    ]);
  }

  #[test]
  fn compare_never_emits_income() {
    let budgets = vec![budget(Category::Income, 5000)];
    let spending = vec![CategoryTotal {
      category:     Category::Income,
      total_amount: Decimal::from(2000),
    }];
    assert!(compare(&budgets, &spending).unwrap().is_empty());
  }

  #[test]
  fn month_window_is_half_open() {
    let w = DateWindow::month(3, 2024).unwrap();
    assert!(w.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    assert!(w.contains(Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap()));
    assert!(!w.contains(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()));
    assert!(!w.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
  }

  #[test]
  fn december_window_rolls_into_next_year() {
    let w = DateWindow::month(12, 2024).unwrap();
    assert_eq!(w.until, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
  }

  #[test]
  fn month_window_rejects_bad_periods() {
    assert!(matches!(DateWindow::month(0, 2024), Err(Error::InvalidArgument(_))));
    assert!(matches!(DateWindow::month(13, 2024), Err(Error::InvalidArgument(_))));
    assert!(matches!(DateWindow::month(5, 1999), Err(Error::InvalidArgument(_))));
  }

  #[test]
  fn buckets_serialize_without_unused_keys() {
    let row = ExpenseBucket {
      year:         2024,
      month:        Some(3),
      day:          None,
      total_amount: Decimal::from(150),
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["year"], 2024);
    assert_eq!(json["month"], 3);
    assert!(json.get("day").is_none());
    assert_eq!(json["totalAmount"].as_f64(), Some(150.0));
  }
}
