//! The category registry: a fixed table of spending categories.
//!
//! Categories are stored and transmitted by their key (`"Food"`, `"Income"`,
//! ...). Display labels are only looked up for presentation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

/// A registered category key.
///
/// Variant order is the registry order; [`Ord`] follows it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum Category {
  Food,
  Transportation,
  Housing,
  Utilities,
  Entertainment,
  Shopping,
  Healthcare,
  Education,
  Income,
  Investments,
  Other,
}

impl Category {
  /// The key stored in the database and sent over the wire.
  pub fn key(self) -> &'static str { self.into() }

  pub fn label(self) -> &'static str {
    match self {
      Self::Food => "Food & Dining",
      Self::Transportation => "Transportation",
      Self::Housing => "Housing",
      Self::Utilities => "Utilities",
      Self::Entertainment => "Entertainment",
      Self::Shopping => "Shopping",
      Self::Healthcare => "Healthcare",
      Self::Education => "Education",
      Self::Income => "Salary/Income",
      Self::Investments => "Investments",
      Self::Other => "Other",
    }
  }

  /// Everything except `Income` counts as spending.
  pub fn is_expense(self) -> bool { !matches!(self, Self::Income) }
}

/// Whether `key` names a registered category. Keys are case-sensitive.
pub fn is_valid(key: &str) -> bool { Category::from_str(key).is_ok() }

/// The display label for `key`, or `key` itself when it is not registered.
pub fn label(key: &str) -> &str {
  Category::from_str(key).map(Category::label).unwrap_or(key)
}

/// Parse a category key supplied by a caller.
pub fn parse(key: &str) -> Result<Category> {
  Category::from_str(key)
    .map_err(|_| Error::validation(format!("Invalid category: {key:?}.")))
}

/// All registered categories, in registry order.
pub fn all() -> impl Iterator<Item = Category> { Category::iter() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn registry_has_eleven_entries() {
    assert_eq!(all().count(), 11);
  }

  #[test]
  fn keys_round_trip_through_parse() {
    for category in all() {
      assert_eq!(parse(category.key()).unwrap(), category);
      assert!(is_valid(category.key()));
    }
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(!is_valid("food"));
    assert!(!is_valid("Groceries"));
    assert!(matches!(parse("Groceries"), Err(Error::Validation(_))));
  }

  #[test]
  fn label_falls_back_to_key() {
    assert_eq!(label("Food"), "Food & Dining");
    assert_eq!(label("Income"), "Salary/Income");
    assert_eq!(label("Mystery"), "Mystery");
  }

  #[test]
  fn only_income_is_not_an_expense() {
    let non_expense: Vec<_> = all().filter(|c| !c.is_expense()).collect();
    assert_eq!(non_expense, vec![Category::Income]);
  }

  #[test]
  fn serde_uses_the_key() {
    let json = serde_json::to_string(&Category::Healthcare).unwrap();
    assert_eq!(json, "\"Healthcare\"");
  }
}
