//! Core types, validation, and aggregation logic for the Tally finance
//! tracker.
//!
//! Nothing here touches HTTP or a database. Storage backends implement
//! [`store::FinanceStore`]; the aggregation engine in [`engine`] runs on top
//! of any such backend.

pub mod aggregate;
pub mod budget;
pub mod category;
pub mod engine;
pub mod error;
pub mod insight;
pub mod store;
pub mod transaction;
pub mod user;

pub use error::{Error, Result};
