//! Parsing of caller-supplied transaction dates.

use chrono::{DateTime, NaiveDate, Utc};

/// Accept an RFC 3339 timestamp or a bare `YYYY-MM-DD` date, which is read as
/// midnight UTC.
pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
}
