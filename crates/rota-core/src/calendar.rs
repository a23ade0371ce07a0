//! Calendar primitives: three-letter day codes, per-day facts and the
//! canonical date string that serves as the join key everywhere.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

/// Canonical date-string format.
const CANONICAL: &str = "%Y-%m-%d";

/// Accepted input formats, tried in order.
const INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

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
  Display,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DayCode {
  Mon,
  Tue,
  Wed,
  Thu,
  Fri,
  Sat,
  Sun,
}

impl DayCode {
  /// Parse any weekday spelling by its first three letters
  /// (`"monday"`, `"Mon"`, `"MON"`). Returns `None` for anything else.
  pub fn parse_loose(raw: &str) -> Option<Self> {
    let prefix: String = raw.trim().chars().take(3).collect();
    prefix.to_uppercase().parse().ok()
  }

  /// Every day from `self` to `end` inclusive, wrapping past Sunday
  /// (`FRI` through `MON` is four days).
  pub fn through(self, end: Self) -> Vec<Self> {
    let mut days = vec![self];
    let mut w = Weekday::from(self);
    while Self::from(w) != end {
      w = w.succ();
      days.push(Self::from(w));
    }
    days
  }
}

impl From<DayCode> for Weekday {
  fn from(d: DayCode) -> Self {
    match d {
      DayCode::Mon => Self::Mon,
      DayCode::Tue => Self::Tue,
      DayCode::Wed => Self::Wed,
      DayCode::Thu => Self::Thu,
      DayCode::Fri => Self::Fri,
      DayCode::Sat => Self::Sat,
      DayCode::Sun => Self::Sun,
    }
  }
}

impl From<Weekday> for DayCode {
  fn from(w: Weekday) -> Self {
    match w {
      Weekday::Mon => Self::Mon,
      Weekday::Tue => Self::Tue,
      Weekday::Wed => Self::Wed,
      Weekday::Thu => Self::Thu,
      Weekday::Fri => Self::Fri,
      Weekday::Sat => Self::Sat,
      Weekday::Sun => Self::Sun,
    }
  }
}

/// One calendar day's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFact {
  pub date:     NaiveDate,
  /// `YYYY-MM-DD`; the join key for holidays, leave and the ledger.
  pub date_str: String,
  pub day:      DayCode,
}

impl DayFact {
  pub fn new(date: NaiveDate) -> Self {
    Self {
      date,
      date_str: canonical_date(date),
      day: date.weekday().into(),
    }
  }
}

pub fn canonical_date(date: NaiveDate) -> String {
  date.format(CANONICAL).to_string()
}

/// Parse a date cell. Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD` and
/// anything that begins with a `YYYY-MM-DD` prefix (RFC 3339 timestamps).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let s = raw.trim();
  if s.is_empty() {
    return None;
  }
  for fmt in INPUT_FORMATS {
    if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
      return Some(d);
    }
  }
  s.get(..10)
    .and_then(|head| NaiveDate::parse_from_str(head, CANONICAL).ok())
}

/// Re-render a date cell in canonical form, or `None` if it does not parse.
pub fn canonicalize(raw: &str) -> Option<String> {
  parse_date(raw).map(canonical_date)
}

/// Every day in `from..=to`, in order.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Result<Vec<DayFact>> {
  if from > to {
    return Err(Error::InvalidRange {
      from: canonical_date(from),
      to:   canonical_date(to),
    });
  }
  Ok(from.iter_days().take_while(|d| *d <= to).map(DayFact::new).collect())
}
