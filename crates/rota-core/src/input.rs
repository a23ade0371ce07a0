//! Plain tabular records as supplied by the external data store.
//!
//! Every field is a string cell; numbers, booleans and nulls are coerced on
//! deserialisation so that spreadsheet-shaped JSON imports load unchanged.
//! Typing happens later, in [`crate::rule`], [`crate::decision`] and
//! [`crate::context`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::{OFF, calendar::DayCode, normalize_id};

// ─── Cell coercion ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
  Text(String),
  Int(i64),
  Float(f64),
  Bool(bool),
}

/// Deserialise any scalar (or null) into its string form.
pub fn cell<'de, D>(d: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<Cell>::deserialize(d)? {
    None => String::new(),
    Some(Cell::Text(s)) => s,
    Some(Cell::Int(i)) => i.to_string(),
    Some(Cell::Float(f)) => f.to_string(),
    Some(Cell::Bool(b)) => (if b { "TRUE" } else { "FALSE" }).to_string(),
  })
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One row of the roster table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
  #[serde(deserialize_with = "cell")]
  pub id:                String,
  #[serde(default, deserialize_with = "cell")]
  pub display_name:      String,
  #[serde(default, deserialize_with = "cell")]
  pub base_shift:        String,
  #[serde(default, deserialize_with = "cell")]
  pub primary_off_day:   String,
  #[serde(default, deserialize_with = "cell")]
  pub secondary_off_day: String,
}

/// One row of the override-rule table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
  #[serde(default, deserialize_with = "cell")]
  pub id:                String,
  #[serde(default, deserialize_with = "cell")]
  pub employee_id:       String,
  #[serde(default, deserialize_with = "cell")]
  pub kind:              String,
  #[serde(default, deserialize_with = "cell")]
  pub start_date:        String,
  #[serde(default, deserialize_with = "cell")]
  pub end_date:          String,
  #[serde(default, deserialize_with = "cell")]
  pub shift_value:       String,
  #[serde(default, deserialize_with = "cell")]
  pub primary_off_day:   String,
  #[serde(default, deserialize_with = "cell")]
  pub secondary_off_day: String,
  #[serde(default, deserialize_with = "cell")]
  pub frequency:         String,
  #[serde(default, deserialize_with = "cell")]
  pub approval_state:    String,
  #[serde(default, deserialize_with = "cell")]
  pub priority:          String,
}

/// One row of the declarative outcome table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDecisionRow {
  #[serde(default, deserialize_with = "cell")]
  pub base:               String,
  #[serde(default, deserialize_with = "cell")]
  pub rule_impact:        String,
  #[serde(default, deserialize_with = "cell")]
  pub holiday_flag:       String,
  #[serde(default, deserialize_with = "cell")]
  pub request_type:       String,
  #[serde(default, deserialize_with = "cell")]
  pub final_status:       String,
  #[serde(default, deserialize_with = "cell")]
  pub entitlement_action: String,
  #[serde(default, deserialize_with = "cell")]
  pub reason_text:        String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolidayRecord {
  #[serde(deserialize_with = "cell")]
  pub date: String,
  #[serde(default, deserialize_with = "cell")]
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
  #[serde(deserialize_with = "cell")]
  pub employee_id: String,
  #[serde(deserialize_with = "cell")]
  pub date:        String,
  /// Leave category, e.g. `ANNUAL` or `SICK`; reported as the final status.
  #[serde(default, deserialize_with = "cell")]
  pub category:    String,
}

/// Catalog entry classifying a shift code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftStatusRecord {
  #[serde(deserialize_with = "cell")]
  pub shift:  String,
  #[serde(deserialize_with = "cell")]
  pub status: String,
}

// ─── Employee ────────────────────────────────────────────────────────────────

/// One worker's static baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  /// Normalised via [`normalize_id`].
  pub id:           String,
  pub display_name: String,
  /// A shift code, or [`OFF`] when the record leaves it blank.
  pub base_shift:   String,
  pub off_days:     Vec<DayCode>,
}

impl Employee {
  /// Returns `None` when the id is blank.
  pub fn from_record(rec: &EmployeeRecord) -> Option<Self> {
    let id = normalize_id(&rec.id);
    if id.is_empty() {
      return None;
    }
    let base = rec.base_shift.trim();
    let off_days = [&rec.primary_off_day, &rec.secondary_off_day]
      .into_iter()
      .filter_map(|d| DayCode::parse_loose(d))
      .collect();
    Some(Self {
      display_name: if rec.display_name.trim().is_empty() {
        id.clone()
      } else {
        rec.display_name.trim().to_string()
      },
      id,
      base_shift: if base.is_empty() { OFF.to_string() } else { base.to_string() },
      off_days,
    })
  }

  pub fn is_off_day(&self, day: DayCode) -> bool { self.off_days.contains(&day) }
}
