//! The declarative outcome table and its wildcard-expanded index.
//!
//! Lookup happens in two stages: the exact four-flag key selects a bucket of
//! candidate rows (every row whose wildcards expand to that key, in source
//! order), then each candidate is re-checked against its original
//! dimensions and the first match wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::input::RawDecisionRow;

// ─── Flag values ─────────────────────────────────────────────────────────────

/// Whether a day is worked.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DayState {
  Work,
  Off,
}

/// The rule-derived state, visible to the table only when it differs from
/// the base state.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleImpact {
  Work,
  Off,
  None,
}

impl From<DayState> for RuleImpact {
  fn from(s: DayState) -> Self {
    match s {
      DayState::Work => Self::Work,
      DayState::Off => Self::Off,
    }
  }
}

/// What the employee asked for (or holds) on the day.
///
/// `Off` is an entitlement recorded under the legacy `OFF` status; it shares
/// the `COMP_DAY` index key and is admitted by a `COMP_DAY` criterion.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
  None,
  CompDay,
  Off,
  Leave,
}

impl RequestType {
  fn key_token(self) -> RequestType {
    match self {
      Self::Off => Self::CompDay,
      other => other,
    }
  }
}

/// Entitlement side-effect of a matched row.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EntitlementAction {
  Grant,
  Revoke,
  #[default]
  None,
}

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// A table criterion: a wildcard or one concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension<T> {
  Any,
  Is(T),
}

/// Criterion/value matching. Equality unless a type says otherwise.
pub trait Criterion: Copy + PartialEq {
  fn admits(self, value: Self) -> bool { self == value }
}

impl Criterion for DayState {}
impl Criterion for RuleImpact {}
impl Criterion for bool {}

impl Criterion for RequestType {
  fn admits(self, value: Self) -> bool {
    self == value || (self == Self::CompDay && value == Self::Off)
  }
}

impl<T: Criterion> Dimension<T> {
  pub fn admits(&self, value: T) -> bool {
    match self {
      Self::Any => true,
      Self::Is(c) => c.admits(value),
    }
  }

  fn expand(&self, domain: &[T]) -> Vec<T> {
    match self {
      Self::Any => domain.to_vec(),
      Self::Is(v) => vec![*v],
    }
  }
}

const BASE_DOMAIN: [DayState; 2] = [DayState::Work, DayState::Off];
const RULE_DOMAIN: [RuleImpact; 3] =
  [RuleImpact::Work, RuleImpact::Off, RuleImpact::None];
const HOLIDAY_DOMAIN: [bool; 2] = [true, false];
const REQUEST_DOMAIN: [RequestType; 3] =
  [RequestType::None, RequestType::CompDay, RequestType::Leave];

fn is_wildcard(s: &str) -> bool {
  s.is_empty() || s == "ANY" || s == "IGNORED" || s == "*"
}

fn parse_dim<T: std::str::FromStr>(raw: &str) -> Option<Dimension<T>> {
  let s = raw.trim().to_uppercase().replace([' ', '-'], "_");
  if is_wildcard(&s) {
    return Some(Dimension::Any);
  }
  s.parse().ok().map(Dimension::Is)
}

fn parse_holiday(raw: &str) -> Option<Dimension<bool>> {
  let s = raw.trim().to_uppercase();
  if is_wildcard(&s) {
    return Some(Dimension::Any);
  }
  match s.as_str() {
    "TRUE" | "YES" | "Y" | "1" | "HOLIDAY" => Some(Dimension::Is(true)),
    "FALSE" | "NO" | "N" | "0" => Some(Dimension::Is(false)),
    _ => None,
  }
}

fn flag(b: bool) -> &'static str { if b { "TRUE" } else { "FALSE" } }

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One typed line of the outcome table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRow {
  /// 1-based position in the source table.
  pub position:     usize,
  pub base:         Dimension<DayState>,
  pub rule:         Dimension<RuleImpact>,
  pub holiday:      Dimension<bool>,
  pub request:      Dimension<RequestType>,
  /// Status token; `LEAVE` is replaced by the leave category on resolution.
  pub final_status: String,
  pub action:       EntitlementAction,
  pub reason:       String,
}

impl DecisionRow {
  /// Returns `None` if a concrete dimension value is not recognised.
  pub fn from_raw(position: usize, raw: &RawDecisionRow) -> Option<Self> {
    Some(Self {
      position,
      base: parse_dim(&raw.base)?,
      rule: parse_dim(&raw.rule_impact)?,
      holiday: parse_holiday(&raw.holiday_flag)?,
      request: parse_dim(&raw.request_type)?,
      final_status: raw.final_status.trim().to_uppercase(),
      action: raw
        .entitlement_action
        .trim()
        .to_uppercase()
        .parse()
        .unwrap_or_default(),
      reason: raw.reason_text.trim().to_string(),
    })
  }

  /// Wildcard-aware match against the original (unexpanded) criteria.
  pub fn admits(&self, key: &LookupKey) -> bool {
    self.base.admits(key.base)
      && self.rule.admits(key.rule)
      && self.holiday.admits(key.holiday)
      && self.request.admits(key.request)
  }

  /// Every exact index key this row lands under.
  fn expanded_keys(&self) -> Vec<String> {
    let mut keys = Vec::new();
    for base in self.base.expand(&BASE_DOMAIN) {
      for rule in self.rule.expand(&RULE_DOMAIN) {
        for holiday in self.holiday.expand(&HOLIDAY_DOMAIN) {
          for request in self.request.expand(&REQUEST_DOMAIN) {
            keys.push(LookupKey { base, rule, holiday, request }.index_key());
          }
        }
      }
    }
    keys
  }
}

/// The four flags computed for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupKey {
  pub base:    DayState,
  pub rule:    RuleImpact,
  pub holiday: bool,
  pub request: RequestType,
}

impl LookupKey {
  /// `base|rule|holiday|request`, e.g. `WORK|NONE|TRUE|NONE`.
  pub fn index_key(&self) -> String {
    format!(
      "{}|{}|{}|{}",
      self.base,
      self.rule,
      flag(self.holiday),
      self.request.key_token()
    )
  }
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// The outcome table, indexed by exact key.
#[derive(Debug, Clone, Default)]
pub struct DecisionTable {
  rows:  Vec<DecisionRow>,
  index: HashMap<String, Vec<usize>>,
}

impl DecisionTable {
  pub fn build(raws: &[RawDecisionRow]) -> Self {
    let mut rows = Vec::with_capacity(raws.len());
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();

    for (i, raw) in raws.iter().enumerate() {
      let Some(row) = DecisionRow::from_raw(i + 1, raw) else {
        tracing::debug!(position = i + 1, ?raw, "dropping unparseable decision row");
        continue;
      };
      let slot = rows.len();
      for key in row.expanded_keys() {
        index.entry(key).or_default().push(slot);
      }
      rows.push(row);
    }

    tracing::debug!(rows = rows.len(), keys = index.len(), "decision table built");
    Self { rows, index }
  }

  /// First row in the key's bucket that re-validates against `key`.
  pub fn lookup(&self, key: &LookupKey) -> Option<&DecisionRow> {
    self
      .index
      .get(&key.index_key())?
      .iter()
      .map(|&i| &self.rows[i])
      .find(|row| row.admits(key))
  }

  /// Candidate rows for an exact key string, in bucket order.
  pub fn bucket(&self, index_key: &str) -> Vec<&DecisionRow> {
    self
      .index
      .get(index_key)
      .map(|slots| slots.iter().map(|&i| &self.rows[i]).collect())
      .unwrap_or_default()
  }

  pub fn rows(&self) -> &[DecisionRow] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
