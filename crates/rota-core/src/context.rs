//! Per-run aggregate shared read-only by every resolution.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
  Error, OFF, Result,
  calendar::canonicalize,
  cell_key,
  config::EngineConfig,
  decision::{DecisionTable, RequestType},
  input::{
    Employee, EmployeeRecord, HolidayRecord, LeaveRecord, RawDecisionRow, RawRule,
    ShiftStatusRecord,
  },
  ledger::LedgerEntry,
  normalize_id,
  rule::{Rule, RuleIndex},
};

/// Everything a run reads from the external store, as plain records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInputs {
  #[serde(default)]
  pub employees:      Vec<EmployeeRecord>,
  #[serde(default)]
  pub rules:          Vec<RawRule>,
  #[serde(default)]
  pub decision_rows:  Vec<RawDecisionRow>,
  #[serde(default)]
  pub holidays:       Vec<HolidayRecord>,
  #[serde(default)]
  pub leaves:         Vec<LeaveRecord>,
  #[serde(default)]
  pub shift_statuses: Vec<ShiftStatusRecord>,
  #[serde(default)]
  pub ledger:         Vec<LedgerEntry>,
}

impl RunInputs {
  /// Typed employees, unique by normalised id; the first record wins.
  pub fn employees(&self) -> Vec<Employee> {
    let mut seen = HashSet::new();
    self
      .employees
      .iter()
      .filter_map(Employee::from_record)
      .filter(|e| {
        let fresh = seen.insert(e.id.clone());
        if !fresh {
          tracing::warn!(employee = %e.id, "duplicate employee id; keeping first");
        }
        fresh
      })
      .collect()
  }
}

/// How the shift catalog classifies a shift code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftClass {
  Work,
  Off,
  Half,
}

impl ShiftClass {
  fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_uppercase().as_str() {
      "WORK" => Some(Self::Work),
      "OFF" => Some(Self::Off),
      "HALF" | "HALF_DAY" => Some(Self::Half),
      _ => None,
    }
  }
}

/// Immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct EngineContext {
  config:        EngineConfig,
  shift_classes: HashMap<String, ShiftClass>,
  table:         DecisionTable,
  /// `employee|date` → request implied by an Active entitlement.
  active_ledger: HashMap<String, (RequestType, String)>,
  /// `employee|date` → leave category.
  leaves:        HashMap<String, String>,
  rules:         RuleIndex,
  holidays:      HashSet<String>,
}

impl EngineContext {
  /// Build the context. Fails if the decision table has no usable rows;
  /// nothing could resolve against it.
  pub fn build(config: EngineConfig, inputs: &RunInputs) -> Result<Self> {
    let table = DecisionTable::build(&inputs.decision_rows);
    if table.is_empty() {
      return Err(Error::EmptyDecisionTable);
    }

    let shift_classes = inputs
      .shift_statuses
      .iter()
      .filter_map(|r| {
        let shift = r.shift.trim();
        let class = ShiftClass::parse(&r.status)?;
        (!shift.is_empty()).then(|| (shift.to_uppercase(), class))
      })
      .collect();

    let active_ledger = inputs
      .ledger
      .iter()
      .filter_map(|e| {
        let request = e.implied_request()?;
        let key = e.key();
        Some((
          cell_key(&key.employee_id, &key.date),
          (request, e.final_status.trim().to_uppercase()),
        ))
      })
      .collect();

    let leaves = inputs
      .leaves
      .iter()
      .filter_map(|l| {
        let date = canonicalize(&l.date)?;
        let category = match l.category.trim() {
          "" => "LEAVE".to_string(),
          c => c.to_string(),
        };
        Some((cell_key(&normalize_id(&l.employee_id), &date), category))
      })
      .collect();

    let holidays = inputs
      .holidays
      .iter()
      .filter_map(|h| canonicalize(&h.date))
      .collect();

    let ctx = Self {
      config,
      shift_classes,
      table,
      active_ledger,
      leaves,
      rules: RuleIndex::build(&inputs.rules),
      holidays,
    };
    tracing::debug!(
      decision_rows = ctx.table.len(),
      rules = ctx.rules.len(),
      holidays = ctx.holidays.len(),
      leaves = ctx.leaves.len(),
      active_entitlements = ctx.active_ledger.len(),
      "engine context built"
    );
    Ok(ctx)
  }

  pub fn config(&self) -> &EngineConfig { &self.config }

  pub fn table(&self) -> &DecisionTable { &self.table }

  pub fn rules_for(&self, employee_id: &str) -> &[Rule] { self.rules.rules_for(employee_id) }

  pub fn is_holiday(&self, date_str: &str) -> bool { self.holidays.contains(date_str) }

  pub fn leave_category(&self, employee_id: &str, date_str: &str) -> Option<&str> {
    self
      .leaves
      .get(&cell_key(employee_id, date_str))
      .map(String::as_str)
  }

  /// The request implied by an Active entitlement and the entry's status.
  pub fn active_entitlement(
    &self,
    employee_id: &str,
    date_str: &str,
  ) -> Option<(RequestType, &str)> {
    self
      .active_ledger
      .get(&cell_key(employee_id, date_str))
      .map(|(req, status)| (*req, status.as_str()))
  }

  /// `OFF` itself, or a code the catalog classifies as OFF.
  pub fn is_off_shift(&self, shift: &str) -> bool {
    let s = shift.trim();
    s.eq_ignore_ascii_case(OFF)
      || self.shift_classes.get(&s.to_uppercase()) == Some(&ShiftClass::Off)
  }

  /// One of the configured half-day codes, or a code the catalog
  /// classifies as HALF.
  pub fn is_half_day(&self, shift: &str) -> bool {
    let s = shift.trim();
    self.config.half_day_shifts.iter().any(|h| h == s)
      || self.shift_classes.get(&s.to_uppercase()) == Some(&ShiftClass::Half)
  }
}
