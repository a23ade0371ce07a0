//! Per-cell resolution.
//!
//! [`resolve_employee_day`] is a pure function of its arguments. It runs the
//! base/rule passes, looks the resulting flags up in the decision table,
//! computes the shift and weight, and cross-checks itself with an
//! independent recomputation of the SHIFT_OVERRIDE winner ("mirror audit").
//! Failures come back as data: an `ERROR` row for missing table logic, an
//! audit-fail reason for a mirror mismatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  OFF,
  calendar::DayFact,
  cell_key,
  context::EngineContext,
  decision::{DayState, EntitlementAction, LookupKey, RequestType, RuleImpact},
  input::Employee,
  rule::{Rule, select_winner},
};

pub const NONE: &str = "NONE";
pub const ERROR: &str = "ERROR";
pub const MISSING_LOGIC: &str = "Missing Logic";

// ─── Output types ────────────────────────────────────────────────────────────

/// The resolved status of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "label", rename_all = "snake_case")]
pub enum FinalStatus {
  Work,
  Off,
  CompDay,
  /// Carries the leave category reported in place of `LEAVE`.
  Leave(String),
  /// Any other status token the decision table produces.
  Other(String),
  /// No decision row matched.
  Error,
}

impl FinalStatus {
  fn from_row(token: &str, leave_category: Option<&str>) -> Self {
    match token {
      "WORK" => Self::Work,
      "OFF" => Self::Off,
      "COMP_DAY" => Self::CompDay,
      "LEAVE" => Self::Leave(leave_category.unwrap_or("LEAVE").to_string()),
      other => Self::Other(other.to_string()),
    }
  }

  pub fn is_error(&self) -> bool { matches!(self, Self::Error) }
}

impl fmt::Display for FinalStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Work => f.write_str("WORK"),
      Self::Off => f.write_str(OFF),
      Self::CompDay => f.write_str("COMP_DAY"),
      Self::Leave(category) => f.write_str(category),
      Self::Other(token) => f.write_str(token),
      Self::Error => f.write_str(ERROR),
    }
  }
}

/// The 14-field audit record for one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
  /// `employee|date`.
  pub key:               String,
  pub display_name:      String,
  pub date:              String,
  pub base_flag:         DayState,
  pub base_shift:        String,
  pub derived_shift:     String,
  /// Leave category, or `NONE`.
  pub leave_category:    String,
  pub holiday_flag:      bool,
  /// Status of the Active entitlement for the cell, or `NONE`.
  pub entitlement_input: String,
  pub final_status:      String,
  pub final_shift:       String,
  pub reason:            String,
  pub trace:             String,
  pub final_weight:      f64,
}

impl AuditRow {
  /// Column names matching [`AuditRow::fields`].
  pub const HEADER: [&'static str; 14] = [
    "key",
    "display_name",
    "date",
    "base_flag",
    "base_shift",
    "derived_shift",
    "leave_category",
    "holiday_flag",
    "entitlement_input",
    "final_status",
    "final_shift",
    "reason",
    "trace",
    "final_weight",
  ];

  /// Fields in output-column order.
  pub fn fields(&self) -> [String; 14] {
    [
      self.key.clone(),
      self.display_name.clone(),
      self.date.clone(),
      self.base_flag.to_string(),
      self.base_shift.clone(),
      self.derived_shift.clone(),
      self.leave_category.clone(),
      if self.holiday_flag { "TRUE" } else { "FALSE" }.to_string(),
      self.entitlement_input.clone(),
      self.final_status.clone(),
      self.final_shift.clone(),
      self.reason.clone(),
      self.trace.clone(),
      self.final_weight.to_string(),
    ]
  }
}

/// Output of one resolution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
  pub employee_id:  String,
  pub audit:        AuditRow,
  pub action:       EntitlementAction,
  pub status:       FinalStatus,
  pub request:      RequestType,
  /// Set when the mirror audit disagreed with the resolved shift.
  pub audit_failed: bool,
}

impl ResolutionResult {
  pub fn is_error(&self) -> bool { self.status.is_error() }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Facts shared by every exit path of a resolution.
struct Cell<'a> {
  employee:    &'a Employee,
  day:         &'a DayFact,
  base_state:  DayState,
  base_shift:  String,
  shift:       String,
  leave:       Option<&'a str>,
  holiday:     bool,
  entitlement: Option<&'a str>,
  request:     RequestType,
  trace:       Vec<String>,
}

impl Cell<'_> {
  fn finish(
    self,
    status: FinalStatus,
    action: EntitlementAction,
    final_shift: String,
    reason: String,
    weight: f64,
    audit_failed: bool,
  ) -> ResolutionResult {
    let audit = AuditRow {
      key: cell_key(&self.employee.id, &self.day.date_str),
      display_name: self.employee.display_name.clone(),
      date: self.day.date_str.clone(),
      base_flag: self.base_state,
      base_shift: self.base_shift,
      derived_shift: self.shift,
      leave_category: self.leave.unwrap_or(NONE).to_string(),
      holiday_flag: self.holiday,
      entitlement_input: self.entitlement.unwrap_or(NONE).to_string(),
      final_status: status.to_string(),
      final_shift,
      reason,
      trace: self.trace.join(" > "),
      final_weight: weight,
    };
    ResolutionResult {
      employee_id: self.employee.id.clone(),
      audit,
      action,
      status,
      request: self.request,
      audit_failed,
    }
  }
}

/// A rule's shift when it can be worked: non-blank and not an OFF code.
fn adoptable_shift<'r>(ctx: &EngineContext, rule: &'r Rule) -> Option<&'r str> {
  rule
    .shift()
    .map(str::trim)
    .filter(|s| !s.is_empty() && !ctx.is_off_shift(s))
}

/// The employee's base shift, or the configured default when that is OFF.
fn fallback_shift(ctx: &EngineContext, base_shift: &str) -> String {
  if base_shift == OFF {
    ctx.config().default_shift.clone()
  } else {
    base_shift.to_string()
  }
}

/// Resolve one (employee, day) cell against `rules`, the employee's rules
/// from the context's index.
pub fn resolve_employee_day(
  employee: &Employee,
  day: &DayFact,
  ctx: &EngineContext,
  rules: &[Rule],
) -> ResolutionResult {
  let mut trace = Vec::new();

  // Base determination.
  let base_shift = if ctx.is_off_shift(&employee.base_shift) {
    OFF.to_string()
  } else {
    employee.base_shift.trim().to_string()
  };
  let base_state = if employee.is_off_day(day.day) || base_shift == OFF {
    DayState::Off
  } else {
    DayState::Work
  };
  trace.push(format!("BASE {base_state} {base_shift}"));

  let mut state = base_state;
  let mut shift = if base_state == DayState::Off {
    OFF.to_string()
  } else {
    base_shift.clone()
  };

  let active: Vec<&Rule> = rules.iter().filter(|r| r.applies_on(day)).collect();

  // Pass 1: DAY_PATTERN decides WORK/OFF.
  if let Some(rule) = select_winner(active.iter().copied().filter(|r| r.is_day_pattern())) {
    if rule.off_days().contains(&day.day) {
      state = DayState::Off;
      shift = OFF.to_string();
    } else {
      state = DayState::Work;
      match adoptable_shift(ctx, rule) {
        Some(s) => shift = s.to_string(),
        None if shift == OFF => shift = fallback_shift(ctx, &base_shift),
        None => {}
      }
    }
    trace.push(format!("DAY_PATTERN {} {state} {shift}", rule.id));
  }

  // Pass 2: SHIFT_OVERRIDE only ever changes the shift of a WORK day.
  if state == DayState::Work
    && let Some(rule) =
      select_winner(active.iter().copied().filter(|r| r.is_shift_override()))
  {
    shift = match adoptable_shift(ctx, rule) {
      Some(s) => s.to_string(),
      None => fallback_shift(ctx, &base_shift),
    };
    trace.push(format!("SHIFT_OVERRIDE {} {shift}", rule.id));
  }

  // Lookup flags.
  let holiday = ctx.is_holiday(&day.date_str);
  let leave = ctx.leave_category(&employee.id, &day.date_str);
  let entitlement = ctx.active_entitlement(&employee.id, &day.date_str);
  let request = match (leave, entitlement) {
    (Some(_), _) => RequestType::Leave,
    (None, Some((req, _))) => req,
    (None, None) => RequestType::None,
  };
  let key = LookupKey {
    base: base_state,
    rule: if state == base_state { RuleImpact::None } else { state.into() },
    holiday,
    request,
  };
  trace.push(format!("KEY {}", key.index_key()));

  let row = ctx.table().lookup(&key);
  trace.push(match row {
    Some(r) => format!("ROW {}", r.position),
    None => "ROW NONE".to_string(),
  });

  let cell = Cell {
    employee,
    day,
    base_state,
    base_shift,
    shift,
    leave,
    holiday,
    entitlement: entitlement.map(|(_, status)| status),
    request,
    trace,
  };

  let Some(row) = row else {
    tracing::warn!(
      employee = %employee.id,
      date = %day.date_str,
      key = %key.index_key(),
      "no decision row matched"
    );
    return cell.finish(
      FinalStatus::Error,
      EntitlementAction::None,
      String::new(),
      MISSING_LOGIC.to_string(),
      0.0,
      false,
    );
  };

  let status = FinalStatus::from_row(&row.final_status, leave);

  let (final_shift, weight) = match &status {
    FinalStatus::Work => {
      let weight = if ctx.is_half_day(&cell.shift) { 0.5 } else { 1.0 };
      (cell.shift.clone(), weight)
    }
    FinalStatus::CompDay => (OFF.to_string(), 1.0),
    _ => (OFF.to_string(), 0.0),
  };

  let mismatch = mirror_audit(ctx, day, rules, state, &status, &final_shift);
  if let Some(msg) = &mismatch {
    tracing::warn!(employee = %employee.id, date = %day.date_str, "{msg}");
  }
  let audit_failed = mismatch.is_some();
  let reason = mismatch.unwrap_or_else(|| row.reason.clone());

  cell.finish(status, row.action, final_shift, reason, weight, audit_failed)
}

/// Recompute the SHIFT_OVERRIDE winner from scratch and check that a WORK
/// day ended on its shift. LEAVE, COMP_DAY and OFF outcomes are exempt.
fn mirror_audit(
  ctx: &EngineContext,
  day: &DayFact,
  rules: &[Rule],
  state: DayState,
  status: &FinalStatus,
  final_shift: &str,
) -> Option<String> {
  if state != DayState::Work
    || matches!(status, FinalStatus::Leave(_) | FinalStatus::CompDay | FinalStatus::Off)
  {
    return None;
  }
  let winner = select_winner(
    rules
      .iter()
      .filter(|r| r.is_shift_override() && r.applies_on(day)),
  )?;
  // An OFF-coded override is never adopted by Pass 2, so it sets no
  // expectation on the final shift.
  let expected = adoptable_shift(ctx, winner)?;
  (final_shift != expected).then(|| {
    format!(
      "AUDIT FAIL: {} expects shift {expected}, resolved {final_shift}",
      winner.id
    )
  })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    config::EngineConfig,
    context::RunInputs,
    input::{EmployeeRecord, HolidayRecord, LeaveRecord, RawDecisionRow, RawRule},
    ledger::{Activation, LedgerDiff, LedgerEntry, LedgerManager},
  };

  const MON: &str = "2024-05-06";
  const SAT: &str = "2024-05-11";

  fn row(
    base: &str,
    rule: &str,
    holiday: &str,
    request: &str,
    status: &str,
    action: &str,
    reason: &str,
  ) -> RawDecisionRow {
    RawDecisionRow {
      base:               base.into(),
      rule_impact:        rule.into(),
      holiday_flag:       holiday.into(),
      request_type:       request.into(),
      final_status:       status.into(),
      entitlement_action: action.into(),
      reason_text:        reason.into(),
    }
  }

  fn table() -> Vec<RawDecisionRow> {
    vec![
      row("ANY", "ANY", "ANY", "LEAVE", "LEAVE", "NONE", "On leave"),
      row("WORK", "NONE", "FALSE", "COMP_DAY", "COMP_DAY", "REVOKE", "Comp day taken"),
      row("WORK", "NONE", "TRUE", "NONE", "WORK", "GRANT", "Worked holiday"),
      row("OFF", "WORK", "ANY", "NONE", "WORK", "GRANT", "Converted rest day"),
      row("WORK", "OFF", "ANY", "NONE", "OFF", "NONE", "Rule day off"),
      row("WORK", "NONE", "FALSE", "NONE", "WORK", "NONE", "Scheduled work"),
      row("OFF", "NONE", "ANY", "NONE", "OFF", "NONE", "Rest day"),
    ]
  }

  fn rule(id: &str, kind: &str, priority: i64, shift: &str) -> RawRule {
    RawRule {
      id: id.into(),
      employee_id: "E1".into(),
      kind: kind.into(),
      start_date: "2024-05-01".into(),
      end_date: "2024-05-31".into(),
      shift_value: shift.into(),
      frequency: "ALL".into(),
      approval_state: "APPROVED".into(),
      priority: priority.to_string(),
      ..RawRule::default()
    }
  }

  fn inputs() -> RunInputs {
    RunInputs {
      employees: vec![EmployeeRecord {
        id:                "e1".into(),
        display_name:      "Alice".into(),
        base_shift:        "09:00-18:00".into(),
        primary_off_day:   "SAT".into(),
        secondary_off_day: "SUN".into(),
      }],
      decision_rows: table(),
      ..RunInputs::default()
    }
  }

  fn day(s: &str) -> DayFact {
    DayFact::new(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
  }

  fn resolve(inputs: &RunInputs, date: &str) -> ResolutionResult {
    let ctx = EngineContext::build(EngineConfig::default(), inputs).unwrap();
    let employees = inputs.employees();
    let employee = &employees[0];
    resolve_employee_day(employee, &day(date), &ctx, ctx.rules_for(&employee.id))
  }

  #[test]
  fn basic_workday() {
    let r = resolve(&inputs(), MON);
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.audit.final_shift, "09:00-18:00");
    assert_eq!(r.audit.final_weight, 1.0);
    assert_eq!(r.action, EntitlementAction::None);
    assert_eq!(r.audit.key, "E1|2024-05-06");
    assert_eq!(r.audit.reason, "Scheduled work");
    assert_eq!(r.audit.leave_category, NONE);
    assert_eq!(r.audit.entitlement_input, NONE);
    assert!(!r.audit_failed);
  }

  #[test]
  fn worked_holiday_grants() {
    let mut inp = inputs();
    inp.holidays.push(HolidayRecord { date: MON.into(), name: "Spring".into() });
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.action, EntitlementAction::Grant);
    assert!(r.audit.holiday_flag);
  }

  #[test]
  fn leave_overrides_everything() {
    let mut inp = inputs();
    inp.holidays.push(HolidayRecord { date: MON.into(), name: "Spring".into() });
    inp.leaves.push(LeaveRecord {
      employee_id: "E1".into(),
      date:        MON.into(),
      category:    " Annual ".into(),
    });
    inp.rules.push(rule("SO", "SHIFT_OVERRIDE", 1, "12:00-21:00"));
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::Leave("Annual".into()));
    assert_eq!(r.audit.final_status, "Annual");
    assert_eq!(r.audit.leave_category, "Annual");
    assert_eq!(r.audit.final_shift, OFF);
    assert_eq!(r.audit.final_weight, 0.0);
    assert_eq!(r.action, EntitlementAction::None);
    assert!(!r.audit_failed);
  }

  #[test]
  fn comp_day_consumption_revokes_once() {
    let mut inp = inputs();
    inp.ledger.push(LedgerEntry {
      employee_id:      "E1".into(),
      entitlement_date: MON.into(),
      date_used:        None,
      activation:       Activation::Active,
      entitlement_type: "HOLIDAY".into(),
      final_status:     "COMP_DAY".into(),
      note:             None,
      recorded_at:      None,
    });
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::CompDay);
    assert_eq!(r.action, EntitlementAction::Revoke);
    assert_eq!(r.audit.final_shift, OFF);
    assert_eq!(r.audit.final_weight, 1.0);
    assert_eq!(r.audit.entitlement_input, "COMP_DAY");

    let now = chrono::Utc::now();
    let results = [r];
    let diff = LedgerManager::new(&inp.ledger).plan(&results, now);
    assert_eq!(diff.updates.len(), 1);
    assert_eq!(diff.apply_to(&mut inp.ledger), (0, 1));
    assert!(!inp.ledger[0].is_active());

    let replan: LedgerDiff = LedgerManager::new(&inp.ledger).plan(&results, now);
    assert!(replan.is_empty());
  }

  #[test]
  fn leave_takes_precedence_over_active_entitlement() {
    let mut inp = inputs();
    inp.leaves.push(LeaveRecord {
      employee_id: "E1".into(),
      date:        MON.into(),
      category:    "SICK".into(),
    });
    inp.ledger.push(LedgerEntry {
      employee_id:      "E1".into(),
      entitlement_date: MON.into(),
      date_used:        None,
      activation:       Activation::Active,
      entitlement_type: "HOLIDAY".into(),
      final_status:     "COMP_DAY".into(),
      note:             None,
      recorded_at:      None,
    });
    let r = resolve(&inp, MON);
    assert_eq!(r.request, RequestType::Leave);
    assert_eq!(r.audit.final_status, "SICK");
    assert_eq!(r.audit.entitlement_input, "COMP_DAY");
  }

  #[test]
  fn day_pattern_turns_workday_off() {
    let mut inp = inputs();
    let mut dp = rule("DP", "DAY_PATTERN", 1, "");
    dp.primary_off_day = "MON".into();
    inp.rules.push(dp);
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::Off);
    assert_eq!(r.audit.derived_shift, OFF);
    assert!(r.audit.trace.contains("KEY WORK|OFF|FALSE|NONE"));
  }

  #[test]
  fn day_pattern_converts_rest_day_with_base_shift_fallback() {
    let mut inp = inputs();
    inp.rules.push(rule("DP", "DAY_PATTERN", 1, "OFF"));
    let r = resolve(&inp, SAT);
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.action, EntitlementAction::Grant);
    assert_eq!(r.audit.derived_shift, "09:00-18:00");
    assert_eq!(r.audit.final_shift, "09:00-18:00");
  }

  #[test]
  fn rest_day_derives_off_shift() {
    let r = resolve(&inputs(), SAT);
    assert_eq!(r.audit.base_flag, DayState::Off);
    assert_eq!(r.audit.base_shift, "09:00-18:00");
    assert_eq!(r.audit.derived_shift, OFF);
    assert_eq!(r.status, FinalStatus::Off);
    assert!(r.audit.trace.starts_with("BASE OFF 09:00-18:00"));
  }

  #[test]
  fn day_pattern_falls_back_to_default_shift_when_base_is_off() {
    let mut inp = inputs();
    inp.employees[0].base_shift = "".into();
    inp.rules.push(rule("DP", "DAY_PATTERN", 1, ""));
    let r = resolve(&inp, MON);
    assert_eq!(r.audit.base_flag, DayState::Off);
    assert_eq!(r.audit.base_shift, OFF);
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.audit.final_shift, EngineConfig::default().default_shift);
  }

  #[test]
  fn strongest_day_pattern_wins() {
    let mut inp = inputs();
    let mut off = rule("DP-A", "DAY_PATTERN", 5, "");
    off.primary_off_day = "MON".into();
    let work = rule("DP-B", "DAY_PATTERN", 5, "07:00-16:00");
    inp.rules.extend([off, work]);
    let r = resolve(&inp, MON);
    // Equal priority; "DP-B" > "DP-A".
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.audit.final_shift, "07:00-16:00");
  }

  #[test]
  fn shift_override_changes_shift_on_workday() {
    let mut inp = inputs();
    inp.rules.push(rule("SO-1", "SHIFT_OVERRIDE", 1, "12:00-21:00"));
    inp.rules.push(rule("SO-2", "SHIFT_OVERRIDE", 3, "06:00-15:00"));
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.audit.final_shift, "06:00-15:00");
    assert_eq!(r.audit.reason, "Scheduled work");
    assert!(r.audit.trace.contains("SHIFT_OVERRIDE SO-2"));
  }

  #[test]
  fn shift_override_cannot_force_off() {
    let mut inp = inputs();
    inp.rules.push(rule("SO", "SHIFT_OVERRIDE", 9, "OFF"));
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::Work);
    assert_eq!(r.audit.final_shift, "09:00-18:00");
    assert_eq!(r.audit.reason, "Scheduled work");
    assert!(!r.audit_failed);
  }

  #[test]
  fn shift_override_ignored_on_rest_day() {
    let mut inp = inputs();
    inp.rules.push(rule("SO", "SHIFT_OVERRIDE", 1, "12:00-21:00"));
    let r = resolve(&inp, SAT);
    assert_eq!(r.status, FinalStatus::Off);
    assert_eq!(r.audit.derived_shift, OFF);
    assert_eq!(r.audit.final_shift, OFF);
    assert!(!r.audit.trace.contains("SHIFT_OVERRIDE"));
  }

  #[test]
  fn half_day_shift_weighs_half() {
    let mut inp = inputs();
    inp.rules.push(rule("SO", "SHIFT_OVERRIDE", 1, "HALF_PM"));
    let r = resolve(&inp, MON);
    assert_eq!(r.audit.final_shift, "HALF_PM");
    assert_eq!(r.audit.final_weight, 0.5);
  }

  #[test]
  fn missing_logic_is_reported_as_error_row() {
    let mut inp = inputs();
    inp.ledger.push(LedgerEntry {
      employee_id:      "E1".into(),
      entitlement_date: SAT.into(),
      date_used:        None,
      activation:       Activation::Active,
      entitlement_type: "HOLIDAY".into(),
      final_status:     "COMP_DAY".into(),
      note:             None,
      recorded_at:      None,
    });
    let r = resolve(&inp, SAT);
    assert!(r.is_error());
    assert_eq!(r.audit.final_status, ERROR);
    assert_eq!(r.audit.final_shift, "");
    assert_eq!(r.audit.reason, MISSING_LOGIC);
    assert_eq!(r.action, EntitlementAction::None);
    assert!(r.audit.trace.ends_with("ROW NONE"));
  }

  #[test]
  fn mirror_audit_flags_non_work_status_on_overridden_day() {
    let mut inp = inputs();
    inp.decision_rows.insert(
      0,
      row("WORK", "NONE", "FALSE", "NONE", "TRAINING", "NONE", "Training day"),
    );
    inp.rules.push(rule("SO", "SHIFT_OVERRIDE", 1, "12:00-21:00"));
    let r = resolve(&inp, MON);
    assert_eq!(r.status, FinalStatus::Other("TRAINING".into()));
    assert!(r.audit_failed);
    assert!(r.audit.reason.starts_with("AUDIT FAIL"));
    assert_eq!(r.audit.final_shift, OFF);
  }

  #[test]
  fn resolution_is_deterministic() {
    let mut inp = inputs();
    inp.rules.push(rule("SO-1", "SHIFT_OVERRIDE", 2, "12:00-21:00"));
    inp.rules.push(rule("SO-2", "SHIFT_OVERRIDE", 2, "13:00-22:00"));
    inp.rules.push(rule("DP", "DAY_PATTERN", 1, ""));
    let a = resolve(&inp, SAT);
    let b = resolve(&inp, SAT);
    assert_eq!(a, b);

    inp.rules.reverse();
    let c = resolve(&inp, SAT);
    assert_eq!(a, c);
    assert_eq!(c.audit.final_shift, "13:00-22:00");
  }
}
