//! Override rules and the per-employee rule index.
//!
//! Raw rule rows are filtered to approved, well-formed rules, typed, grouped
//! by employee and sorted into a stable evaluation order. The winner of any
//! competing set is chosen separately by [`select_winner`].

use std::{
  cmp::Ordering,
  collections::{BTreeSet, HashMap},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  calendar::{DayCode, DayFact, parse_date},
  input::RawRule,
  normalize_id,
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// Which weekdays a rule applies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum Frequency {
  All,
  Days(BTreeSet<DayCode>),
}

impl Frequency {
  /// `""` and `"ALL"` mean every day; otherwise day codes or ranges such
  /// as `MON-FRI`, separated by commas, semicolons or whitespace. A list
  /// with no recognisable code falls back to every day.
  pub fn parse(raw: &str) -> Self {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("ALL") {
      return Self::All;
    }
    let days: BTreeSet<DayCode> = s
      .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
      .filter(|tok| !tok.is_empty())
      .flat_map(|tok| {
        let days = parse_day_token(tok);
        if days.is_empty() {
          tracing::debug!(token = tok, "ignoring unknown frequency token");
        }
        days
      })
      .collect();
    if days.is_empty() { Self::All } else { Self::Days(days) }
  }

  pub fn includes(&self, day: DayCode) -> bool {
    match self {
      Self::All => true,
      Self::Days(days) => days.contains(&day),
    }
  }

  pub fn is_all(&self) -> bool { matches!(self, Self::All) }
}

/// The two rule kinds. A SHIFT_OVERRIDE always carries a non-empty shift;
/// rows without one never become a [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
  /// May turn a day into WORK or OFF.
  DayPattern {
    shift:    Option<String>,
    off_days: Vec<DayCode>,
  },
  /// May only change the shift of a day that is already WORK.
  ShiftOverride { shift: String },
}

/// A time-bounded, approved override for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  pub id:          String,
  pub employee_id: String,
  pub start:       NaiveDate,
  pub end:         NaiveDate,
  pub frequency:   Frequency,
  pub priority:    i64,
  pub kind:        RuleKind,
}

impl Rule {
  /// Type a raw row. Returns `None` for unapproved rows, rows without a
  /// valid start date, unknown kinds, and SHIFT_OVERRIDE rows whose shift is
  /// blank.
  pub fn from_raw(raw: &RawRule) -> Option<Self> {
    if !raw.approval_state.to_uppercase().contains("APPROVED") {
      return None;
    }

    let Some(start) = parse_date(&raw.start_date) else {
      tracing::debug!(rule = %raw.id, "dropping rule without a valid start date");
      return None;
    };
    let end = parse_date(&raw.end_date).unwrap_or(start);

    let shift = raw.shift_value.trim();
    let kind = match normalize_kind(&raw.kind).as_str() {
      "DAY_PATTERN" => RuleKind::DayPattern {
        shift:    (!shift.is_empty()).then(|| shift.to_string()),
        off_days: [&raw.primary_off_day, &raw.secondary_off_day]
          .into_iter()
          .filter_map(|d| DayCode::parse_loose(d))
          .collect(),
      },
      "SHIFT_OVERRIDE" if shift.is_empty() => {
        tracing::debug!(rule = %raw.id, "dropping SHIFT_OVERRIDE without a shift");
        return None;
      }
      "SHIFT_OVERRIDE" => RuleKind::ShiftOverride { shift: shift.to_string() },
      other => {
        tracing::debug!(rule = %raw.id, kind = other, "dropping rule of unknown kind");
        return None;
      }
    };

    Some(Self {
      id: raw.id.trim().to_string(),
      employee_id: normalize_id(&raw.employee_id),
      start,
      end,
      frequency: Frequency::parse(&raw.frequency),
      priority: raw.priority.trim().parse().unwrap_or(0),
      kind,
    })
  }

  pub fn is_day_pattern(&self) -> bool {
    matches!(self.kind, RuleKind::DayPattern { .. })
  }

  pub fn is_shift_override(&self) -> bool {
    matches!(self.kind, RuleKind::ShiftOverride { .. })
  }

  /// The rule's shift value, if it names one.
  pub fn shift(&self) -> Option<&str> {
    match &self.kind {
      RuleKind::DayPattern { shift, .. } => shift.as_deref(),
      RuleKind::ShiftOverride { shift } => Some(shift),
    }
  }

  /// Declared off days; always empty for SHIFT_OVERRIDE.
  pub fn off_days(&self) -> &[DayCode] {
    match &self.kind {
      RuleKind::DayPattern { off_days, .. } => off_days,
      RuleKind::ShiftOverride { .. } => &[],
    }
  }

  /// A SHIFT_OVERRIDE must name a non-blank shift. The type already
  /// guarantees it for rules built by [`Rule::from_raw`]; rules constructed
  /// by hand are checked again here.
  pub fn is_sane(&self) -> bool {
    match &self.kind {
      RuleKind::DayPattern { .. } => true,
      RuleKind::ShiftOverride { shift } => !shift.trim().is_empty(),
    }
  }

  /// Active on `day`: within `[start, end]`, scheduled for that weekday, and
  /// sane.
  pub fn applies_on(&self, day: &DayFact) -> bool {
    self.start <= day.date
      && day.date <= self.end
      && self.frequency.includes(day.day)
      && self.is_sane()
  }

  /// Authoritative strength: higher priority wins, then the
  /// lexicographically greater id.
  pub fn strength_cmp(&self, other: &Self) -> Ordering {
    self
      .priority
      .cmp(&other.priority)
      .then_with(|| self.id.cmp(&other.id))
  }
}

/// A single day code or an inclusive `START-END` range.
fn parse_day_token(tok: &str) -> Vec<DayCode> {
  match tok.split_once('-') {
    Some((start, end)) => match (DayCode::parse_loose(start), DayCode::parse_loose(end)) {
      (Some(start), Some(end)) => start.through(end),
      _ => Vec::new(),
    },
    None => DayCode::parse_loose(tok).into_iter().collect(),
  }
}

fn normalize_kind(raw: &str) -> String {
  raw
    .trim()
    .to_uppercase()
    .chars()
    .map(|c| if c == ' ' || c == '-' { '_' } else { c })
    .collect()
}

/// Pick the strongest rule by [`Rule::strength_cmp`]; `None` when empty.
pub fn select_winner<'a, I>(rules: I) -> Option<&'a Rule>
where
  I: IntoIterator<Item = &'a Rule>,
{
  rules.into_iter().max_by(|a, b| a.strength_cmp(b))
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Approved rules grouped by employee, each list in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
  by_employee: HashMap<String, Vec<Rule>>,
}

impl RuleIndex {
  pub fn build(rows: &[RawRule]) -> Self {
    let mut by_employee: HashMap<String, Vec<Rule>> = HashMap::new();
    let mut dropped = 0usize;

    for raw in rows {
      match Rule::from_raw(raw) {
        Some(rule) => by_employee
          .entry(rule.employee_id.clone())
          .or_default()
          .push(rule),
        None => dropped += 1,
      }
    }

    for rules in by_employee.values_mut() {
      rules.sort_by(evaluation_order);
    }

    tracing::debug!(
      employees = by_employee.len(),
      dropped,
      "rule index built"
    );
    Self { by_employee }
  }

  /// The employee's rules in evaluation order; empty when none.
  pub fn rules_for(&self, employee_id: &str) -> &[Rule] {
    self
      .by_employee
      .get(employee_id)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Total number of indexed rules.
  pub fn len(&self) -> usize { self.by_employee.values().map(Vec::len).sum() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// DAY_PATTERN before SHIFT_OVERRIDE, weekday-limited before ALL, higher
/// priority first, greater id first.
fn evaluation_order(a: &Rule, b: &Rule) -> Ordering {
  let kind_rank = |r: &Rule| u8::from(r.is_shift_override());
  let freq_rank = |r: &Rule| u8::from(r.frequency.is_all());

  kind_rank(a)
    .cmp(&kind_rank(b))
    .then_with(|| freq_rank(a).cmp(&freq_rank(b)))
    .then_with(|| b.priority.cmp(&a.priority))
    .then_with(|| b.id.cmp(&a.id))
}
