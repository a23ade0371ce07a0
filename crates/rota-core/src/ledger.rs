//! The entitlement ledger and its grant/revoke planner.
//!
//! [`LedgerManager`] never mutates the ledger. It turns a unit's batch of
//! grant/revoke intents into a [`LedgerDiff`]: rows to insert when absent,
//! and column-scoped updates (activation state and note only) for rows that
//! are still Active. Re-planning against the diffed ledger yields an empty
//! diff.

use std::{
  collections::{HashMap, HashSet},
  fmt,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  calendar::canonicalize,
  decision::{EntitlementAction, RequestType},
  input::cell,
  normalize_id,
  resolver::{FinalStatus, ResolutionResult},
};

/// Status written on granted entries.
pub const COMP_DAY: &str = "COMP_DAY";

pub const NOTE_CONSUMED: &str = "Comp Day Consumed";
pub const NOTE_REVOKED: &str = "Revoked: Work/Rule Change";

// ─── Entries ─────────────────────────────────────────────────────────────────

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
pub enum Activation {
  #[default]
  Active,
  Inactive,
}

/// Identifies a ledger entry: normalised employee id plus entitlement date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
  pub employee_id: String,
  pub date:        String,
}

impl LedgerKey {
  /// Normalises the employee id and canonicalises the date when it parses.
  pub fn new(employee_id: &str, date: &str) -> Self {
    Self {
      employee_id: normalize_id(employee_id),
      date:        canonicalize(date).unwrap_or_else(|| date.trim().to_string()),
    }
  }
}

impl fmt::Display for LedgerKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}|{}", self.employee_id, self.date)
  }
}

/// One entitlement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
  #[serde(deserialize_with = "cell")]
  pub employee_id:      String,
  #[serde(deserialize_with = "cell")]
  pub entitlement_date: String,
  #[serde(default)]
  pub date_used:        Option<String>,
  #[serde(default)]
  pub activation:       Activation,
  #[serde(default, deserialize_with = "cell")]
  pub entitlement_type: String,
  /// `COMP_DAY`, the legacy `OFF`, or a consumed marker.
  #[serde(default, deserialize_with = "cell")]
  pub final_status:     String,
  #[serde(default)]
  pub note:             Option<String>,
  #[serde(default)]
  pub recorded_at:      Option<DateTime<Utc>>,
}

impl LedgerEntry {
  pub fn key(&self) -> LedgerKey {
    LedgerKey::new(&self.employee_id, &self.entitlement_date)
  }

  pub fn is_active(&self) -> bool { self.activation == Activation::Active }

  /// The request type an Active entry implies for its day, if any.
  pub fn implied_request(&self) -> Option<RequestType> {
    if !self.is_active() {
      return None;
    }
    match self.final_status.trim().to_uppercase().as_str() {
      "COMP_DAY" => Some(RequestType::CompDay),
      "OFF" => Some(RequestType::Off),
      _ => None,
    }
  }

  /// Same entry with normalised id and canonical date.
  pub fn normalized(mut self) -> Self {
    let key = self.key();
    self.employee_id = key.employee_id;
    self.entitlement_date = key.date;
    self
  }
}

// ─── Intents ─────────────────────────────────────────────────────────────────

/// Where a granted entitlement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantSource {
  Holiday,
  OffDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantIntent {
  pub employee_id: String,
  pub date:        String,
  pub source:      GrantSource,
  pub reason:      String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeReason {
  /// The entitlement was taken as a comp day.
  CompDay,
  /// The day that earned it is no longer a qualifying workday.
  WorkOrRuleChange,
}

impl RevokeReason {
  pub fn note(self) -> &'static str {
    match self {
      Self::CompDay => NOTE_CONSUMED,
      Self::WorkOrRuleChange => NOTE_REVOKED,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeIntent {
  pub employee_id: String,
  pub date:        String,
  pub reason:      RevokeReason,
}

/// Split a unit's results into grant and revoke intents, in result order.
pub fn collect_intents(
  results: &[ResolutionResult],
) -> (Vec<GrantIntent>, Vec<RevokeIntent>) {
  let mut grants = Vec::new();
  let mut revokes = Vec::new();

  for r in results {
    match r.action {
      EntitlementAction::Grant => grants.push(GrantIntent {
        employee_id: r.employee_id.clone(),
        date:        r.audit.date.clone(),
        source:      if r.audit.holiday_flag {
          GrantSource::Holiday
        } else {
          GrantSource::OffDay
        },
        reason:      r.audit.reason.clone(),
      }),
      EntitlementAction::Revoke => revokes.push(RevokeIntent {
        employee_id: r.employee_id.clone(),
        date:        r.audit.date.clone(),
        reason:      if r.status == FinalStatus::CompDay {
          RevokeReason::CompDay
        } else {
          RevokeReason::WorkOrRuleChange
        },
      }),
      EntitlementAction::None => {}
    }
  }

  (grants, revokes)
}

// ─── Diff ────────────────────────────────────────────────────────────────────

/// A column-scoped change to an existing Active entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerUpdate {
  pub key:        LedgerKey,
  pub activation: Activation,
  pub note:       String,
}

/// The write-set for one processing unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerDiff {
  /// New entries; insert only if the key is absent.
  pub inserts: Vec<LedgerEntry>,
  /// Apply only while the keyed entry is still Active.
  pub updates: Vec<LedgerUpdate>,
}

impl LedgerDiff {
  pub fn is_empty(&self) -> bool { self.inserts.is_empty() && self.updates.is_empty() }

  /// Apply to an in-memory ledger with the same semantics a store must
  /// provide. Returns `(inserted, updated)`.
  pub fn apply_to(&self, ledger: &mut Vec<LedgerEntry>) -> (usize, usize) {
    let mut present: HashSet<LedgerKey> = ledger.iter().map(LedgerEntry::key).collect();
    let mut inserted = 0;
    for entry in &self.inserts {
      if present.insert(entry.key()) {
        ledger.push(entry.clone());
        inserted += 1;
      }
    }

    let mut updated = 0;
    for update in &self.updates {
      if let Some(entry) = ledger
        .iter_mut()
        .find(|e| e.is_active() && e.key() == update.key)
      {
        entry.activation = update.activation;
        entry.note = Some(update.note.clone());
        updated += 1;
      }
    }
    (inserted, updated)
  }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Plans idempotent ledger mutations against a snapshot.
#[derive(Debug, Clone, Default)]
pub struct LedgerManager {
  /// Every key present in the snapshot, mapped to whether any entry under
  /// it is Active.
  keys: HashMap<LedgerKey, bool>,
}

impl LedgerManager {
  pub fn new(snapshot: &[LedgerEntry]) -> Self {
    let mut keys: HashMap<LedgerKey, bool> = HashMap::new();
    for entry in snapshot {
      *keys.entry(entry.key()).or_default() |= entry.is_active();
    }
    Self { keys }
  }

  /// Stage a new Active COMP_DAY entry for each key not already in the
  /// ledger, active or not. Duplicate intents collapse to one entry.
  pub fn grant(&self, intents: &[GrantIntent], now: DateTime<Utc>) -> Vec<LedgerEntry> {
    let mut staged: HashSet<LedgerKey> = HashSet::new();
    let mut out = Vec::new();

    for intent in intents {
      let key = LedgerKey::new(&intent.employee_id, &intent.date);
      if self.keys.contains_key(&key) || !staged.insert(key.clone()) {
        continue;
      }
      out.push(LedgerEntry {
        employee_id:      key.employee_id,
        entitlement_date: key.date,
        date_used:        None,
        activation:       Activation::Active,
        entitlement_type: intent.source.to_string(),
        final_status:     COMP_DAY.to_string(),
        note:             Some(format!("Granted: {}", intent.reason)),
        recorded_at:      Some(now),
      });
    }
    out
  }

  /// Stage deactivation of each keyed entry that is currently Active.
  /// Inactive or unknown keys are no-ops.
  pub fn revoke(&self, intents: &[RevokeIntent]) -> Vec<LedgerUpdate> {
    let mut staged: HashSet<LedgerKey> = HashSet::new();
    let mut out = Vec::new();

    for intent in intents {
      let key = LedgerKey::new(&intent.employee_id, &intent.date);
      if self.keys.get(&key) != Some(&true) || !staged.insert(key.clone()) {
        continue;
      }
      out.push(LedgerUpdate {
        key,
        activation: Activation::Inactive,
        note: intent.reason.note().to_string(),
      });
    }
    out
  }

  /// The full diff for a unit's resolved batch.
  pub fn plan(&self, results: &[ResolutionResult], now: DateTime<Utc>) -> LedgerDiff {
    let (grants, revokes) = collect_intents(results);
    let diff = LedgerDiff {
      inserts: self.grant(&grants, now),
      updates: self.revoke(&revokes),
    };
    tracing::debug!(
      grant_intents = grants.len(),
      revoke_intents = revokes.len(),
      inserts = diff.inserts.len(),
      updates = diff.updates.len(),
      "ledger diff planned"
    );
    diff
  }
}
