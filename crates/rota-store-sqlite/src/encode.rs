//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, enums by their display names, counts as integers.

use chrono::{DateTime, Utc};
use rota_core::{
  decision::DayState,
  ledger::{Activation, LedgerEntry},
  resolver::AuditRow,
  run::RunSummary,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn encode_activation(a: Activation) -> String { a.to_string() }

pub fn decode_activation(s: &str) -> Result<Activation> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "activation_state",
    value:  s.to_owned(),
  })
}

fn decode_day_state(s: &str) -> Result<DayState> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "base_flag",
    value:  s.to_owned(),
  })
}

// ─── Counts ───────────────────────────────────────────────────────────────────

pub fn encode_count(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn decode_count(n: i64) -> usize { usize::try_from(n).unwrap_or(0) }

// ─── Raw row types ────────────────────────────────────────────────────────────

/// A `ledger` row as read from SQLite, before decoding.
pub struct RawLedgerEntry {
  pub employee_id:      String,
  pub entitlement_date: String,
  pub date_used:        Option<String>,
  pub activation_state: String,
  pub entitlement_type: String,
  pub final_status:     String,
  pub note:             Option<String>,
  pub recorded_at:      Option<String>,
}

impl RawLedgerEntry {
  pub fn into_entry(self) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
      employee_id:      self.employee_id,
      entitlement_date: self.entitlement_date,
      date_used:        self.date_used,
      activation:       decode_activation(&self.activation_state)?,
      entitlement_type: self.entitlement_type,
      final_status:     self.final_status,
      note:             self.note,
      recorded_at:      self.recorded_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// A `runs` row as read from SQLite, before decoding.
pub struct RawRun {
  pub run_id:         String,
  pub workspace:      String,
  pub started_at:     String,
  pub from_date:      String,
  pub to_date:        String,
  pub employees:      i64,
  pub cells:          i64,
  pub errors:         i64,
  pub audit_failures: i64,
  pub grants:         i64,
  pub revokes:        i64,
  pub inserted:       i64,
  pub updated:        i64,
  pub digest:         String,
  pub dry_run:        bool,
}

/// Column list matching the field order of [`RawRun`].
pub const RUN_COLUMNS: &str = "run_id, workspace, started_at, from_date, to_date, employees, \
                               cells, errors, audit_failures, grants, revokes, inserted, \
                               updated, digest, dry_run";

impl RawRun {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:         row.get(0)?,
      workspace:      row.get(1)?,
      started_at:     row.get(2)?,
      from_date:      row.get(3)?,
      to_date:        row.get(4)?,
      employees:      row.get(5)?,
      cells:          row.get(6)?,
      errors:         row.get(7)?,
      audit_failures: row.get(8)?,
      grants:         row.get(9)?,
      revokes:        row.get(10)?,
      inserted:       row.get(11)?,
      updated:        row.get(12)?,
      digest:         row.get(13)?,
      dry_run:        row.get(14)?,
    })
  }

  pub fn into_summary(self) -> Result<RunSummary> {
    Ok(RunSummary {
      run_id:         decode_uuid(&self.run_id)?,
      workspace:      self.workspace,
      started_at:     decode_dt(&self.started_at)?,
      from:           self.from_date,
      to:             self.to_date,
      employees:      decode_count(self.employees),
      cells:          decode_count(self.cells),
      errors:         decode_count(self.errors),
      audit_failures: decode_count(self.audit_failures),
      grants:         decode_count(self.grants),
      revokes:        decode_count(self.revokes),
      inserted:       decode_count(self.inserted),
      updated:        decode_count(self.updated),
      digest:         self.digest,
      dry_run:        self.dry_run,
    })
  }
}

/// An `audit_rows` row as read from SQLite, before decoding.
pub struct RawAuditRow {
  pub cell_key:          String,
  pub display_name:      String,
  pub date:              String,
  pub base_flag:         String,
  pub base_shift:        String,
  pub derived_shift:     String,
  pub leave_category:    String,
  pub holiday_flag:      bool,
  pub entitlement_input: String,
  pub final_status:      String,
  pub final_shift:       String,
  pub reason:            String,
  pub trace:             String,
  pub final_weight:      f64,
}

impl RawAuditRow {
  pub fn into_audit(self) -> Result<AuditRow> {
    Ok(AuditRow {
      key:               self.cell_key,
      display_name:      self.display_name,
      date:              self.date,
      base_flag:         decode_day_state(&self.base_flag)?,
      base_shift:        self.base_shift,
      derived_shift:     self.derived_shift,
      leave_category:    self.leave_category,
      holiday_flag:      self.holiday_flag,
      entitlement_input: self.entitlement_input,
      final_status:      self.final_status,
      final_shift:       self.final_shift,
      reason:            self.reason,
      trace:             self.trace,
      final_weight:      self.final_weight,
    })
  }
}
