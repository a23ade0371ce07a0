//! [`SqliteStore`], the SQLite implementation of [`RotaStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rota_core::{
  context::RunInputs,
  input::{
    EmployeeRecord, HolidayRecord, LeaveRecord, RawDecisionRow, RawRule, ShiftStatusRecord,
  },
  ledger::{Activation, LedgerDiff, LedgerEntry},
  normalize_id,
  resolver::AuditRow,
  run::RunSummary,
  store::{LedgerQuery, RotaStore},
};

use crate::{
  Error, Result,
  encode::{
    RUN_COLUMNS, RawAuditRow, RawLedgerEntry, RawRun, encode_activation, encode_count,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

const LEDGER_COLUMNS: &str = "employee_id, entitlement_date, date_used, activation_state, \
                              entitlement_type, final_status, note, recorded_at";

const INSERT_LEDGER: &str = "INSERT INTO ledger (employee_id, entitlement_date, date_used, \
                             activation_state, entitlement_type, final_status, note, recorded_at)
   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
   ON CONFLICT (employee_id, entitlement_date) DO NOTHING";

fn ledger_params(e: &LedgerEntry) -> [Option<String>; 8] {
  [
    Some(e.employee_id.clone()),
    Some(e.entitlement_date.clone()),
    e.date_used.clone(),
    Some(encode_activation(e.activation)),
    Some(e.entitlement_type.clone()),
    Some(e.final_status.clone()),
    e.note.clone(),
    e.recorded_at.map(encode_dt),
  ]
}

fn raw_ledger(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLedgerEntry> {
  Ok(RawLedgerEntry {
    employee_id:      row.get(0)?,
    entitlement_date: row.get(1)?,
    date_used:        row.get(2)?,
    activation_state: row.get(3)?,
    entitlement_type: row.get(4)?,
    final_status:     row.get(5)?,
    note:             row.get(6)?,
    recorded_at:      row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rota store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Imports ───────────────────────────────────────────────────────────────

  /// Replace the contents of an input table in one transaction. Rows keep
  /// their order through the `position` column.
  async fn replace_rows(
    &self,
    table: &'static str,
    columns: &'static [&'static str],
    rows: Vec<Vec<String>>,
  ) -> Result<usize> {
    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
          let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
          let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
          ))?;
          for row in &rows {
            stmt.execute(rusqlite::params_from_iter(row))?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::info!(table, rows = count, "table imported");
    Ok(count)
  }

  pub async fn import_employees(&self, records: Vec<EmployeeRecord>) -> Result<usize> {
    let rows = records
      .into_iter()
      .map(|r| vec![r.id, r.display_name, r.base_shift, r.primary_off_day, r.secondary_off_day])
      .collect();
    self
      .replace_rows(
        "employees",
        &["employee_id", "display_name", "base_shift", "primary_off_day", "secondary_off_day"],
        rows,
      )
      .await
  }

  pub async fn import_rules(&self, records: Vec<RawRule>) -> Result<usize> {
    let rows = records
      .into_iter()
      .map(|r| {
        vec![
          r.id,
          r.employee_id,
          r.kind,
          r.start_date,
          r.end_date,
          r.shift_value,
          r.primary_off_day,
          r.secondary_off_day,
          r.frequency,
          r.approval_state,
          r.priority,
        ]
      })
      .collect();
    self
      .replace_rows(
        "rules",
        &[
          "rule_id",
          "employee_id",
          "kind",
          "start_date",
          "end_date",
          "shift_value",
          "primary_off_day",
          "secondary_off_day",
          "frequency",
          "approval_state",
          "priority",
        ],
        rows,
      )
      .await
  }

  pub async fn import_decision_rows(&self, records: Vec<RawDecisionRow>) -> Result<usize> {
    let rows = records
      .into_iter()
      .map(|r| {
        vec![
          r.base,
          r.rule_impact,
          r.holiday_flag,
          r.request_type,
          r.final_status,
          r.entitlement_action,
          r.reason_text,
        ]
      })
      .collect();
    self
      .replace_rows(
        "decision_rows",
        &[
          "base",
          "rule_impact",
          "holiday_flag",
          "request_type",
          "final_status",
          "entitlement_action",
          "reason_text",
        ],
        rows,
      )
      .await
  }

  pub async fn import_holidays(&self, records: Vec<HolidayRecord>) -> Result<usize> {
    let rows = records.into_iter().map(|r| vec![r.date, r.name]).collect();
    self.replace_rows("holidays", &["date", "name"], rows).await
  }

  pub async fn import_leaves(&self, records: Vec<LeaveRecord>) -> Result<usize> {
    let rows = records
      .into_iter()
      .map(|r| vec![r.employee_id, r.date, r.category])
      .collect();
    self
      .replace_rows("leaves", &["employee_id", "date", "category"], rows)
      .await
  }

  pub async fn import_shift_statuses(&self, records: Vec<ShiftStatusRecord>) -> Result<usize> {
    let rows = records.into_iter().map(|r| vec![r.shift, r.status]).collect();
    self
      .replace_rows("shift_statuses", &["shift", "status"], rows)
      .await
  }

  /// Replace the ledger. Entries are normalised first; when two share a key
  /// the first one is kept.
  pub async fn import_ledger(&self, entries: Vec<LedgerEntry>) -> Result<usize> {
    let entries: Vec<LedgerEntry> = entries.into_iter().map(LedgerEntry::normalized).collect();
    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM ledger", [])?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(INSERT_LEDGER)?;
          for e in &entries {
            written += stmt.execute(rusqlite::params_from_iter(ledger_params(e)))?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::info!(table = "ledger", rows = count, "table imported");
    Ok(count)
  }
}

// ─── RotaStore impl ──────────────────────────────────────────────────────────

impl RotaStore for SqliteStore {
  type Error = Error;

  async fn load_snapshot(&self) -> Result<RunInputs> {
    let (mut inputs, raw_ledger) = self
      .conn
      .call(|conn| {
        // One read transaction so every table comes from the same state.
        let tx = conn.transaction()?;

        let employees = tx
          .prepare(
            "SELECT employee_id, display_name, base_shift, primary_off_day, secondary_off_day
             FROM employees ORDER BY position",
          )?
          .query_map([], |row| {
            Ok(EmployeeRecord {
              id:                row.get(0)?,
              display_name:      row.get(1)?,
              base_shift:        row.get(2)?,
              primary_off_day:   row.get(3)?,
              secondary_off_day: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let rules = tx
          .prepare(
            "SELECT rule_id, employee_id, kind, start_date, end_date, shift_value,
                    primary_off_day, secondary_off_day, frequency, approval_state, priority
             FROM rules ORDER BY position",
          )?
          .query_map([], |row| {
            Ok(RawRule {
              id:                row.get(0)?,
              employee_id:       row.get(1)?,
              kind:              row.get(2)?,
              start_date:        row.get(3)?,
              end_date:          row.get(4)?,
              shift_value:       row.get(5)?,
              primary_off_day:   row.get(6)?,
              secondary_off_day: row.get(7)?,
              frequency:         row.get(8)?,
              approval_state:    row.get(9)?,
              priority:          row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let decision_rows = tx
          .prepare(
            "SELECT base, rule_impact, holiday_flag, request_type, final_status,
                    entitlement_action, reason_text
             FROM decision_rows ORDER BY position",
          )?
          .query_map([], |row| {
            Ok(RawDecisionRow {
              base:               row.get(0)?,
              rule_impact:        row.get(1)?,
              holiday_flag:       row.get(2)?,
              request_type:       row.get(3)?,
              final_status:       row.get(4)?,
              entitlement_action: row.get(5)?,
              reason_text:        row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let holidays = tx
          .prepare("SELECT date, name FROM holidays ORDER BY position")?
          .query_map([], |row| Ok(HolidayRecord { date: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let leaves = tx
          .prepare("SELECT employee_id, date, category FROM leaves ORDER BY position")?
          .query_map([], |row| {
            Ok(LeaveRecord {
              employee_id: row.get(0)?,
              date:        row.get(1)?,
              category:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let shift_statuses = tx
          .prepare("SELECT shift, status FROM shift_statuses ORDER BY position")?
          .query_map([], |row| {
            Ok(ShiftStatusRecord { shift: row.get(0)?, status: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let ledger = tx
          .prepare(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger ORDER BY employee_id, entitlement_date"
          ))?
          .query_map([], raw_ledger)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        tx.commit()?;

        let inputs = RunInputs {
          employees,
          rules,
          decision_rows,
          holidays,
          leaves,
          shift_statuses,
          ledger: Vec::new(),
        };
        Ok((inputs, ledger))
      })
      .await?;

    inputs.ledger = raw_ledger
      .into_iter()
      .map(RawLedgerEntry::into_entry)
      .collect::<Result<_>>()?;

    tracing::debug!(
      employees = inputs.employees.len(),
      rules = inputs.rules.len(),
      decision_rows = inputs.decision_rows.len(),
      ledger = inputs.ledger.len(),
      "snapshot loaded"
    );
    Ok(inputs)
  }

  async fn commit_run(
    &self,
    mut summary: RunSummary,
    audit: Vec<AuditRow>,
    diff: LedgerDiff,
  ) -> Result<RunSummary> {
    let run_id_str = encode_uuid(summary.run_id);
    let started_at_str = encode_dt(summary.started_at);
    let header = summary.clone();
    let inactive = encode_activation(Activation::Inactive);
    let active = encode_activation(Activation::Active);

    let (inserted, updated) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let mut inserted = 0usize;
        {
          let mut stmt = tx.prepare(INSERT_LEDGER)?;
          for e in &diff.inserts {
            inserted += stmt.execute(rusqlite::params_from_iter(ledger_params(e)))?;
          }
        }

        // Column-scoped: only activation_state and note, only while Active.
        let mut updated = 0usize;
        {
          let mut stmt = tx.prepare(
            "UPDATE ledger SET activation_state = ?1, note = ?2
             WHERE employee_id = ?3 AND entitlement_date = ?4 AND activation_state = ?5",
          )?;
          for u in &diff.updates {
            let activation = if u.activation == Activation::Inactive { &inactive } else { &active };
            updated += stmt.execute(rusqlite::params![
              activation,
              u.note,
              u.key.employee_id,
              u.key.date,
              active,
            ])?;
          }
        }

        tx.execute(
          &format!(
            "INSERT INTO runs ({RUN_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
          ),
          rusqlite::params![
            run_id_str,
            header.workspace,
            started_at_str,
            header.from,
            header.to,
            encode_count(header.employees),
            encode_count(header.cells),
            encode_count(header.errors),
            encode_count(header.audit_failures),
            encode_count(header.grants),
            encode_count(header.revokes),
            encode_count(inserted),
            encode_count(updated),
            header.digest,
            header.dry_run,
          ],
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO audit_rows (run_id, seq, cell_key, display_name, date, base_flag,
               base_shift, derived_shift, leave_category, holiday_flag, entitlement_input,
               final_status, final_shift, reason, trace, final_weight)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
          )?;
          for (seq, row) in audit.iter().enumerate() {
            stmt.execute(rusqlite::params![
              run_id_str,
              encode_count(seq),
              row.key,
              row.display_name,
              row.date,
              row.base_flag.to_string(),
              row.base_shift,
              row.derived_shift,
              row.leave_category,
              row.holiday_flag,
              row.entitlement_input,
              row.final_status,
              row.final_shift,
              row.reason,
              row.trace,
              row.final_weight,
            ])?;
          }
        }

        tx.commit()?;
        Ok((inserted, updated))
      })
      .await?;

    summary.inserted = inserted;
    summary.updated = updated;
    tracing::info!(
      run = %summary.run_id,
      inserted,
      updated,
      audit_rows = summary.cells,
      "ledger diff applied and run recorded"
    );
    Ok(summary)
  }

  async fn list_ledger(&self, query: LedgerQuery) -> Result<Vec<LedgerEntry>> {
    let employee = query.employee_id.as_deref().map(normalize_id);
    let include_inactive = query.include_inactive;
    let active = encode_activation(Activation::Active);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LEDGER_COLUMNS} FROM ledger
           WHERE (?1 IS NULL OR employee_id = ?1)
             AND (?2 OR activation_state = ?3)
           ORDER BY employee_id, entitlement_date"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![employee, include_inactive, active], raw_ledger)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLedgerEntry::into_entry).collect()
  }

  async fn list_runs(&self, limit: Option<usize>) -> Result<Vec<RunSummary>> {
    // SQLite treats a negative LIMIT as unbounded.
    let limit_val = limit.map_or(-1, encode_count);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RUN_COLUMNS} FROM runs ORDER BY started_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawRun::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRun::into_summary).collect()
  }

  async fn get_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
    let id_str = encode_uuid(run_id);

    let raw = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!("SELECT {RUN_COLUMNS} FROM runs WHERE run_id = ?1"),
            rusqlite::params![id_str],
            RawRun::from_row,
          )
          .optional()?;
        Ok(row)
      })
      .await?;

    raw.map(RawRun::into_summary).transpose()
  }

  async fn get_audit(&self, run_id: Uuid) -> Result<Vec<AuditRow>> {
    let id_str = encode_uuid(run_id);

    let raws = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT run_id FROM runs WHERE run_id = ?1",
            rusqlite::params![id_str],
            |row| row.get::<_, String>(0),
          )
          .optional()?;
        let Some(found) = exists else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT cell_key, display_name, date, base_flag, base_shift, derived_shift,
                  leave_category, holiday_flag, entitlement_input, final_status,
                  final_shift, reason, trace, final_weight
           FROM audit_rows WHERE run_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![found], |row| {
            Ok(RawAuditRow {
              cell_key:          row.get(0)?,
              display_name:      row.get(1)?,
              date:              row.get(2)?,
              base_flag:         row.get(3)?,
              base_shift:        row.get(4)?,
              derived_shift:     row.get(5)?,
              leave_category:    row.get(6)?,
              holiday_flag:      row.get(7)?,
              entitlement_input: row.get(8)?,
              final_status:      row.get(9)?,
              final_shift:       row.get(10)?,
              reason:            row.get(11)?,
              trace:             row.get(12)?,
              final_weight:      row.get(13)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .ok_or(Error::RunNotFound(run_id))?
      .into_iter()
      .map(RawAuditRow::into_audit)
      .collect()
  }
}
