//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use rota_core::{
  config::EngineConfig,
  input::{EmployeeRecord, HolidayRecord, LeaveRecord, RawDecisionRow, RawRule},
  ledger::{Activation, LedgerDiff, LedgerEntry, LedgerKey, LedgerUpdate, NOTE_CONSUMED},
  run::{RunRequest, RunSummary, execute_run},
  store::{LedgerQuery, RotaStore},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn entry(emp: &str, date: &str, activation: Activation) -> LedgerEntry {
  LedgerEntry {
    employee_id: emp.into(),
    entitlement_date: date.into(),
    date_used: Some("2024-06-01".into()),
    activation,
    entitlement_type: "HOLIDAY".into(),
    final_status: "COMP_DAY".into(),
    note: None,
    recorded_at: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
  }
}

fn summary(cells: usize) -> RunSummary {
  RunSummary {
    run_id: Uuid::new_v4(),
    workspace: "north".into(),
    started_at: Utc::now(),
    from: "2024-05-06".into(),
    to: "2024-05-12".into(),
    employees: 1,
    cells,
    errors: 0,
    audit_failures: 0,
    grants: 0,
    revokes: 0,
    inserted: 0,
    updated: 0,
    digest: "00".into(),
    dry_run: false,
  }
}

fn decision(
  base: &str,
  rule: &str,
  holiday: &str,
  request: &str,
  status: &str,
  action: &str,
) -> RawDecisionRow {
  RawDecisionRow {
    base:               base.into(),
    rule_impact:        rule.into(),
    holiday_flag:       holiday.into(),
    request_type:       request.into(),
    final_status:       status.into(),
    entitlement_action: action.into(),
    reason_text:        format!("{status}/{action}"),
  }
}

async fn seed(s: &SqliteStore) {
  s.import_employees(vec![EmployeeRecord {
    id:                "e1".into(),
    display_name:      "Alice".into(),
    base_shift:        "09:00-18:00".into(),
    primary_off_day:   "SAT".into(),
    secondary_off_day: "SUN".into(),
  }])
  .await
  .unwrap();
  s.import_decision_rows(vec![
    decision("ANY", "ANY", "ANY", "LEAVE", "LEAVE", "NONE"),
    decision("WORK", "NONE", "FALSE", "COMP_DAY", "COMP_DAY", "REVOKE"),
    decision("WORK", "NONE", "TRUE", "NONE", "WORK", "GRANT"),
    decision("WORK", "ANY", "FALSE", "NONE", "WORK", "NONE"),
    decision("OFF", "ANY", "ANY", "ANY", "OFF", "NONE"),
  ])
  .await
  .unwrap();
  s.import_holidays(vec![HolidayRecord { date: "2024-05-08".into(), name: "Mid-week".into() }])
    .await
    .unwrap();
}

// ─── Imports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn imports_round_trip_through_snapshot_in_order() {
  let s = store().await;
  seed(&s).await;
  s.import_rules(vec![
    RawRule { id: "B".into(), employee_id: "E1".into(), ..RawRule::default() },
    RawRule { id: "A".into(), employee_id: "E1".into(), ..RawRule::default() },
  ])
  .await
  .unwrap();
  s.import_leaves(vec![LeaveRecord {
    employee_id: "E1".into(),
    date:        "2024-05-09".into(),
    category:    "SICK".into(),
  }])
  .await
  .unwrap();

  let snap = s.load_snapshot().await.unwrap();
  assert_eq!(snap.employees.len(), 1);
  assert_eq!(snap.employees[0].display_name, "Alice");
  assert_eq!(snap.decision_rows.len(), 5);
  assert_eq!(snap.decision_rows[0].request_type, "LEAVE");
  assert_eq!(snap.decision_rows[4].base, "OFF");
  let rule_ids: Vec<&str> = snap.rules.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(rule_ids, ["B", "A"]);
  assert_eq!(snap.leaves[0].category, "SICK");
  assert_eq!(snap.holidays[0].date, "2024-05-08");
}

#[tokio::test]
async fn import_replaces_previous_contents() {
  let s = store().await;
  seed(&s).await;
  let n = s
    .import_holidays(vec![
      HolidayRecord { date: "2024-12-25".into(), name: "A".into() },
      HolidayRecord { date: "2024-12-26".into(), name: "B".into() },
    ])
    .await
    .unwrap();
  assert_eq!(n, 2);
  let snap = s.load_snapshot().await.unwrap();
  assert_eq!(snap.holidays.len(), 2);
  assert_eq!(snap.holidays[0].date, "2024-12-25");
}

#[tokio::test]
async fn import_ledger_normalises_and_keeps_first_duplicate() {
  let s = store().await;
  let mut second = entry("E1", "2024-05-06", Activation::Inactive);
  second.note = Some("dup".into());
  let written = s
    .import_ledger(vec![entry(" e1", "2024/05/06", Activation::Active), second])
    .await
    .unwrap();
  assert_eq!(written, 1);

  let ledger = s
    .list_ledger(LedgerQuery { include_inactive: true, ..LedgerQuery::default() })
    .await
    .unwrap();
  assert_eq!(ledger.len(), 1);
  assert_eq!(ledger[0].employee_id, "E1");
  assert_eq!(ledger[0].entitlement_date, "2024-05-06");
  assert!(ledger[0].is_active());
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_ledger_filters_by_employee_and_activation() {
  let s = store().await;
  s.import_ledger(vec![
    entry("E1", "2024-05-06", Activation::Active),
    entry("E1", "2024-05-07", Activation::Inactive),
    entry("E2", "2024-05-06", Activation::Active),
  ])
  .await
  .unwrap();

  let active = s.list_ledger(LedgerQuery::default()).await.unwrap();
  assert_eq!(active.len(), 2);

  let e1_all = s
    .list_ledger(LedgerQuery { employee_id: Some("e 1".into()), include_inactive: true })
    .await
    .unwrap();
  assert_eq!(e1_all.len(), 2);
  assert!(e1_all.iter().all(|e| e.employee_id == "E1"));
}

#[tokio::test]
async fn commit_is_idempotent_and_column_scoped() {
  let s = store().await;
  s.import_ledger(vec![entry("E1", "2024-05-06", Activation::Active)])
    .await
    .unwrap();

  let diff = LedgerDiff {
    inserts: vec![
      entry("E1", "2024-05-06", Activation::Active),
      entry("E2", "2024-05-08", Activation::Active),
    ],
    updates: vec![LedgerUpdate {
      key:        LedgerKey::new("E1", "2024-05-06"),
      activation: Activation::Inactive,
      note:       NOTE_CONSUMED.into(),
    }],
  };

  let first = s
    .commit_run(summary(0), vec![], diff.clone())
    .await
    .unwrap();
  assert_eq!((first.inserted, first.updated), (1, 1));

  let second = s.commit_run(summary(0), vec![], diff).await.unwrap();
  assert_eq!((second.inserted, second.updated), (0, 0));

  let ledger = s
    .list_ledger(LedgerQuery { include_inactive: true, ..LedgerQuery::default() })
    .await
    .unwrap();
  assert_eq!(ledger.len(), 2);
  let revoked = &ledger[0];
  assert!(!revoked.is_active());
  assert_eq!(revoked.note.as_deref(), Some(NOTE_CONSUMED));
  // Untouched columns survive the update.
  assert_eq!(revoked.date_used.as_deref(), Some("2024-06-01"));
  assert_eq!(revoked.entitlement_type, "HOLIDAY");
  assert_eq!(revoked.final_status, "COMP_DAY");
  assert_eq!(revoked.recorded_at, Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
}

// ─── Runs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn runs_are_listed_newest_first_and_fetchable() {
  let s = store().await;
  let mut older = summary(0);
  older.started_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
  let newer = summary(0);
  s.commit_run(older.clone(), vec![], LedgerDiff::default())
    .await
    .unwrap();
  s.commit_run(newer.clone(), vec![], LedgerDiff::default())
    .await
    .unwrap();

  let runs = s.list_runs(None).await.unwrap();
  assert_eq!(runs.len(), 2);
  assert_eq!(runs[0].run_id, newer.run_id);
  assert_eq!(s.list_runs(Some(1)).await.unwrap().len(), 1);

  let fetched = s.get_run(older.run_id).await.unwrap().unwrap();
  assert_eq!(fetched, older);
  assert!(s.get_run(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn audit_of_unknown_run_is_an_error() {
  let s = store().await;
  let err = s.get_audit(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::RunNotFound(_)));
}

// ─── End to end ──────────────────────────────────────────────────────────────

fn request(from: &str, to: &str) -> RunRequest {
  RunRequest {
    from:      from.into(),
    to:        to.into(),
    workspace: "north".into(),
    dry_run:   false,
  }
}

#[tokio::test]
async fn worked_holiday_grant_is_recorded_once() {
  let s = store().await;
  seed(&s).await;
  let config = EngineConfig::default();

  let first = execute_run(&s, &config, &request("2024-05-06", "2024-05-12"))
    .await
    .unwrap();
  assert_eq!(first.summary.cells, 7);
  assert_eq!(first.summary.errors, 0);
  assert_eq!(first.summary.inserted, 1);

  let audit = s.get_audit(first.summary.run_id).await.unwrap();
  assert_eq!(audit, first.audit);
  assert_eq!(audit[2].key, "E1|2024-05-08");
  assert!(audit[2].holiday_flag);

  let ledger = s.list_ledger(LedgerQuery::default()).await.unwrap();
  assert_eq!(ledger.len(), 1);
  assert_eq!(ledger[0].entitlement_date, "2024-05-08");
  assert_eq!(ledger[0].final_status, "COMP_DAY");
  assert_eq!(ledger[0].entitlement_type, "HOLIDAY");

  // The second run sees the entitlement as a COMP_DAY request on the
  // holiday, which the table does not cover.
  let second = execute_run(&s, &config, &request("2024-05-06", "2024-05-12"))
    .await
    .unwrap();
  assert_eq!(second.summary.inserted, 0);
  assert_eq!(second.summary.errors, 1);
  assert_eq!(s.list_runs(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn comp_day_is_consumed_exactly_once() {
  let s = store().await;
  seed(&s).await;
  s.import_ledger(vec![entry("E1", "2024-05-07", Activation::Active)])
    .await
    .unwrap();
  let config = EngineConfig::default();

  let first = execute_run(&s, &config, &request("2024-05-07", "2024-05-07"))
    .await
    .unwrap();
  assert_eq!(first.audit[0].final_status, "COMP_DAY");
  assert_eq!(first.audit[0].final_weight, 1.0);
  assert_eq!(first.summary.updated, 1);

  let ledger = s
    .list_ledger(LedgerQuery { include_inactive: true, ..LedgerQuery::default() })
    .await
    .unwrap();
  assert!(!ledger[0].is_active());
  assert_eq!(ledger[0].note.as_deref(), Some(NOTE_CONSUMED));

  // Inactive now, so the day resolves as ordinary work and nothing changes.
  let second = execute_run(&s, &config, &request("2024-05-07", "2024-05-07"))
    .await
    .unwrap();
  assert_eq!(second.audit[0].final_status, "WORK");
  assert_eq!(second.summary.updated, 0);
}

#[tokio::test]
async fn empty_decision_table_fails_and_records_nothing() {
  let s = store().await;
  let err = execute_run(&s, &EngineConfig::default(), &request("2024-05-06", "2024-05-06"))
    .await
    .unwrap_err();
  assert!(matches!(err, rota_core::Error::EmptyDecisionTable));
  assert!(s.list_runs(None).await.unwrap().is_empty());
}
