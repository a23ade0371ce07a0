//! Run orchestration: snapshot, resolve, plan, commit.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
  Error, Result,
  calendar::{DayFact, days_between, parse_date},
  config::EngineConfig,
  context::EngineContext,
  input::Employee,
  ledger::{LedgerDiff, LedgerManager},
  resolver::{AuditRow, ResolutionResult, resolve_employee_day},
  store::RotaStore,
};

/// Parameters for one run over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
  pub from:      String,
  pub to:        String,
  /// Processing-unit name recorded on the run.
  #[serde(default)]
  pub workspace: String,
  /// Plan only: nothing is written to the store.
  #[serde(default)]
  pub dry_run:   bool,
}

/// The recorded header of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
  pub run_id:         Uuid,
  pub workspace:      String,
  pub started_at:     DateTime<Utc>,
  pub from:           String,
  pub to:             String,
  pub employees:      usize,
  pub cells:          usize,
  /// Cells with no matching decision row.
  pub errors:         usize,
  pub audit_failures: usize,
  /// Planned inserts.
  pub grants:         usize,
  /// Planned deactivations.
  pub revokes:        usize,
  /// Ledger rows actually inserted by the commit.
  pub inserted:       usize,
  /// Ledger rows actually deactivated by the commit.
  pub updated:        usize,
  /// SHA-256 over the ordered audit rows, hex-encoded.
  pub digest:         String,
  pub dry_run:        bool,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
  pub summary: RunSummary,
  pub audit:   Vec<AuditRow>,
  pub diff:    LedgerDiff,
}

/// Resolve every cell of the unit, employee-major then date order. The
/// output order is the same whether or not the work runs in parallel.
pub fn resolve_unit(
  ctx: &EngineContext,
  employees: &[Employee],
  days: &[DayFact],
) -> Vec<ResolutionResult> {
  if ctx.config().parallel {
    employees
      .par_iter()
      .flat_map_iter(|e| employee_row(ctx, e, days))
      .collect()
  } else {
    employees
      .iter()
      .flat_map(|e| employee_row(ctx, e, days))
      .collect()
  }
}

fn employee_row<'a>(
  ctx: &'a EngineContext,
  employee: &'a Employee,
  days: &'a [DayFact],
) -> impl Iterator<Item = ResolutionResult> + 'a {
  let rules = ctx.rules_for(&employee.id);
  days
    .iter()
    .map(move |day| resolve_employee_day(employee, day, ctx, rules))
}

/// Stable fingerprint of an audit table.
pub fn digest(rows: &[AuditRow]) -> String {
  let mut hasher = Sha256::new();
  for row in rows {
    for (i, field) in row.fields().iter().enumerate() {
      if i > 0 {
        hasher.update(b"\t");
      }
      hasher.update(field.as_bytes());
    }
    hasher.update(b"\n");
  }
  hex::encode(hasher.finalize())
}

fn parse_bound(raw: &str) -> Result<chrono::NaiveDate> {
  parse_date(raw).ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

/// Execute one run against `store`.
///
/// Fails before any cell is resolved if the range is invalid or the decision
/// table is empty. Cells are resolved on tokio's blocking pool, so this must
/// be awaited inside a tokio runtime. Ledger changes and the run record are committed together;
/// a dry run commits nothing.
pub async fn execute_run<S: RotaStore>(
  store: &S,
  config: &EngineConfig,
  request: &RunRequest,
) -> Result<RunOutcome> {
  let started_at = Utc::now();
  let from = parse_bound(&request.from)?;
  let to = parse_bound(&request.to)?;
  let days = days_between(from, to)?;

  let inputs = store.load_snapshot().await.map_err(store_err)?;
  let ctx = EngineContext::build(config.clone(), &inputs)?;
  let employees = inputs.employees();
  let employee_count = employees.len();
  let from = days.first().map(|d| d.date_str.clone()).unwrap_or_default();
  let to = days.last().map(|d| d.date_str.clone()).unwrap_or_default();

  // Resolution is CPU-bound; keep it off the async worker threads.
  let results =
    tokio::task::spawn_blocking(move || resolve_unit(&ctx, &employees, &days)).await?;
  let diff = LedgerManager::new(&inputs.ledger).plan(&results, Utc::now());

  let errors = results.iter().filter(|r| r.is_error()).count();
  let audit_failures = results.iter().filter(|r| r.audit_failed).count();
  let audit: Vec<AuditRow> = results.into_iter().map(|r| r.audit).collect();

  let summary = RunSummary {
    run_id: Uuid::new_v4(),
    workspace: request.workspace.clone(),
    started_at,
    from,
    to,
    employees: employee_count,
    cells: audit.len(),
    errors,
    audit_failures,
    grants: diff.inserts.len(),
    revokes: diff.updates.len(),
    inserted: 0,
    updated: 0,
    digest: digest(&audit),
    dry_run: request.dry_run,
  };

  let summary = if request.dry_run {
    summary
  } else {
    store
      .commit_run(summary, audit.clone(), diff.clone())
      .await
      .map_err(store_err)?
  };

  tracing::info!(
    run = %summary.run_id,
    workspace = %summary.workspace,
    from = %summary.from,
    to = %summary.to,
    cells = summary.cells,
    errors = summary.errors,
    audit_failures = summary.audit_failures,
    inserted = summary.inserted,
    updated = summary.updated,
    dry_run = summary.dry_run,
    "run complete"
  );

  Ok(RunOutcome { summary, audit, diff })
}
