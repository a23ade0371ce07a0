//! The `RotaStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `rota-store-sqlite`).
//! Run orchestration and the HTTP layer depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  context::RunInputs,
  ledger::{LedgerDiff, LedgerEntry},
  resolver::AuditRow,
  run::RunSummary,
};

/// Parameters for [`RotaStore::list_ledger`].
#[derive(Debug, Clone, Default)]
pub struct LedgerQuery {
  /// Restrict to one employee; matched after id normalisation.
  pub employee_id:      Option<String>,
  /// If `false`, only Active entries are returned.
  pub include_inactive: bool,
}

/// Abstraction over a Rota store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RotaStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read everything a run needs in one consistent snapshot.
  fn load_snapshot(
    &self,
  ) -> impl Future<Output = Result<RunInputs, Self::Error>> + Send + '_;

  /// Apply `diff` and record the run with its ordered audit rows in a single
  /// transaction.
  ///
  /// Inserts are skipped when the `(employee_id, entitlement_date)` key
  /// already exists. Updates write only the activation state and note, and
  /// only while the entry is still Active. Returns `summary` with
  /// `inserted`/`updated` set to the rows actually written.
  fn commit_run(
    &self,
    summary: RunSummary,
    audit: Vec<AuditRow>,
    diff: LedgerDiff,
  ) -> impl Future<Output = Result<RunSummary, Self::Error>> + Send + '_;

  fn list_ledger(
    &self,
    query: LedgerQuery,
  ) -> impl Future<Output = Result<Vec<LedgerEntry>, Self::Error>> + Send + '_;

  /// Recorded runs, newest first.
  fn list_runs(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<RunSummary>, Self::Error>> + Send + '_;

  /// Retrieve a run by id. Returns `None` if not found.
  fn get_run(
    &self,
    run_id: Uuid,
  ) -> impl Future<Output = Result<Option<RunSummary>, Self::Error>> + Send + '_;

  /// The run's audit rows in resolution order.
  fn get_audit(
    &self,
    run_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AuditRow>, Self::Error>> + Send + '_;
}
