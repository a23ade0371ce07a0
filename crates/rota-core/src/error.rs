//! Error types for `rota-core`.
//!
//! Per-cell resolution problems are never errors; they come back as data on
//! [`crate::resolver::ResolutionResult`]. These variants cover run-level
//! preconditions and store failures only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("decision table has no usable rows")]
  EmptyDecisionTable,

  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("invalid range: {from} is after {to}")]
  InvalidRange { from: String, to: String },

  #[error("resolution task failed: {0}")]
  Resolve(#[from] tokio::task::JoinError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
