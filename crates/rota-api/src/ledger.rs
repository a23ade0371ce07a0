//! Handlers for `/ledger`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ledger` | Optional `?employee_id=E1&include_inactive=true` |

use axum::{
  Json,
  extract::{Query, State},
};
use rota_core::{
  ledger::LedgerEntry,
  store::{LedgerQuery, RotaStore},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub employee_id:      Option<String>,
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /ledger[?employee_id=<id>][&include_inactive=<bool>]`
pub async fn list<S: RotaStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
  let entries = state
    .store
    .list_ledger(LedgerQuery {
      employee_id:      params.employee_id.filter(|id| !id.trim().is_empty()),
      include_inactive: params.include_inactive,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}
