//! Handlers for `/runs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/runs` | Body: `{"from":"2024-05-01","to":"2024-05-31","dry_run":false}` |
//! | `GET`  | `/runs` | Newest first; optional `?limit=N` |
//! | `GET`  | `/runs/{id}` | 404 if not found |
//! | `GET`  | `/runs/{id}/audit` | Audit rows in resolution order; 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  ledger::LedgerDiff,
  resolver::AuditRow,
  run::{RunRequest, RunSummary, execute_run},
  store::RotaStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub from:    String,
  pub to:      String,
  #[serde(default)]
  pub dry_run: bool,
}

/// Response of `POST /runs`. A dry run is not recorded, so its audit rows
/// and planned ledger diff are returned inline.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
  #[serde(flatten)]
  pub summary: RunSummary,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub audit:   Option<Vec<AuditRow>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diff:    Option<LedgerDiff>,
}

/// `POST /runs`
pub async fn create<S: RotaStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let request = RunRequest {
    from:      body.from,
    to:        body.to,
    workspace: state.workspace.to_string(),
    dry_run:   body.dry_run,
  };
  let outcome = execute_run(state.store.as_ref(), &state.engine, &request).await?;

  if request.dry_run {
    let response = CreateResponse {
      summary: outcome.summary,
      audit:   Some(outcome.audit),
      diff:    Some(outcome.diff),
    };
    Ok((StatusCode::OK, Json(response)))
  } else {
    let response = CreateResponse { summary: outcome.summary, audit: None, diff: None };
    Ok((StatusCode::CREATED, Json(response)))
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /runs[?limit=<n>]`
pub async fn list<S: RotaStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RunSummary>>, ApiError> {
  let runs = state
    .store
    .list_runs(params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(runs))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

async fn find_run<S: RotaStore>(state: &ApiState<S>, id: Uuid) -> Result<RunSummary, ApiError> {
  state
    .store
    .get_run(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("run {id}")))
}

/// `GET /runs/{id}`
pub async fn get_one<S: RotaStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RunSummary>, ApiError> {
  Ok(Json(find_run(&state, id).await?))
}

/// `GET /runs/{id}/audit`
pub async fn audit<S: RotaStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AuditRow>>, ApiError> {
  find_run(&state, id).await?;
  let rows = state
    .store
    .get_audit(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}
