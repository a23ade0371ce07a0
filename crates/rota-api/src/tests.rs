//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
};
use rota_core::{
  config::EngineConfig,
  input::{EmployeeRecord, HolidayRecord, RawDecisionRow},
};
use rota_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

fn decision(base: &str, holiday: &str, status: &str, action: &str) -> RawDecisionRow {
  RawDecisionRow {
    base:               base.into(),
    rule_impact:        "ANY".into(),
    holiday_flag:       holiday.into(),
    request_type:       "ANY".into(),
    final_status:       status.into(),
    entitlement_action: action.into(),
    reason_text:        status.into(),
  }
}

async fn app(with_table: bool) -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .import_employees(vec![EmployeeRecord {
      id:                "E1".into(),
      display_name:      "Alice".into(),
      base_shift:        "09:00-18:00".into(),
      primary_off_day:   "SAT".into(),
      secondary_off_day: "SUN".into(),
    }])
    .await
    .unwrap();
  if with_table {
    store
      .import_decision_rows(vec![
        decision("WORK", "TRUE", "WORK", "GRANT"),
        decision("WORK", "FALSE", "WORK", "NONE"),
        decision("OFF", "ANY", "OFF", "NONE"),
      ])
      .await
      .unwrap();
  }
  store
    .import_holidays(vec![HolidayRecord { date: "2024-05-08".into(), name: "H".into() }])
    .await
    .unwrap();

  api_router(ApiState {
    store:     Arc::new(store),
    engine:    Arc::new(EngineConfig::default()),
    workspace: Arc::from("north"),
  })
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, body)
}

fn get(uri: &str) -> Request<Body> { Request::get(uri).body(Body::empty()).unwrap() }

fn post_run(body: Value) -> Request<Body> {
  Request::post("/runs")
    .header("content-type", "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

#[tokio::test]
async fn run_is_recorded_and_browsable() {
  let app = app(true).await;

  let (status, run) = send(&app, post_run(json!({"from": "2024-05-06", "to": "2024-05-12"}))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(run["cells"], 7);
  assert_eq!(run["inserted"], 1);
  assert_eq!(run["workspace"], "north");
  assert!(run.get("audit").is_none());
  let id = run["run_id"].as_str().unwrap().to_string();

  let (status, runs) = send(&app, get("/runs")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(runs.as_array().unwrap().len(), 1);

  let (status, one) = send(&app, get(&format!("/runs/{id}"))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(one["digest"], run["digest"]);

  let (status, audit) = send(&app, get(&format!("/runs/{id}/audit"))).await;
  assert_eq!(status, StatusCode::OK);
  let rows = audit.as_array().unwrap();
  assert_eq!(rows.len(), 7);
  assert_eq!(rows[2]["key"], "E1|2024-05-08");
  assert_eq!(rows[2]["holiday_flag"], true);

  let (status, ledger) = send(&app, get("/ledger?employee_id=e1")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ledger.as_array().unwrap().len(), 1);
  assert_eq!(ledger[0]["entitlement_date"], "2024-05-08");
}

#[tokio::test]
async fn dry_run_returns_preview_without_recording() {
  let app = app(true).await;
  let (status, run) = send(
    &app,
    post_run(json!({"from": "2024-05-08", "to": "2024-05-08", "dry_run": true})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(run["dry_run"], true);
  assert_eq!(run["audit"].as_array().unwrap().len(), 1);
  assert_eq!(run["diff"]["inserts"].as_array().unwrap().len(), 1);

  let (_, runs) = send(&app, get("/runs")).await;
  assert!(runs.as_array().unwrap().is_empty());
  let (_, ledger) = send(&app, get("/ledger")).await;
  assert!(ledger.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bad_inputs_map_to_client_errors() {
  let app = app(true).await;
  let (status, body) = send(&app, post_run(json!({"from": "2024-05-12", "to": "2024-05-06"}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("after"));

  let (status, _) = send(&app, post_run(json!({"from": "later", "to": "2024-05-06"}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let missing = "/runs/00000000-0000-4000-8000-000000000000";
  let (status, _) = send(&app, get(missing)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, get(&format!("{missing}/audit"))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_decision_table_is_unprocessable() {
  let app = app(false).await;
  let (status, body) = send(&app, post_run(json!({"from": "2024-05-06", "to": "2024-05-06"}))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("decision table"));
}
