//! SQL schema for the Rota SQLite store.
//!
//! Input tables keep the raw text of each imported record; typing and
//! validation happen in the engine. `position` preserves import order,
//! which the decision table and duplicate-employee handling depend on.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    position          INTEGER PRIMARY KEY,
    employee_id       TEXT NOT NULL,
    display_name      TEXT NOT NULL DEFAULT '',
    base_shift        TEXT NOT NULL DEFAULT '',
    primary_off_day   TEXT NOT NULL DEFAULT '',
    secondary_off_day TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS rules (
    position          INTEGER PRIMARY KEY,
    rule_id           TEXT NOT NULL,
    employee_id       TEXT NOT NULL,
    kind              TEXT NOT NULL,
    start_date        TEXT NOT NULL DEFAULT '',
    end_date          TEXT NOT NULL DEFAULT '',
    shift_value       TEXT NOT NULL DEFAULT '',
    primary_off_day   TEXT NOT NULL DEFAULT '',
    secondary_off_day TEXT NOT NULL DEFAULT '',
    frequency         TEXT NOT NULL DEFAULT '',
    approval_state    TEXT NOT NULL DEFAULT '',
    priority          TEXT NOT NULL DEFAULT ''
);

-- Row order is significant: the first matching row wins.
CREATE TABLE IF NOT EXISTS decision_rows (
    position           INTEGER PRIMARY KEY,
    base               TEXT NOT NULL DEFAULT '',
    rule_impact        TEXT NOT NULL DEFAULT '',
    holiday_flag       TEXT NOT NULL DEFAULT '',
    request_type       TEXT NOT NULL DEFAULT '',
    final_status       TEXT NOT NULL DEFAULT '',
    entitlement_action TEXT NOT NULL DEFAULT '',
    reason_text        TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS holidays (
    position INTEGER PRIMARY KEY,
    date     TEXT NOT NULL,
    name     TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS leaves (
    position    INTEGER PRIMARY KEY,
    employee_id TEXT NOT NULL,
    date        TEXT NOT NULL,
    category    TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS shift_statuses (
    position INTEGER PRIMARY KEY,
    shift    TEXT NOT NULL,
    status   TEXT NOT NULL
);

-- One entry per (employee, entitlement date). Rows are never deleted by a
-- run; revocation flips activation_state and writes note.
CREATE TABLE IF NOT EXISTS ledger (
    employee_id      TEXT NOT NULL,   -- normalised
    entitlement_date TEXT NOT NULL,   -- YYYY-MM-DD
    date_used        TEXT,
    activation_state TEXT NOT NULL,   -- 'Active' | 'Inactive'
    entitlement_type TEXT NOT NULL DEFAULT '',
    final_status     TEXT NOT NULL DEFAULT '',
    note             TEXT,
    recorded_at      TEXT,            -- RFC 3339 UTC
    PRIMARY KEY (employee_id, entitlement_date)
);

CREATE TABLE IF NOT EXISTS runs (
    run_id         TEXT PRIMARY KEY,
    workspace      TEXT NOT NULL,
    started_at     TEXT NOT NULL,
    from_date      TEXT NOT NULL,
    to_date        TEXT NOT NULL,
    employees      INTEGER NOT NULL,
    cells          INTEGER NOT NULL,
    errors         INTEGER NOT NULL,
    audit_failures INTEGER NOT NULL,
    grants         INTEGER NOT NULL,
    revokes        INTEGER NOT NULL,
    inserted       INTEGER NOT NULL,
    updated        INTEGER NOT NULL,
    digest         TEXT NOT NULL,
    dry_run        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_rows (
    run_id            TEXT NOT NULL REFERENCES runs(run_id),
    seq               INTEGER NOT NULL,
    cell_key          TEXT NOT NULL,
    display_name      TEXT NOT NULL,
    date              TEXT NOT NULL,
    base_flag         TEXT NOT NULL,
    base_shift        TEXT NOT NULL,
    derived_shift     TEXT NOT NULL,
    leave_category    TEXT NOT NULL,
    holiday_flag      INTEGER NOT NULL,
    entitlement_input TEXT NOT NULL,
    final_status      TEXT NOT NULL,
    final_shift       TEXT NOT NULL,
    reason            TEXT NOT NULL,
    trace             TEXT NOT NULL,
    final_weight      REAL NOT NULL,
    PRIMARY KEY (run_id, seq)
);

CREATE INDEX IF NOT EXISTS ledger_active_idx  ON ledger(activation_state);
CREATE INDEX IF NOT EXISTS runs_started_idx   ON runs(started_at);

PRAGMA user_version = 1;
";
