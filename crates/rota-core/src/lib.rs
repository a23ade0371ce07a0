//! Core types and the resolution engine for the Rota scheduling ledger.
//!
//! This crate is free of HTTP and database dependencies. Every
//! (employee, day) cell is resolved by a pure function over an immutable
//! [`context::EngineContext`]; storage backends implement
//! [`store::RotaStore`] and are driven by [`run::execute_run`].

pub mod calendar;
pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod input;
pub mod ledger;
pub mod resolver;
pub mod rule;
pub mod run;
pub mod store;

pub use error::{Error, Result};

/// The literal token for a non-working shift or day.
pub const OFF: &str = "OFF";

/// Normalise an employee id: all whitespace removed, upper-cased.
pub fn normalize_id(raw: &str) -> String {
  raw
    .chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_uppercase)
    .collect()
}

/// The pipe-joined `employee|date` key used for leave, ledger and audit
/// lookups.
pub fn cell_key(employee_id: &str, date_str: &str) -> String {
  format!("{employee_id}|{date_str}")
}
