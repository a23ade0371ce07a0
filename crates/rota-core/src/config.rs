//! Engine configuration.
//!
//! Built once per run and passed by reference into every component; there is
//! no process-wide configuration state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Shift used when a DAY_PATTERN or SHIFT_OVERRIDE rule turns a day into
  /// work without naming a shift and the employee's base shift is `OFF`.
  pub default_shift:   String,
  /// The two shift codes weighted as half a day.
  pub half_day_shifts: [String; 2],
  /// Resolve cells on the rayon thread pool.
  pub parallel:        bool,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      default_shift:   "09:00-18:00".to_string(),
      half_day_shifts: ["HALF_AM".to_string(), "HALF_PM".to_string()],
      parallel:        true,
    }
  }
}
