//! Application settings, layered from an optional TOML file and `ROTA_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rota_core::config::EngineConfig;
use serde::Deserialize;

/// Runtime settings for the `rota` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Processing-unit name recorded on every run.
  pub workspace:  String,
  pub engine:     EngineConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("~/.local/share/rota/rota.db"),
      workspace:  "default".to_string(),
      engine:     EngineConfig::default(),
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply `ROTA_*` overrides. Nested engine
  /// keys use a double underscore, e.g. `ROTA_ENGINE__DEFAULT_SHIFT`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ROTA")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    let mut parsed: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    parsed.store_path = expand_tilde(&parsed.store_path);
    Ok(parsed)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let s = Settings::load(Path::new("/nonexistent/rota.toml")).unwrap();
    assert_eq!(s.port, 8080);
    assert_eq!(s.engine.half_day_shifts, EngineConfig::default().half_day_shifts);
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = Path::new("/var/lib/rota.db");
    assert_eq!(expand_tilde(plain), plain);
    let odd = Path::new("data/~/rota.db");
    assert_eq!(expand_tilde(odd), odd);
  }
}
