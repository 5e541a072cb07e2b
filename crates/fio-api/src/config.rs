//! Runtime server configuration.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use fio_enrich::EnrichConfig;
use serde::Deserialize;

/// Environment variables prefixed with this override file values,
/// e.g. `FIO_PORT=9000` or `FIO_AGE_URL=https://api.agify.io`.
pub const ENV_PREFIX: &str = "FIO";

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// JSON array of seed records, loaded only into an empty table.
  pub seed_path:           Option<PathBuf>,
  pub age_url:             String,
  pub gender_url:          String,
  pub ethnicity_url:       String,
  /// Timeout for each enrichment request. Unset means no timeout.
  pub enrich_timeout_secs: Option<u64>,
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("fio.db") }

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `FIO_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn enrich_config(&self) -> EnrichConfig {
    let config = EnrichConfig::new(
      self.age_url.clone(),
      self.gender_url.clone(),
      self.ethnicity_url.clone(),
    );
    match self.enrich_timeout_secs {
      Some(secs) => config.with_timeout(Duration::from_secs(secs)),
      None => config,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loads_file_and_applies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
      &path,
      r#"
age_url = "https://api.agify.io"
gender_url = "https://api.genderize.io"
ethnicity_url = "https://api.nationalize.io"
enrich_timeout_secs = 5
"#,
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    assert_eq!(cfg.store_path, PathBuf::from("fio.db"));
    assert!(cfg.seed_path.is_none());

    let enrich = cfg.enrich_config();
    assert_eq!(enrich.age_url, "https://api.agify.io");
    assert_eq!(enrich.timeout, Some(Duration::from_secs(5)));
  }

  #[test]
  fn missing_service_urls_are_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 9000\n").unwrap();

    assert!(ServerConfig::load(&path).is_err());
  }
}
