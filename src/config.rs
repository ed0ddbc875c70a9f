//! Application configuration from environment variables, plus an optional
//! TOML catalog override (academic years per semester).
//!
//! See `AppConfig` and `CatalogConfig` for the expected schema.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

/// Catalog knobs that change once a year: which academic year each semester
/// belongs to. Grade keys are built from these (e.g. "一年級\n114上學期").
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogConfig {
  #[serde(default = "default_upper_year")]
  pub upper_year: String,
  #[serde(default = "default_lower_year")]
  pub lower_year: String,
}

fn default_upper_year() -> String {
  "114".to_string()
}

fn default_lower_year() -> String {
  "113".to_string()
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self { upper_year: default_upper_year(), lower_year: default_lower_year() }
  }
}

/// Attempt to load `CatalogConfig` from CATALOG_CONFIG_PATH. On any
/// parsing/IO error, returns None and the defaults apply.
pub fn load_catalog_from_env() -> Option<CatalogConfig> {
  let path = std::env::var("CATALOG_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<CatalogConfig>(&s) {
      Ok(cfg) => {
        info!(target: "xizuo_backend", %path, "Loaded catalog config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "xizuo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "xizuo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
  /// Local data root, also served statically at `/data`.
  pub data_dir: PathBuf,
  /// When set, data files are fetched from this HTTP base URL instead of
  /// the local directory.
  pub data_base_url: Option<String>,
  pub catalog: CatalogConfig,
}

impl AppConfig {
  pub fn from_env() -> Self {
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let data_base_url = std::env::var("DATA_BASE_URL").ok().filter(|s| !s.is_empty());
    let catalog = load_catalog_from_env().unwrap_or_default();
    Self { data_dir: PathBuf::from(data_dir), data_base_url, catalog }
  }
}
