//! Layered configuration for tomes.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults,
//! 2. a configuration file (explicit path, or `tomes.{toml,yaml,yml,json}`
//!    in the platform configuration directory),
//! 3. environment variables prefixed with `TOMES_`, using `__` to reach
//!    nested keys (`TOMES_INDICATORS__CRITICAL_STOCK_MAX=3`).
//!
//! Command-line overrides are applied by the binary on top of the result.

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, Result};

const ENV_PREFIX: &str = "TOMES_";
const FILE_STEM: &str = "tomes";
const EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite catalog database.
    pub database: PathBuf,
    /// Category given to records that arrive without one.
    pub default_category: String,
    pub indicators: IndicatorConfig,
    /// Tracing filter directive, e.g. `info` or `tomes_ingest=debug`.
    pub log: String,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_category: "Uncategorized".to_string(),
            indicators: IndicatorConfig::default(),
            log: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Lowest rating (1 to 5) counted as well rated.
    pub well_rated_min: u8,
    /// Highest stock quantity counted as critical.
    pub critical_stock_max: u64,
}
impl Default for IndicatorConfig {
    fn default() -> Self {
        Self { well_rated_min: 4, critical_stock_max: 5 }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", FILE_STEM)
}

fn default_database() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join("tomes.db"),
        None => PathBuf::from("tomes.db"),
    }
}

fn file_provider(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

impl Config {
    /// Build the layered [`Figment`] without extracting it.
    ///
    /// With an explicit path, that file must exist. Without one, the first
    /// `tomes.*` file found in the platform configuration directory is used,
    /// if any.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = file_provider(figment, path)?;
            },
            None => {
                let found = project_dirs().and_then(|dirs| {
                    EXTENSIONS
                        .iter()
                        .map(|ext| dirs.config_dir().join(format!("{FILE_STEM}.{ext}")))
                        .find(|candidate| candidate.is_file())
                });
                if let Some(path) = found {
                    tracing::debug!(path = %path.display(), "using configuration file");
                    figment = file_provider(figment, &path)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate the configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(explicit)?)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.indicators.well_rated_min) {
            exn::bail!(ErrorKind::Invalid {
                key: "indicators.well_rated_min",
                reason: format!("{} is not a rating between 1 and 5", self.indicators.well_rated_min),
            });
        }
        if self.default_category.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                key: "default_category",
                reason: "must not be blank".to_string(),
            });
        }
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                key: "database",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
