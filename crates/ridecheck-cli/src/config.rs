//! Configuration file management for ridecheck.
//!
//! Provides a TOML config file at `~/.config/ridecheck/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ridecheck_state::config::StorageConfig;

/// Solver endpoint used when nothing else is configured.
pub const DEFAULT_SOLVER_URL: &str = "http://localhost:8080/ridecheck_generator";

/// Environment variable that overrides the solver endpoint.
pub const SOLVER_URL_ENV: &str = "RIDECHECK_SOLVER_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub solver: SolverSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SolverSection {
    pub url: Option<String>,
    /// Cap on concurrent solver requests; unset means one per day.
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub state_path: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the ridecheck config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/ridecheck` or
/// `~/.config/ridecheck`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("ridecheck");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ridecheck")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`. Returns an error if it does
/// not exist.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidecheckConfig {
    pub storage: StorageConfig,
    pub solver_url: String,
    pub max_in_flight: Option<usize>,
}

impl RidecheckConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - State path: `cli_state` > `RIDECHECK_STATE_PATH` > `storage.state_path` > data dir
    /// - Solver URL: `cli_solver_url` > `RIDECHECK_SOLVER_URL` > `solver.url` > [`DEFAULT_SOLVER_URL`]
    ///
    /// A missing config file is not an error; an unparsable one is.
    pub fn resolve(cli_state: Option<&Path>, cli_solver_url: Option<&str>) -> Result<Self> {
        let path = config_path();
        let file_config = if path.exists() {
            load_config_from(&path)?
        } else {
            ConfigFile::default()
        };

        let storage = if let Some(p) = cli_state {
            StorageConfig::new(p)
        } else if let Some(p) = std::env::var_os(StorageConfig::ENV_VAR) {
            StorageConfig::new(p)
        } else if let Some(p) = file_config.storage.state_path {
            StorageConfig::new(p)
        } else {
            StorageConfig::new(StorageConfig::default_path())
        };

        let solver_url = if let Some(url) = cli_solver_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(SOLVER_URL_ENV) {
            url
        } else if let Some(url) = file_config.solver.url {
            url
        } else {
            DEFAULT_SOLVER_URL.to_string()
        };

        Ok(Self {
            storage,
            solver_url,
            max_in_flight: file_config.solver.max_in_flight,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
