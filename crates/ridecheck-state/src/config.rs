use std::path::PathBuf;

/// Storage configuration: where the state blob lives on disk.
///
/// Callers resolve the path themselves, typically from [`Self::ENV_VAR`]
/// with [`Self::default_path`] as the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Full path of the JSON state file.
    pub state_path: PathBuf,
}

impl StorageConfig {
    /// Environment variable that overrides the state file location.
    pub const ENV_VAR: &str = "RIDECHECK_STATE_PATH";

    /// File name used inside the application data directory.
    pub const FILE_NAME: &str = "state.json";

    /// Build a config from an explicit path (useful for tests and CLI flags).
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    /// `<platform data dir>/ridecheck/state.json`, or `./ridecheck/state.json`
    /// when the platform reports no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ridecheck")
            .join(Self::FILE_NAME)
    }
}
