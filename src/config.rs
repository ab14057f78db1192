use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "wardboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file consulted when `WARDBOARD_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "wardboard.json";

/// Which record store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite,
}

/// Runtime settings, read from a JSON file with environment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub backend: Backend,
    pub database_path: PathBuf,
    /// Load the demo dataset into empty stores on startup.
    pub seed_demo_data: bool,
    pub refresh_interval_secs: u64,
    pub log_path: PathBuf,
    /// `tracing` filter directives; `RUST_LOG` wins when set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            database_path: PathBuf::from("wardboard.db"),
            seed_demo_data: true,
            refresh_interval_secs: 30,
            log_path: PathBuf::from("wardboard.log"),
            log_filter: default_log_filter().to_string(),
        }
    }
}

pub fn default_log_filter() -> &'static str {
    "wardboard=info"
}

impl AppConfig {
    /// Reads the config file named by `WARDBOARD_CONFIG` (or `wardboard.json`
    /// in the working directory), then applies `WARDBOARD_BACKEND` and
    /// `WARDBOARD_DB`. A missing default file just means defaults.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os("WARDBOARD_CONFIG").map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a JSON configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Applies environment overrides looked up through `var`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(backend) = var("WARDBOARD_BACKEND") {
            self.backend = serde_json::from_value(serde_json::Value::String(
                backend.trim().to_lowercase(),
            ))
            .with_context(|| format!("Unknown WARDBOARD_BACKEND value: {backend}"))?;
        }
        if let Some(path) = var("WARDBOARD_DB") {
            self.database_path = PathBuf::from(path);
        }
        Ok(())
    }

    /// The auto-refresh period as a `Duration`.
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"backend": "sqlite", "refreshIntervalSecs": 10}"#).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.refresh_interval_secs, 10);
        assert_eq!(config.database_path, PathBuf::from("wardboard.db"));
        assert!(config.seed_demo_data);
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                "WARDBOARD_BACKEND" => Some("SQLite".into()),
                "WARDBOARD_DB" => Some("/tmp/ward.db".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.database_path, PathBuf::from("/tmp/ward.db"));
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "WARDBOARD_BACKEND").then(|| "postgres".to_string())
        });
        assert!(result.is_err());
        assert_eq!(config.backend, Backend::Memory);
    }

    #[test]
    fn refresh_interval_defaults_to_thirty_seconds() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_interval(), std::time::Duration::from_secs(30));
    }
}
