//! Configuration management for JobTrack

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default backend location, matching the API's development server
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the JobTrack API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Username of the last successful login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Session lifetime settings
    #[serde(default)]
    pub session: SessionSettings,
}

/// Session lifetime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Lead time before access-token expiry at which renewal is attempted
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_secs: u64,

    /// Idle time after which the session is ended instead of renewed
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_secs: u64,

    /// Minimum spacing between two recorded activity updates
    #[serde(default = "default_activity_throttle")]
    pub activity_throttle_secs: u64,

    /// Lifetime of the access-token cookie
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_days: u64,

    /// Directory holding the cookie jar and local storage database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_refresh_threshold() -> u64 {
    5 * 60
}

fn default_inactivity_timeout() -> u64 {
    30 * 60
}

fn default_activity_throttle() -> u64 {
    5
}

fn default_access_token_ttl() -> u64 {
    1
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            refresh_threshold_secs: default_refresh_threshold(),
            inactivity_timeout_secs: default_inactivity_timeout(),
            activity_throttle_secs: default_activity_throttle(),
            access_token_ttl_days: default_access_token_ttl(),
            data_dir: None,
        }
    }
}

impl SessionSettings {
    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    pub fn activity_throttle(&self) -> Duration {
        Duration::from_secs(self.activity_throttle_secs)
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_days * 24 * 60 * 60)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            username: None,
            request_timeout_secs: default_request_timeout(),
            session: SessionSettings::default(),
        }
    }
}

impl Config {
    /// Get the JobTrack home directory (~/.jobtrack)
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(".jobtrack"))
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.yaml"))
    }

    /// Resolve an optional override into a concrete config path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional path, falling back to defaults
    /// when the file does not exist yet.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to an optional path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Directory for the cookie jar and local storage database
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("JOBTRACK_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }
        match &self.session.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::home_dir(),
        }
    }

    /// Replace the API URL with a runtime override
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.validate()?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https:// (got '{}')",
                self.api_url
            ))
            .into());
        }
        if self.session.inactivity_timeout_secs == 0 {
            return Err(
                ConfigError::Invalid("session.inactivity_timeout_secs must be > 0".into()).into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert!(config.username.is_none());
        assert_eq!(config.session.refresh_threshold(), Duration::from_secs(300));
        assert_eq!(config.session.inactivity_timeout(), Duration::from_secs(1800));
        assert_eq!(config.session.activity_throttle(), Duration::from_secs(5));
        assert_eq!(config.session.access_token_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent.yaml");
        let config = Config::load_at(path.to_str()).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "api_url: https://jobs.example.com\nsession:\n  inactivity_timeout_secs: 600\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://jobs.example.com");
        assert_eq!(config.session.inactivity_timeout_secs, 600);
        assert_eq!(config.session.refresh_threshold_secs, 300);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "api_url: localhost:8000\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_api_url_override() {
        let config = Config::default()
            .with_api_url("https://jobs.example.com/")
            .unwrap();
        assert_eq!(config.api_url, "https://jobs.example.com");

        assert!(Config::default().with_api_url("localhost:8000").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let config = Config {
            username: Some("alice".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.username.as_deref(), Some("alice"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
