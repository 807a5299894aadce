//! Error types for the JobTrack CLI

use thiserror::Error;

/// Result type alias for JobTrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not logged in. Run `jobtrack login` to sign in.")]
    Unauthorized,

    #[error("Session expired. Run `jobtrack login` to sign in again.")]
    SessionExpired,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Access token is malformed or has no expiry")]
    InvalidToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Could not determine home directory")]
    NoHome,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Token storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Token storage I/O error: {0}")]
    Io(String),

    #[error("Token database error: {0}")]
    Database(String),

    #[error("Corrupt token storage entry: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("jobtrack login"));
    }

    #[test]
    fn test_api_error_session_expired_message() {
        let err = ApiError::SessionExpired;
        let msg = err.to_string();
        assert!(msg.contains("Session expired"));
        assert!(msg.contains("jobtrack login"));
    }

    #[test]
    fn test_api_error_auth_failed() {
        let err = ApiError::AuthFailed("Incorrect username or password".to_string());
        assert!(err.to_string().contains("Incorrect username"));
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::NotFound("Application abc-123".to_string());
        assert!(err.to_string().contains("abc-123"));
    }

    #[test]
    fn test_api_error_bad_request() {
        let err = ApiError::BadRequest("Invalid status".to_string());
        assert!(err.to_string().contains("Invalid status"));
    }

    #[test]
    fn test_api_error_network() {
        let err = ApiError::Network("Connection refused".to_string());
        assert!(err.to_string().contains("Connection refused"));
    }

    #[test]
    fn test_config_error_parse() {
        let err = ConfigError::ParseError("unexpected key".to_string());
        assert!(err.to_string().contains("unexpected key"));
    }

    #[test]
    fn test_storage_error_from_rusqlite() {
        let err: StorageError = rusqlite::Error::InvalidQuery.into();
        match err {
            StorageError::Database(_) => (),
            _ => panic!("Expected StorageError::Database"),
        }
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::SessionExpired.into();

        match err {
            Error::Api(ApiError::SessionExpired) => (),
            _ => panic!("Expected Error::Api(ApiError::SessionExpired)"),
        }
    }

    #[test]
    fn test_error_from_storage_error() {
        let err: Error = StorageError::Corrupt("cookie".to_string()).into();

        match err {
            Error::Storage(StorageError::Corrupt(_)) => (),
            _ => panic!("Expected Error::Storage(StorageError::Corrupt)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
