use crate::config::ConfigError;

use thiserror::Error;

/// Result type alias for lumen-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared by every Lumen crate
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (missing credential, invalid config file)
    #[error("configuration error: {0}")]
    Config(String),

    /// Failures reported by the remote model service
    #[error("provider error: {0}")]
    Provider(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors that block entry to the chat view
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// True for failures of the remote model service
    pub fn is_provider(&self) -> bool {
        matches!(self, Error::Provider(_))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing key".to_string());
        assert_eq!(err.to_string(), "configuration error: missing key");

        let err = Error::Provider("quota exceeded".to_string());
        assert_eq!(err.to_string(), "provider error: quota exceeded");

        let err = Error::Other("boom".to_string());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_error_from_config_error() {
        let err: Error = ConfigError::MissingApiKey.into();
        assert!(err.is_config());
        assert!(!err.is_provider());
        assert!(err.to_string().contains("API Key is missing"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Provider("x".to_string()).is_provider());
        assert!(!Error::Parse("x".to_string()).is_config());
    }
}
