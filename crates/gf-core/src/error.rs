//! Error types for GachaForge

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum GfError {
    #[error("Pool data not loaded")]
    DataNotLoaded,

    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Persistence unavailable: {0}")]
    Persistence(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable reason code carried by failure responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DataNotLoaded,
    PoolNotFound,
    PersistenceUnavailable,
    InvalidConfig,
    Serialization,
    Io,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DataNotLoaded => "DATA_NOT_LOADED",
            ErrorCode::PoolNotFound => "POOL_NOT_FOUND",
            ErrorCode::PersistenceUnavailable => "PERSISTENCE_UNAVAILABLE",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::Serialization => "SERIALIZATION",
            ErrorCode::Io => "IO",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GfError {
    /// Reason code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            GfError::DataNotLoaded => ErrorCode::DataNotLoaded,
            GfError::PoolNotFound(_) => ErrorCode::PoolNotFound,
            GfError::Persistence(_) => ErrorCode::PersistenceUnavailable,
            GfError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            GfError::Serialization(_) => ErrorCode::Serialization,
            GfError::Io(_) => ErrorCode::Io,
        }
    }
}

impl From<serde_json::Error> for GfError {
    fn from(e: serde_json::Error) -> Self {
        GfError::Serialization(e.to_string())
    }
}

/// Result type alias
pub type GfResult<T> = Result<T, GfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GfError::DataNotLoaded.code(), ErrorCode::DataNotLoaded);
        assert_eq!(
            GfError::PoolNotFound("x".into()).code().as_str(),
            "POOL_NOT_FOUND"
        );

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(GfError::from(io).code(), ErrorCode::Io);
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::PersistenceUnavailable).unwrap();
        assert_eq!(json, "\"PERSISTENCE_UNAVAILABLE\"");
    }

    #[test]
    fn test_display() {
        let err = GfError::PoolNotFound("limited_01".into());
        assert_eq!(err.to_string(), "Pool not found: limited_01");
    }
}
