use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {}: {error}", path.display())]
    Parse {
        path: PathBuf,
        error: serde_json::Error,
    },

    #[error("Missing required field '{field}' in {}", path.display())]
    MissingField { path: PathBuf, field: String },
}

impl ConfigError {
    /// Create a parse error with manifest context
    pub fn parse(path: impl Into<PathBuf>, error: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            error,
        }
    }

    /// Create a missing-field error
    pub fn missing_field(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
        Self::MissingField {
            path: path.into(),
            field: field.into(),
        }
    }
}
