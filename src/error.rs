use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkNestError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LinkNestError>;
