use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonError {
    #[error("Category name already in use: {name}")]
    DuplicateName { name: String },

    #[error("Cannot create '{name}' under category {parent}: maximum nesting depth exceeded")]
    MaxDepthExceeded { name: String, parent: u64 },

    #[error("Parent category not found: {id}")]
    ParentNotFound { id: u64 },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: u64 },

    #[error("Invalid category name: '{name}' - must not be empty")]
    InvalidName { name: String },

    #[error("Category file is corrupt: {message}")]
    StoreCorrupt { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Not allowed: {action}")]
    Forbidden { action: String },

    #[error("Config parse error in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    ConfigValueInvalid { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaxonError>;

impl TaxonError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DuplicateName { .. } => 2,
            Self::MaxDepthExceeded { .. } => 3,
            Self::ParentNotFound { .. } => 4,
            Self::CategoryNotFound { .. } => 5,
            Self::InvalidName { .. } => 6,
            Self::Forbidden { .. } => 7,
            _ => 1,
        }
    }
}
