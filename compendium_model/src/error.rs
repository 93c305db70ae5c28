//! Error types for the compendium model.

use std::path::PathBuf;

/// Errors raised while loading records or rule configuration.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("frontmatter error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("note {path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("vault walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("unknown entity kind: {0:?}")]
    UnknownKind(String),

    #[error("duplicate record name {name:?}")]
    DuplicateName { name: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
