use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Environment variable {0} must be set")]
    MissingVariable(&'static str),

    #[error("EPOCHS must be a positive integer, got '{0}'")]
    InvalidEpochs(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse image recipe {path}: {source}")]
    Recipe {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write rendered recipe: {0}")]
    WriteRecipe(#[source] std::io::Error),

    #[error("Container engine '{0}' not found on PATH")]
    EngineNotFound(String),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
