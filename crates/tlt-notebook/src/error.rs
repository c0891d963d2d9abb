//! Errors raised while loading, converting and executing notebooks.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Notebook {path} is not valid ipynb JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Notebook {path} uses nbformat {found}; only nbformat 4 is supported")]
    UnsupportedFormat { path: PathBuf, found: u32 },

    #[error("Failed to parse notebook catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Refusing to overwrite existing file {0}")]
    ScriptExists(PathBuf),

    #[error("Failed to write generated script {path}: {source}")]
    WriteScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No notebook interpreter found on PATH (tried: {0})")]
    InterpreterNotFound(String),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
