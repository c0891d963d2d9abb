//! Environment variable key constants.
//!
//! Harness-owned variables use the `TLT_*` prefix. The build arguments and the
//! training entry point variables keep the bare names the container recipe
//! exposes, since they are part of the image's public interface.

/// Logging and run-event log
pub mod observability {
    pub const TLT_QUIET: &str = "TLT_QUIET";
    pub const TLT_LOG_LEVEL: &str = "TLT_LOG_LEVEL";
    pub const TLT_LOG_JSON: &str = "TLT_LOG_JSON";
    /// JSONL file receiving notebook / build events
    pub const TLT_RUN_LOG: &str = "TLT_RUN_LOG";
}

/// Notebook runner
pub mod runner {
    pub const TLT_NOTEBOOK_CATALOG: &str = "TLT_NOTEBOOK_CATALOG";
    pub const TLT_NOTEBOOK_INTERPRETER: &str = "TLT_NOTEBOOK_INTERPRETER";
    pub const TLT_NOTEBOOK_SCRIPT_NAME: &str = "TLT_NOTEBOOK_SCRIPT_NAME";
    /// Search path variable extended with the invoking directory
    pub const PYTHONPATH: &str = "PYTHONPATH";
}

/// Container recipe build arguments
pub mod build {
    pub const TLT_CONTAINER_ENGINE: &str = "TLT_CONTAINER_ENGINE";
    pub const BASE_IMAGE: &str = "BASE_IMAGE";
    pub const BASE_TAG: &str = "BASE_TAG";
    pub const TLT_VERSION: &str = "TLT_VERSION";
}

/// Training entry point
pub mod train {
    pub const MODEL_NAME: &str = "MODEL_NAME";
    pub const DATASET_NAME: &str = "DATASET_NAME";
    pub const DATASET_DIR: &str = "DATASET_DIR";
    pub const OUTPUT_DIR: &str = "OUTPUT_DIR";
    pub const EPOCHS: &str = "EPOCHS";
}
