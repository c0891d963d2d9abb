//! Configuration structs grouped by concern, loaded from the environment.

use super::env_keys::{build, observability as obv_keys, runner};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default stem of the script generated next to each notebook.
pub const DEFAULT_SCRIPT_NAME: &str = "notebook_test";

/// Default container engine binary.
pub const DEFAULT_CONTAINER_ENGINE: &str = "docker";

/// Default tracing filter when neither `RUST_LOG` nor `TLT_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "tlt_harness=info,tlt_notebook=info,tlt_image=info";

/// Observability: quiet, log level, JSON output, run-event log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub run_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::TLT_QUIET, false),
                log_level: env_or(obv_keys::TLT_LOG_LEVEL, || {
                    DEFAULT_LOG_LEVEL.to_string()
                }),
                log_json: env_bool(obv_keys::TLT_LOG_JSON, false),
                run_log: env_optional(obv_keys::TLT_RUN_LOG),
            }
        })
    }
}

/// Notebook runner settings. CLI flags override these.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Catalog YAML replacing the built-in keyword collections
    pub catalog: Option<PathBuf>,
    /// Interpreter used to execute generated scripts; `None` means auto-detect
    pub interpreter: Option<String>,
    /// Stem of the generated script (`<stem>.py`)
    pub script_name: String,
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            catalog: env_optional(runner::TLT_NOTEBOOK_CATALOG).map(PathBuf::from),
            interpreter: env_optional(runner::TLT_NOTEBOOK_INTERPRETER),
            script_name: env_or(runner::TLT_NOTEBOOK_SCRIPT_NAME, || {
                DEFAULT_SCRIPT_NAME.to_string()
            }),
        }
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_cli_overrides(
        mut self,
        catalog: Option<PathBuf>,
        interpreter: Option<String>,
        script_name: Option<String>,
    ) -> Self {
        if catalog.is_some() {
            self.catalog = catalog;
        }
        if interpreter.is_some() {
            self.interpreter = interpreter;
        }
        if let Some(name) = script_name {
            self.script_name = name;
        }
        self
    }
}

/// Container engine selection for `image build`
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub engine: String,
}

impl ContainerConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            engine: env_or(build::TLT_CONTAINER_ENGINE, || {
                DEFAULT_CONTAINER_ENGINE.to_string()
            }),
        }
    }
}
