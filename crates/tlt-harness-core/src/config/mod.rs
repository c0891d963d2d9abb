//! Unified configuration layer.
//!
//! All environment variable reads go through this module so that the runner,
//! the image builder and the CLI see the same fallback rules.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `ObservabilityConfig`, `RunnerConfig`, `ContainerConfig`
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, process_lookup};
pub use schema::{ContainerConfig, ObservabilityConfig, RunnerConfig};
