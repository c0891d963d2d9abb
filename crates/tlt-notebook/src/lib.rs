pub mod catalog;
pub mod convert;
pub mod document;
pub mod error;
pub mod log;
pub mod resolve;
pub mod runner;
pub mod runtime_resolver;

pub use catalog::NotebookCatalog;
pub use error::NotebookError;
pub use resolve::{resolve_target, ResolvedTarget, TargetKind};
pub use runner::{
    run_notebook, run_notebooks, ExitPolicy, NotebookOutcome, NotebookStatus, RunOptions,
    RunSummary,
};
