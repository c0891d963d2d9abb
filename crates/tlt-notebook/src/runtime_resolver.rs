//! Interpreter resolution for generated notebook scripts.
//!
//! Preference: explicit choice (CLI / TLT_NOTEBOOK_INTERPRETER), then the
//! first of `ipython`, `python3`, `python` on PATH. `ipython` comes first
//! because converted scripts call `get_ipython()` for magics.

use std::path::{Path, PathBuf};

use crate::error::NotebookError;

pub const DEFAULT_INTERPRETERS: &[&str] = &["ipython", "python3", "python"];

/// Resolve the interpreter. Explicit values containing a path separator are
/// taken as paths (relative ones against `base_dir`); bare names are looked up on PATH.
pub fn resolve_interpreter(
    explicit: Option<&str>,
    base_dir: &Path,
) -> Result<PathBuf, NotebookError> {
    if let Some(choice) = explicit {
        let as_path = Path::new(choice);
        if as_path.components().count() > 1 || as_path.is_absolute() {
            let resolved = if as_path.is_absolute() {
                as_path.to_path_buf()
            } else {
                base_dir.join(as_path)
            };
            return Ok(resolved);
        }
        return which::which(choice)
            .map_err(|_| NotebookError::InterpreterNotFound(choice.to_string()));
    }

    for name in DEFAULT_INTERPRETERS {
        if let Ok(path) = which::which(name) {
            tracing::debug!(interpreter = %path.display(), "Resolved notebook interpreter");
            return Ok(path);
        }
    }
    Err(NotebookError::InterpreterNotFound(DEFAULT_INTERPRETERS.join(", ")))
}
