//! Resolve the runner's target argument into a concrete notebook list.
//!
//! Order: catalog keyword, then existing file, then existing directory
//! (notebooks directly inside, non-recursive). Anything else resolves to an
//! empty list.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::NotebookCatalog;

pub const NOTEBOOK_EXTENSION: &str = "ipynb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TargetKind {
    /// Catalog keyword
    Collection(String),
    File,
    Directory,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub target: String,
    pub kind: TargetKind,
    pub notebooks: Vec<PathBuf>,
}

pub fn resolve_target(target: &str, catalog: &NotebookCatalog) -> ResolvedTarget {
    let (kind, notebooks) = if let Some(list) = catalog.get(target) {
        (TargetKind::Collection(target.to_string()), list.to_vec())
    } else {
        let path = Path::new(target);
        if path.is_file() {
            (TargetKind::File, vec![path.to_path_buf()])
        } else if path.is_dir() {
            (TargetKind::Directory, list_notebooks_in_dir(path))
        } else {
            tracing::warn!(
                requested = target,
                "Target is neither a catalog keyword nor an existing path; nothing to run"
            );
            (TargetKind::Unmatched, Vec::new())
        }
    };

    tracing::debug!(
        requested = target,
        kind = ?kind,
        count = notebooks.len(),
        "Resolved notebook target"
    );
    ResolvedTarget {
        target: target.to_string(),
        kind,
        notebooks,
    }
}

/// Notebook files directly inside `dir`, sorted by file name. Hidden files are skipped.
pub fn list_notebooks_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut children: Vec<_> = entries.flatten().collect();
    children.sort_by_key(|e| e.file_name());
    children
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_notebook(p))
        .collect()
}

fn is_notebook(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden && path.extension().is_some_and(|e| e == NOTEBOOK_EXTENSION)
}
