//! Minimal nbformat 4 document model: only what script conversion reads.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::NotebookError;

pub const SUPPORTED_NBFORMAT: u32 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Notebook {
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
    #[serde(default)]
    pub metadata: NotebookMetadata,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file_extension: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Code {
        source: MultilineString,
        #[serde(default)]
        metadata: CellMetadata,
        #[serde(default)]
        execution_count: Option<u32>,
    },
    Markdown {
        source: MultilineString,
        #[serde(default)]
        metadata: CellMetadata,
    },
    Raw {
        source: MultilineString,
        #[serde(default)]
        metadata: CellMetadata,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw cell target format (`text/x-python`, `text/latex`, ...)
    #[serde(default)]
    pub format: Option<String>,
    /// Legacy spelling of `format`
    #[serde(default)]
    pub raw_mimetype: Option<String>,
}

/// ipynb stores text either as one string or as a list of lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultilineString {
    Single(String),
    Lines(Vec<String>),
}

impl MultilineString {
    pub fn text(&self) -> String {
        match self {
            Self::Single(s) => s.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

impl Cell {
    pub fn source(&self) -> String {
        match self {
            Self::Code { source, .. }
            | Self::Markdown { source, .. }
            | Self::Raw { source, .. } => source.text(),
        }
    }

    pub fn metadata(&self) -> &CellMetadata {
        match self {
            Self::Code { metadata, .. }
            | Self::Markdown { metadata, .. }
            | Self::Raw { metadata, .. } => metadata,
        }
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.metadata().tags.iter().any(|t| tags.contains(t))
    }
}

impl Notebook {
    pub fn load(path: &Path) -> Result<Self, NotebookError> {
        let content = fs::read_to_string(path).map_err(|source| NotebookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse ipynb JSON; `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, NotebookError> {
        let notebook: Notebook =
            serde_json::from_str(content).map_err(|source| NotebookError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if notebook.nbformat != SUPPORTED_NBFORMAT {
            return Err(NotebookError::UnsupportedFormat {
                path: path.to_path_buf(),
                found: notebook.nbformat,
            });
        }
        Ok(notebook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cells_sources_and_tags() {
        let json = r##"{
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {"language_info": {"name": "python", "file_extension": ".py"}},
            "cells": [
                {"cell_type": "markdown", "id": "m1", "metadata": {}, "source": "# Title"},
                {"cell_type": "code", "id": "c1", "metadata": {"tags": ["skip_test"]},
                 "execution_count": 3, "outputs": [], "source": ["import os\n", "print(os.getcwd())"]},
                {"cell_type": "raw", "metadata": {"format": "text/x-python"}, "source": []}
            ]
        }"##;
        let nb = Notebook::parse(json, Path::new("t.ipynb")).unwrap();
        assert_eq!(nb.nbformat_minor, 5);
        assert_eq!(nb.cells.len(), 3);
        assert_eq!(nb.cells[0].source(), "# Title");
        assert_eq!(nb.cells[1].source(), "import os\nprint(os.getcwd())");
        assert!(nb.cells[1].has_any_tag(&["skip_test".to_string()]));
        assert!(!nb.cells[0].has_any_tag(&["skip_test".to_string()]));
        assert!(matches!(
            nb.cells[1],
            Cell::Code { execution_count: Some(3), .. }
        ));
        assert_eq!(nb.cells[2].metadata().format.as_deref(), Some("text/x-python"));
    }

    #[test]
    fn test_parse_rejects_old_nbformat() {
        let err = Notebook::parse(r#"{"nbformat": 3, "worksheets": []}"#, Path::new("old.ipynb"))
            .unwrap_err();
        assert!(matches!(err, NotebookError::UnsupportedFormat { found: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = Notebook::parse("not json", Path::new("bad.ipynb")).unwrap_err();
        assert!(matches!(err, NotebookError::Parse { .. }));
    }
}
