//! Named notebook collections selected by keyword (`tensorflow`, `pytorch`, ...).
//!
//! The built-in catalog lists the notebooks exercised by the framework smoke
//! runs. A YAML file can replace it:
//!
//! ```yaml
//! collections:
//!   tensorflow:
//!     - notebooks/image_classification/tf_image_classification/Image_Classification_Transfer_Learning.ipynb
//!   pytorch:
//!     - notebooks/object_detection/pytorch_object_detection/PyTorch_Object_Detection_Transfer_Learning.ipynb
//! ```
//!
//! Paths are relative to the directory the runner is invoked from.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NotebookError;

pub const TENSORFLOW_NOTEBOOKS: &[&str] = &[
    "notebooks/image_classification/tf_image_classification/Image_Classification_Transfer_Learning.ipynb",
    "notebooks/text_classification/tfhub_text_classification/BERT_Binary_Text_Classification.ipynb",
    "notebooks/text_classification/tfhub_text_classification/BERT_Multi_Text_Classification.ipynb",
    "notebooks/question_answering/tfhub_question_answering/BERT_Question_Answering.ipynb",
];

pub const PYTORCH_NOTEBOOKS: &[&str] = &[
    "notebooks/image_classification/pytorch_image_classification/PyTorch_Image_Classification_Transfer_Learning.ipynb",
    "notebooks/object_detection/pytorch_object_detection/PyTorch_Object_Detection_Transfer_Learning.ipynb",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookCatalog {
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<PathBuf>>,
}

impl Default for NotebookCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NotebookCatalog {
    pub fn builtin() -> Self {
        let to_paths = |list: &[&str]| list.iter().map(PathBuf::from).collect::<Vec<_>>();
        let mut collections = BTreeMap::new();
        collections.insert("tensorflow".to_string(), to_paths(TENSORFLOW_NOTEBOOKS));
        collections.insert("pytorch".to_string(), to_paths(PYTORCH_NOTEBOOKS));
        Self { collections }
    }

    /// Load a catalog from a YAML file. The result replaces the built-in collections.
    pub fn load_from_file(path: &Path) -> Result<Self, NotebookError> {
        let content = fs::read_to_string(path).map_err(|source| NotebookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| NotebookError::Catalog {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` when given, otherwise fall back to the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, NotebookError> {
        match path {
            Some(p) => {
                let catalog = Self::load_from_file(p)?;
                tracing::debug!(
                    path = %p.display(),
                    collections = catalog.collections.len(),
                    "Loaded notebook catalog"
                );
                Ok(catalog)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Exact, case-sensitive keyword lookup.
    pub fn get(&self, keyword: &str) -> Option<&[PathBuf]> {
        self.collections.get(keyword).map(Vec::as_slice)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_collections_sizes() {
        let catalog = NotebookCatalog::builtin();
        assert_eq!(catalog.get("tensorflow").unwrap().len(), 4);
        assert_eq!(catalog.get("pytorch").unwrap().len(), 2);
        assert!(catalog.get("TensorFlow").is_none());
        assert_eq!(catalog.keywords().collect::<Vec<_>>(), vec!["pytorch", "tensorflow"]);
    }

    #[test]
    fn test_load_from_file_replaces_builtin() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.yaml");
        fs::write(
            &path,
            "collections:\n  smoke:\n    - a/one.ipynb\n    - b/two.ipynb\n",
        )
        .unwrap();
        let catalog = NotebookCatalog::load_or_builtin(Some(&path)).unwrap();
        assert!(catalog.get("tensorflow").is_none());
        assert_eq!(
            catalog.get("smoke").unwrap(),
            &[PathBuf::from("a/one.ipynb"), PathBuf::from("b/two.ipynb")]
        );
    }

    #[test]
    fn test_load_from_file_rejects_bad_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.yaml");
        fs::write(&path, "collections: [not, a, map]\n").unwrap();
        let err = NotebookCatalog::load_from_file(&path).unwrap_err();
        assert!(matches!(err, NotebookError::Catalog { .. }));
    }
}
