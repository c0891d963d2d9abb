//! Container recipe parameters.
//!
//! Defaults describe the TensorFlow runtime image. A YAML file may override
//! any subset of fields; the three build arguments can also come from the
//! environment (`BASE_IMAGE`, `BASE_TAG`, `TLT_VERSION`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tlt_harness_core::config::env_keys::build as build_keys;

use crate::error::ImageError;

pub const DEFAULT_BASE_IMAGE: &str = "intel/intel-optimized-tensorflow";
pub const DEFAULT_BASE_TAG: &str = "latest";
pub const DEFAULT_TLT_VERSION: &str = "0.2.0";
pub const DEFAULT_PACKAGE: &str = "intel_transfer_learning_tool";
pub const DEFAULT_DATASET_DIR: &str = "/workspace/data";
pub const DEFAULT_OUTPUT_DIR: &str = "/workspace/output";
pub const DEFAULT_EPOCHS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRecipe {
    pub base_image: String,
    pub base_tag: String,
    pub tlt_version: String,
    /// Distribution name of the wheel (underscored)
    pub package: String,
    /// `KEY=VALUE` set while building the wheel so framework deps are not bundled
    pub exclude_frameworks_env: String,
    /// Extras installed with the wheel in the runtime stage
    pub extras: String,
    pub os_packages: Vec<String>,
    /// Pinned requirements installed after the wheel
    pub extra_requirements: Vec<String>,
    pub workdir: String,
    /// Framework passed to `tlt train --framework`
    pub framework: String,
    pub dataset_dir: String,
    pub output_dir: String,
    pub epochs: u32,
}

impl Default for ImageRecipe {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            base_tag: DEFAULT_BASE_TAG.to_string(),
            tlt_version: DEFAULT_TLT_VERSION.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            exclude_frameworks_env: "EXCLUDE_FRAMEWORK=True".to_string(),
            extras: "tensorflow".to_string(),
            os_packages: vec![
                "build-essential".to_string(),
                "python3-dev".to_string(),
                "libgl1".to_string(),
                "libglib2.0-0".to_string(),
            ],
            extra_requirements: vec!["tensorflow-text==2.10.0".to_string()],
            workdir: "/workspace".to_string(),
            framework: "tensorflow".to_string(),
            dataset_dir: DEFAULT_DATASET_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            epochs: DEFAULT_EPOCHS,
        }
    }
}

impl ImageRecipe {
    pub fn load_from_file(path: &Path) -> Result<Self, ImageError> {
        let content = fs::read_to_string(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let recipe: Self = serde_yaml::from_str(&content).map_err(|source| ImageError::Recipe {
            path: path.to_path_buf(),
            source,
        })?;
        recipe.validate()
    }

    /// The rendered `ENV EPOCHS` must be accepted by the entry point.
    pub fn validate(self) -> Result<Self, ImageError> {
        if self.epochs == 0 {
            return Err(ImageError::InvalidEpochs(self.epochs.to_string()));
        }
        Ok(self)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ImageError> {
        path.map_or_else(|| Ok(Self::default()), Self::load_from_file)
    }

    /// Override build arguments from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn with_build_args_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(build_keys::BASE_IMAGE) {
            self.base_image = v;
        }
        if let Some(v) = get(build_keys::BASE_TAG) {
            self.base_tag = v;
        }
        if let Some(v) = get(build_keys::TLT_VERSION) {
            self.tlt_version = v;
        }
        self
    }

    pub fn with_cli_overrides(
        mut self,
        base_image: Option<String>,
        base_tag: Option<String>,
        tlt_version: Option<String>,
    ) -> Self {
        if let Some(v) = base_image {
            self.base_image = v;
        }
        if let Some(v) = base_tag {
            self.base_tag = v;
        }
        if let Some(v) = tlt_version {
            self.tlt_version = v;
        }
        self
    }

    /// Wheel file name with the version left as a build-arg reference,
    /// e.g. `intel_transfer_learning_tool-${TLT_VERSION}-py3-none-any.whl`.
    pub fn wheel_template(&self) -> String {
        format!("{}-${{{}}}-py3-none-any.whl", self.package, build_keys::TLT_VERSION)
    }

    /// Concrete wheel file name for this recipe's version.
    pub fn wheel_name(&self) -> String {
        format!("{}-{}-py3-none-any.whl", self.package, self.tlt_version)
    }

    /// `(name, value)` pairs passed as `--build-arg`.
    pub fn build_args(&self) -> Vec<(String, String)> {
        vec![
            (build_keys::BASE_IMAGE.to_string(), self.base_image.clone()),
            (build_keys::BASE_TAG.to_string(), self.base_tag.clone()),
            (build_keys::TLT_VERSION.to_string(), self.tlt_version.clone()),
        ]
    }
}
