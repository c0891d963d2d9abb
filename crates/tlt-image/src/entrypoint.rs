//! Training entry point of the runtime image.
//!
//! Every parameter of `tlt train` comes from the environment. `MODEL_NAME`
//! and `DATASET_NAME` are required; `DATASET_DIR`, `OUTPUT_DIR` and `EPOCHS`
//! fall back to the image defaults.

use tlt_harness_core::config::env_keys::train as train_keys;

use crate::error::ImageError;
use crate::recipe::{DEFAULT_DATASET_DIR, DEFAULT_EPOCHS, DEFAULT_OUTPUT_DIR};

/// CLI installed by the wheel.
pub const TRAIN_PROGRAM: &str = "tlt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainInvocation {
    pub framework: String,
    pub model_name: String,
    pub dataset_name: String,
    pub dataset_dir: String,
    pub output_dir: String,
    pub epochs: u32,
}

impl TrainInvocation {
    /// Build from an environment lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, framework: &str) -> Result<Self, ImageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model_name = get(train_keys::MODEL_NAME)
            .ok_or(ImageError::MissingVariable(train_keys::MODEL_NAME))?;
        let dataset_name = get(train_keys::DATASET_NAME)
            .ok_or(ImageError::MissingVariable(train_keys::DATASET_NAME))?;
        let epochs = match get(train_keys::EPOCHS) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ImageError::InvalidEpochs(raw)),
            },
            None => DEFAULT_EPOCHS,
        };

        Ok(Self {
            framework: framework.to_string(),
            model_name,
            dataset_name,
            dataset_dir: get(train_keys::DATASET_DIR)
                .unwrap_or_else(|| DEFAULT_DATASET_DIR.to_string()),
            output_dir: get(train_keys::OUTPUT_DIR)
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            epochs,
        })
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<String> {
        train_argv(
            &self.framework,
            &self.model_name,
            &self.output_dir,
            &self.dataset_dir,
            &self.epochs.to_string(),
            &self.dataset_name,
        )
    }

    /// Space-joined command with shell quoting where needed, for `--dry-run` and logs.
    pub fn display(&self) -> String {
        self.argv()
            .iter()
            .map(|a| shell_quote(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn train_argv(
    framework: &str,
    model_name: &str,
    output_dir: &str,
    dataset_dir: &str,
    epochs: &str,
    dataset_name: &str,
) -> Vec<String> {
    [
        TRAIN_PROGRAM,
        "train",
        "--framework",
        framework,
        "--model-name",
        model_name,
        "--output-dir",
        output_dir,
        "--dataset-dir",
        dataset_dir,
        "--epochs",
        epochs,
        "--dataset-name",
        dataset_name,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Shell command for the image's ENTRYPOINT: the same argv with every value
/// read from the container environment at start-up.
pub fn shell_template(framework: &str) -> String {
    let var = |key: &str| format!("\"${{{}}}\"", key);
    train_argv(
        &shell_quote(framework),
        &var(train_keys::MODEL_NAME),
        &var(train_keys::OUTPUT_DIR),
        &var(train_keys::DATASET_DIR),
        &var(train_keys::EPOCHS),
        &var(train_keys::DATASET_NAME),
    )
    .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_required_set() {
        let inv = TrainInvocation::from_lookup(
            lookup(&[("MODEL_NAME", "resnet_v1_50"), ("DATASET_NAME", "tf_flowers")]),
            "tensorflow",
        )
        .unwrap();
        assert_eq!(
            inv.argv(),
            vec![
                "tlt", "train", "--framework", "tensorflow", "--model-name", "resnet_v1_50",
                "--output-dir", "/workspace/output", "--dataset-dir", "/workspace/data",
                "--epochs", "1", "--dataset-name", "tf_flowers",
            ]
        );
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let inv = TrainInvocation::from_lookup(
            lookup(&[
                ("MODEL_NAME", "efficientnet_b0"),
                ("DATASET_NAME", "cifar10"),
                ("DATASET_DIR", "/data"),
                ("OUTPUT_DIR", "  "),
                ("EPOCHS", "5"),
            ]),
            "tensorflow",
        )
        .unwrap();
        assert_eq!(inv.dataset_dir, "/data");
        assert_eq!(inv.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(inv.epochs, 5);
    }

    #[test]
    fn test_missing_required_variables() {
        let err = TrainInvocation::from_lookup(lookup(&[("DATASET_NAME", "x")]), "tensorflow")
            .unwrap_err();
        assert!(matches!(err, ImageError::MissingVariable("MODEL_NAME")));

        let err = TrainInvocation::from_lookup(lookup(&[("MODEL_NAME", "m")]), "tensorflow")
            .unwrap_err();
        assert!(matches!(err, ImageError::MissingVariable("DATASET_NAME")));
    }

    #[test]
    fn test_invalid_epochs() {
        for bad in ["zero", "0", "-1", "1.5"] {
            let err = TrainInvocation::from_lookup(
                lookup(&[("MODEL_NAME", "m"), ("DATASET_NAME", "d"), ("EPOCHS", bad)]),
                "tensorflow",
            )
            .unwrap_err();
            assert!(matches!(err, ImageError::InvalidEpochs(ref v) if v == bad));
        }
    }

    #[test]
    fn test_shell_template_reads_environment() {
        assert_eq!(
            shell_template("tensorflow"),
            "tlt train --framework tensorflow --model-name \"${MODEL_NAME}\" \
             --output-dir \"${OUTPUT_DIR}\" --dataset-dir \"${DATASET_DIR}\" \
             --epochs \"${EPOCHS}\" --dataset-name \"${DATASET_NAME}\""
        );
    }

    #[test]
    fn test_shell_template_quotes_framework() {
        let template = shell_template("tensorflow; rm -rf /");
        assert!(template.starts_with("tlt train --framework 'tensorflow; rm -rf /' --model-name "));
    }

    #[test]
    fn test_display_quotes_unsafe_args() {
        let inv = TrainInvocation {
            framework: "tensorflow".to_string(),
            model_name: "m".to_string(),
            dataset_name: "my data".to_string(),
            dataset_dir: "/d".to_string(),
            output_dir: "/o".to_string(),
            epochs: 1,
        };
        assert!(inv.display().ends_with("--dataset-name 'my data'"));
    }
}
