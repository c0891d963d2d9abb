//! Two-stage Dockerfile rendering.
//!
//! Stage one builds the wheel with framework dependencies excluded; stage two
//! installs it with the framework extras, adds the text-processing
//! requirement, deletes the wheel and hands control to `tlt train`.

use std::fmt::Write as _;

use tlt_harness_core::config::env_keys::{build as build_keys, train as train_keys};

use crate::entrypoint::shell_template;
use crate::recipe::ImageRecipe;

const BUILDER_STAGE: &str = "builder";

pub fn render(recipe: &ImageRecipe) -> String {
    let mut out = String::new();
    let from = format!(
        "${{{}}}:${{{}}}",
        build_keys::BASE_IMAGE,
        build_keys::BASE_TAG
    );

    // Global args must precede the first FROM to be usable in it.
    let _ = writeln!(out, "ARG {}={}", build_keys::BASE_IMAGE, recipe.base_image);
    let _ = writeln!(out, "ARG {}={}", build_keys::BASE_TAG, recipe.base_tag);
    let _ = writeln!(out, "ARG {}={}", build_keys::TLT_VERSION, recipe.tlt_version);
    out.push('\n');

    let _ = writeln!(out, "FROM {} AS {}", from, BUILDER_STAGE);
    let _ = writeln!(out, "WORKDIR {}", recipe.workdir);
    let _ = writeln!(out, "COPY . {}", recipe.workdir);
    let _ = writeln!(
        out,
        "RUN {} python setup.py bdist_wheel",
        recipe.exclude_frameworks_env
    );
    out.push('\n');

    let _ = writeln!(out, "FROM {}", from);
    let _ = writeln!(out, "ARG {}", build_keys::TLT_VERSION);
    let _ = writeln!(out, "WORKDIR {}", recipe.workdir);
    if !recipe.os_packages.is_empty() {
        let _ = writeln!(
            out,
            "RUN apt-get update && \\\n    apt-get install -y --no-install-recommends {} && \\\n    rm -rf /var/lib/apt/lists/*",
            recipe.os_packages.join(" ")
        );
    }

    let wheel = recipe.wheel_template();
    let _ = writeln!(
        out,
        "COPY --from={} {}/dist/{} .",
        BUILDER_STAGE,
        recipe.workdir.trim_end_matches('/'),
        wheel
    );
    let _ = writeln!(out, "{}", install_step(recipe, &wheel));
    out.push('\n');

    let _ = writeln!(out, "ENV {}={}", train_keys::DATASET_DIR, recipe.dataset_dir);
    let _ = writeln!(out, "ENV {}={}", train_keys::OUTPUT_DIR, recipe.output_dir);
    let _ = writeln!(out, "ENV {}={}", train_keys::EPOCHS, recipe.epochs);
    let _ = writeln!(out, "ENTRYPOINT {}", entrypoint_json(&recipe.framework));
    out
}

fn install_step(recipe: &ImageRecipe, wheel: &str) -> String {
    let target = if recipe.extras.is_empty() {
        wheel.to_string()
    } else {
        format!("{}[{}]", wheel, recipe.extras)
    };
    let mut step = format!("RUN python -m pip install --no-cache-dir \"{}\"", target);
    if !recipe.extra_requirements.is_empty() {
        let reqs: Vec<String> = recipe
            .extra_requirements
            .iter()
            .map(|r| format!("\"{}\"", r))
            .collect();
        let _ = write!(
            step,
            " && \\\n    python -m pip install --no-cache-dir {}",
            reqs.join(" ")
        );
    }
    let _ = write!(step, " && \\\n    rm {}", wheel);
    step
}

/// Exec-form ENTRYPOINT running the train command through bash so the
/// environment is expanded at container start.
fn entrypoint_json(framework: &str) -> String {
    let parts = ["/bin/bash".to_string(), "-c".to_string(), shell_template(framework)];
    serde_json::to_string(&parts).unwrap_or_default()
}
