//! `tlt-harness train-entry`: the runtime image's entry point.

use std::process::Command;

use anyhow::{Context, Result};
use tlt_harness_core::config::process_lookup;
use tlt_harness_core::observability;
use tlt_image::TrainInvocation;

pub fn cmd_train_entry(framework: &str, dry_run: bool) -> Result<i32> {
    let invocation = TrainInvocation::from_lookup(process_lookup, framework)?;

    if dry_run {
        println!("{}", invocation.display());
        return Ok(0);
    }

    let argv = invocation.argv();
    tracing::info!(command = %invocation.display(), "Starting training");
    observability::train_invoked(&argv);

    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .status()
        .with_context(|| format!("Failed to launch {}", argv[0]))?;
    Ok(status.code().unwrap_or(1))
}
