//! `tlt-harness run-notebooks` and `tlt-harness notebooks ...`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tlt_harness_core::config::RunnerConfig;
use tlt_harness_core::interrupt;
use tlt_notebook::convert;
use tlt_notebook::document::Notebook;
use tlt_notebook::runtime_resolver::resolve_interpreter;
use tlt_notebook::{resolve_target, run_notebooks, ExitPolicy, NotebookCatalog, RunOptions};

pub const RUN_USAGE: &str =
    "Usage: tlt-harness run-notebooks <tensorflow|pytorch|NOTEBOOK|DIR> [TAG]";

fn load_catalog(runner: &RunnerConfig) -> Result<NotebookCatalog> {
    NotebookCatalog::load_or_builtin(runner.catalog.as_deref())
        .context("Failed to load notebook catalog")
}

/// `tlt-harness run-notebooks`
pub fn cmd_run_notebooks(
    target: Option<&str>,
    tag: Option<String>,
    runner: &RunnerConfig,
    policy: ExitPolicy,
    fail_fast: bool,
) -> Result<i32> {
    let Some(target) = target else {
        eprintln!("{}", RUN_USAGE);
        return Ok(1);
    };

    let catalog = load_catalog(runner)?;
    let resolved = resolve_target(target, &catalog);
    if resolved.notebooks.is_empty() {
        tracing::info!(requested = target, "No notebooks to run");
        return Ok(0);
    }

    let invoking_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let interpreter = resolve_interpreter(runner.interpreter.as_deref(), &invoking_dir)?;

    interrupt::install_handler().context("Failed to set Ctrl+C handler")?;
    let opts = RunOptions {
        interpreter,
        script_name: runner.script_name.clone(),
        strip_tags: tag.into_iter().collect(),
        invoking_dir,
        fail_fast,
    };
    let summary = run_notebooks(&resolved.notebooks, &opts);

    let failed = summary.failed();
    if summary.interrupted {
        eprintln!(
            "⚠️  Interrupted: {} notebook(s) run, {} not run",
            summary.outcomes.len(),
            summary.skipped
        );
    } else if failed == 0 {
        eprintln!("✅ {} notebook(s) passed", summary.outcomes.len());
    } else {
        eprintln!(
            "❌ {} of {} notebook(s) failed{}",
            failed,
            summary.outcomes.len(),
            if summary.skipped > 0 {
                format!(", {} skipped", summary.skipped)
            } else {
                String::new()
            }
        );
        for outcome in summary.outcomes.iter().filter(|o| !o.success()) {
            eprintln!("   {} (exit {})", outcome.notebook.display(), outcome.exit_code());
        }
    }

    Ok(summary.exit_code(policy))
}

/// `tlt-harness notebooks list`
pub fn cmd_list(target: &str, runner: &RunnerConfig, json: bool) -> Result<()> {
    let catalog = load_catalog(runner)?;
    let resolved = resolve_target(target, &catalog);
    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        for notebook in &resolved.notebooks {
            println!("{}", notebook.display());
        }
    }
    Ok(())
}

/// `tlt-harness notebooks convert`
pub fn cmd_convert(notebook: &Path, tags: &[String], output: Option<&Path>) -> Result<()> {
    let document = Notebook::load(notebook)?;
    let script = convert::to_script(&document, tags);
    match output {
        Some(path) => fs::write(path, script)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", script),
    }
    Ok(())
}
