mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ImageCommand, NotebooksCommand};
use tlt_harness_core::config::{ContainerConfig, RunnerConfig};
use tlt_harness_core::observability;
use tlt_notebook::ExitPolicy;

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let _ = Cli::command().write_help(&mut std::io::stderr());
        std::process::exit(1);
    };

    let code = match command {
        Commands::RunNotebooks {
            target,
            tag,
            catalog,
            interpreter,
            script_name,
            strict,
            fail_fast,
        } => {
            let runner =
                RunnerConfig::from_env().with_cli_overrides(catalog, interpreter, script_name);
            let policy = if strict {
                ExitPolicy::Strict
            } else {
                ExitPolicy::Last
            };
            commands::notebooks::cmd_run_notebooks(
                target.as_deref(),
                tag,
                &runner,
                policy,
                fail_fast,
            )?
        }
        Commands::Notebooks(NotebooksCommand::List {
            target,
            catalog,
            json,
        }) => {
            let runner = RunnerConfig::from_env().with_cli_overrides(catalog, None, None);
            commands::notebooks::cmd_list(&target, &runner, json)?;
            0
        }
        Commands::Notebooks(NotebooksCommand::Convert {
            notebook,
            tags,
            output,
        }) => {
            commands::notebooks::cmd_convert(&notebook, &tags, output.as_deref())?;
            0
        }
        Commands::Image(ImageCommand::Render { recipe, output }) => {
            commands::image::cmd_render(&recipe, output.as_deref())?;
            0
        }
        Commands::Image(ImageCommand::Build {
            recipe,
            context,
            tag,
            engine,
            dry_run,
        }) => {
            let engine = engine.unwrap_or_else(|| ContainerConfig::from_env().engine);
            commands::image::cmd_build(&recipe, context, tag, engine, dry_run)?
        }
        Commands::TrainEntry { framework, dry_run } => {
            commands::train::cmd_train_entry(&framework, dry_run)?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
