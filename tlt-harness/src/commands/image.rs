//! `tlt-harness image render|build`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tlt_harness_core::config::process_lookup;
use tlt_harness_core::interrupt;
use tlt_image::{build_image, dockerfile, BuildRequest, ImageRecipe};

use crate::cli::RecipeArgs;

/// Defaults, recipe file, BASE_IMAGE/BASE_TAG/TLT_VERSION from the environment, then flags.
fn load_recipe(args: &RecipeArgs) -> Result<ImageRecipe> {
    let recipe = ImageRecipe::load_or_default(args.recipe.as_deref())?
        .with_build_args_from(process_lookup)
        .with_cli_overrides(
            args.base_image.clone(),
            args.base_tag.clone(),
            args.tlt_version.clone(),
        );
    Ok(recipe)
}

/// `tlt-harness image render`
pub fn cmd_render(args: &RecipeArgs, output: Option<&Path>) -> Result<()> {
    let rendered = dockerfile::render(&load_recipe(args)?);
    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

/// `tlt-harness image build`
pub fn cmd_build(
    args: &RecipeArgs,
    context: PathBuf,
    tag: Option<String>,
    engine: String,
    dry_run: bool,
) -> Result<i32> {
    let recipe = load_recipe(args)?;
    let request = BuildRequest {
        context,
        tag,
        engine,
        dry_run,
    };
    if !request.dry_run {
        interrupt::install_handler().context("Failed to set Ctrl+C handler")?;
    }
    let code = build_image(&recipe, &request).context("Image build failed to start")?;
    if interrupt::interrupted() {
        return Ok(interrupt::INTERRUPTED_EXIT_CODE);
    }
    Ok(code)
}
