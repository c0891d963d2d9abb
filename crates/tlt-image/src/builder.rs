//! Image build driver: render the recipe to a temporary Dockerfile and hand
//! it to the container engine.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tlt_harness_core::observability;

use crate::dockerfile;
use crate::error::ImageError;
use crate::recipe::ImageRecipe;

#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Build context (the toolkit source checkout)
    pub context: PathBuf,
    pub tag: Option<String>,
    /// Engine executable name or path (`docker`, `podman`, ...)
    pub engine: String,
    /// Print the Dockerfile and command instead of running the engine
    pub dry_run: bool,
}

/// Assemble `<engine> build -f <file> --build-arg K=V ... [-t tag] <context>`.
pub fn build_command(
    engine: &Path,
    dockerfile_path: &Path,
    recipe: &ImageRecipe,
    request: &BuildRequest,
) -> Command {
    let mut cmd = Command::new(engine);
    cmd.arg("build").arg("-f").arg(dockerfile_path);
    for (name, value) in recipe.build_args() {
        cmd.arg("--build-arg").arg(format!("{}={}", name, value));
    }
    if let Some(ref tag) = request.tag {
        cmd.arg("-t").arg(tag);
    }
    cmd.arg(&request.context);
    cmd
}

fn describe(cmd: &Command) -> String {
    let mut parts: Vec<OsString> = vec![cmd.get_program().to_os_string()];
    parts.extend(cmd.get_args().map(|a| a.to_os_string()));
    parts
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the image. Returns the engine's exit code (1 when it was killed by a signal).
pub fn build_image(recipe: &ImageRecipe, request: &BuildRequest) -> Result<i32, ImageError> {
    let rendered = dockerfile::render(recipe);

    if request.dry_run {
        let cmd = build_command(
            Path::new(&request.engine),
            Path::new("<Dockerfile>"),
            recipe,
            request,
        );
        println!("{}", rendered);
        println!("# {}", describe(&cmd));
        return Ok(0);
    }

    let engine = which::which(&request.engine)
        .map_err(|_| ImageError::EngineNotFound(request.engine.clone()))?;

    let mut file = tempfile::Builder::new()
        .prefix("tlt-")
        .suffix(".Dockerfile")
        .tempfile()
        .map_err(ImageError::WriteRecipe)?;
    file.write_all(rendered.as_bytes())
        .and_then(|_| file.flush())
        .map_err(ImageError::WriteRecipe)?;

    let mut cmd = build_command(&engine, file.path(), recipe, request);
    tracing::info!(command = %describe(&cmd), "Building image");
    observability::image_build_invoked(
        &request.engine,
        request.tag.as_deref(),
        &recipe.build_args(),
    );

    let status = cmd.status().map_err(|source| ImageError::Spawn {
        program: engine.clone(),
        source,
    })?;
    drop(file);

    if !status.success() {
        tracing::warn!(code = ?status.code(), "Image build failed");
    }
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tag: Option<&str>) -> BuildRequest {
        BuildRequest {
            context: PathBuf::from("/src/transfer-learning"),
            tag: tag.map(String::from),
            engine: "docker".to_string(),
            dry_run: false,
        }
    }

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_build_command_layout() {
        let recipe = ImageRecipe::default();
        let cmd = build_command(
            Path::new("/usr/bin/docker"),
            Path::new("/tmp/x.Dockerfile"),
            &recipe,
            &request(Some("intel/tlt:tf")),
        );
        assert_eq!(cmd.get_program(), "/usr/bin/docker");
        assert_eq!(
            args_of(&cmd),
            vec![
                "build",
                "-f",
                "/tmp/x.Dockerfile",
                "--build-arg",
                "BASE_IMAGE=intel/intel-optimized-tensorflow",
                "--build-arg",
                "BASE_TAG=latest",
                "--build-arg",
                "TLT_VERSION=0.2.0",
                "-t",
                "intel/tlt:tf",
                "/src/transfer-learning",
            ]
        );
    }

    #[test]
    fn test_build_command_without_tag() {
        let cmd = build_command(
            Path::new("podman"),
            Path::new("f"),
            &ImageRecipe::default(),
            &request(None),
        );
        let args = args_of(&cmd);
        assert!(!args.contains(&"-t".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/src/transfer-learning"));
    }

    #[test]
    fn test_missing_engine() {
        let mut req = request(None);
        req.engine = "no-such-container-engine-tlt".to_string();
        let err = build_image(&ImageRecipe::default(), &req).unwrap_err();
        assert!(matches!(
            err,
            ImageError::EngineNotFound(name) if name == "no-such-container-engine-tlt"
        ));
    }

    #[test]
    fn test_dry_run_does_not_need_engine() {
        let mut req = request(None);
        req.engine = "no-such-container-engine-tlt".to_string();
        req.dry_run = true;
        assert_eq!(build_image(&ImageRecipe::default(), &req).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_exit_code_is_returned() {
        let mut req = request(None);
        req.engine = "false".to_string();
        assert_eq!(build_image(&ImageRecipe::default(), &req).unwrap(), 1);
        req.engine = "true".to_string();
        assert_eq!(build_image(&ImageRecipe::default(), &req).unwrap(), 0);
    }
}
