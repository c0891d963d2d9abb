use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tlt-harness - notebook smoke tests and container images for the Transfer Learning Tool
#[derive(Parser, Debug)]
#[command(name = "tlt-harness")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert and execute notebooks for a framework keyword, a notebook file or a directory
    RunNotebooks {
        /// `tensorflow`, `pytorch`, a .ipynb file or a directory of notebooks
        #[arg(value_name = "TARGET")]
        target: Option<String>,

        /// Cell tag to strip before execution (e.g. `remove_for_smoke_test`)
        #[arg(value_name = "TAG")]
        tag: Option<String>,

        /// Catalog YAML replacing the built-in framework collections
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Interpreter for generated scripts (default: ipython, python3, python)
        #[arg(long, value_name = "BIN")]
        interpreter: Option<String>,

        /// Stem of the script generated next to each notebook (default: notebook_test)
        #[arg(long, value_name = "STEM")]
        script_name: Option<String>,

        /// Exit 1 if any notebook failed instead of reporting the last one's status
        #[arg(long, default_value = "false")]
        strict: bool,

        /// Stop at the first failing notebook
        #[arg(long, default_value = "false")]
        fail_fast: bool,
    },

    /// Inspect notebooks without executing them
    #[command(subcommand)]
    Notebooks(NotebooksCommand),

    /// Render or build the runtime container image
    #[command(subcommand)]
    Image(ImageCommand),

    /// Container entry point: run `tlt train` configured by MODEL_NAME, DATASET_NAME and
    /// the DATASET_DIR, OUTPUT_DIR, EPOCHS defaults
    TrainEntry {
        /// Framework passed to `tlt train`
        #[arg(long, default_value = "tensorflow")]
        framework: String,

        /// Print the command instead of running it
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotebooksCommand {
    /// Show which notebooks a target resolves to
    List {
        #[arg(value_name = "TARGET")]
        target: String,

        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Print the resolution as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Convert one notebook to the script the runner would execute
    Convert {
        #[arg(value_name = "NOTEBOOK")]
        notebook: PathBuf,

        /// Strip cells carrying this tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Write to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Recipe sources shared by `image render` and `image build`.
#[derive(clap::Args, Debug)]
pub struct RecipeArgs {
    /// Recipe YAML; missing fields take the built-in defaults
    #[arg(long, value_name = "FILE")]
    pub recipe: Option<PathBuf>,

    /// Base image (default: from BASE_IMAGE or intel/intel-optimized-tensorflow)
    #[arg(long)]
    pub base_image: Option<String>,

    /// Base image tag (default: from BASE_TAG or latest)
    #[arg(long)]
    pub base_tag: Option<String>,

    /// Toolkit version baked into the wheel name (default: from TLT_VERSION or 0.2.0)
    #[arg(long)]
    pub tlt_version: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Print the two-stage Dockerfile
    Render {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Write to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build the image with the container engine
    Build {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Build context (toolkit source checkout)
        #[arg(long, value_name = "DIR", default_value = ".")]
        context: PathBuf,

        /// Image tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Container engine (default: from TLT_CONTAINER_ENGINE or docker)
        #[arg(long, value_name = "BIN")]
        engine: Option<String>,

        /// Print the Dockerfile and engine command without building
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },
}
