//! CLI command definitions and dispatch.

pub mod fetch_image;
pub mod install_tools;
pub mod spec_string;
pub mod toolshed_info;
pub mod workflow_images;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shedmull_common::config::{AcquireOptions, ShedmullConfig};
use shedmull_common::constants;
use shedmull_common::types::{MulledVersion, ToolReference};

/// shedmull: Galaxy workflow tools to mulled container images.
#[derive(Parser, Debug)]
#[command(name = "shedmull", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr.
    #[arg(long = "log_file", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the ToolShed install info of a repository revision as JSON.
    ToolshedInfo(toolshed_info::ToolshedInfoArgs),
    /// Print the spec string and image name of a tool.
    SpecString(spec_string::SpecStringArgs),
    /// Download or build the image of a single tool.
    FetchImage(fetch_image::FetchImageArgs),
    /// Download or build the images of every tool in a workflow.
    WorkflowImages(workflow_images::WorkflowImagesArgs),
    /// Install a workflow's ToolShed repositories into a Galaxy server.
    InstallTools(install_tools::InstallToolsArgs),
}

/// Service locations and naming scheme, shared by the resolving commands.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// ToolShed host used when a workflow step names none.
    #[arg(long, env = "SHEDMULL_TOOLSHED", default_value = constants::DEFAULT_TOOLSHED)]
    pub toolshed: String,

    /// Base URL of the Singularity image depot.
    #[arg(long = "depot_url", env = "SHEDMULL_DEPOT_URL", default_value = constants::DEFAULT_DEPOT_URL)]
    pub depot_url: String,

    /// Mulled image naming scheme (v1 or v2).
    #[arg(long = "mulled_version", default_value = "v2")]
    pub mulled_version: MulledVersion,

    /// conda executable used for build lookups.
    #[arg(long, env = "SHEDMULL_CONDA", default_value = constants::DEFAULT_CONDA_BIN)]
    pub conda: PathBuf,

    /// Channels searched for conda builds (comma-separated).
    #[arg(long = "conda_channels", env = "SHEDMULL_CONDA_CHANNELS", value_delimiter = ',')]
    pub conda_channels: Vec<String>,

    /// mulled-build executable.
    #[arg(long = "mulled_build", env = "SHEDMULL_MULLED_BUILD", default_value = constants::DEFAULT_MULLED_BUILD_BIN)]
    pub mulled_build: PathBuf,
}

impl ConfigArgs {
    /// Builds the runtime configuration.
    pub fn to_config(&self) -> ShedmullConfig {
        ShedmullConfig {
            toolshed: self.toolshed.clone(),
            depot_url: self.depot_url.clone(),
            mulled_version: self.mulled_version,
            conda_bin: self.conda.clone(),
            conda_channels: self.conda_channels.clone(),
            mulled_build_bin: self.mulled_build.clone(),
        }
    }
}

/// Positional tool identification.
#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    /// Repository name.
    pub tool_name: String,
    /// Repository owner.
    pub tool_author: String,
    /// Changeset revision.
    pub tool_revision: String,
    /// Tool id within the repository.
    #[arg(long = "tool_id")]
    pub tool_id: Option<String>,
}

impl ToolArgs {
    /// Builds the tool reference on `toolshed`.
    pub fn to_reference(&self, toolshed: &str) -> ToolReference {
        ToolReference {
            name: self.tool_name.clone(),
            owner: self.tool_author.clone(),
            revision: self.tool_revision.clone(),
            toolshed: toolshed.to_string(),
            tool_id: self.tool_id.clone(),
        }
    }
}

/// Flags controlling image acquisition.
#[derive(Args, Debug, Clone, Copy)]
pub struct AcquireArgs {
    /// Download or build even if the image file already exists.
    #[arg(long)]
    pub force: bool,

    /// Only resolve and print spec strings and image names.
    #[arg(long = "list_only")]
    pub list_only: bool,

    /// Do not build images missing from the depot.
    #[arg(long = "no-build-images")]
    pub no_build_images: bool,

    /// Log failed tools and continue with the next one.
    #[arg(short = 'C', long = "continue_after_failure")]
    pub continue_after_failure: bool,
}

impl From<AcquireArgs> for AcquireOptions {
    fn from(args: AcquireArgs) -> Self {
        Self {
            force: args.force,
            list_only: args.list_only,
            build_images: !args.no_build_images,
            continue_after_failure: args.continue_after_failure,
        }
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::ToolshedInfo(args) => toolshed_info::execute(args),
        Command::SpecString(args) => spec_string::execute(args),
        Command::FetchImage(args) => fetch_image::execute(args),
        Command::WorkflowImages(args) => workflow_images::execute(args),
        Command::InstallTools(args) => install_tools::execute(args),
    }
}
