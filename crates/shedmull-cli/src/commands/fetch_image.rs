//! `shedmull fetch-image`: Download or build the image of one tool.

use std::path::PathBuf;

use clap::Args;
use shedmull_engine::engine::Engine;

use super::{AcquireArgs, ConfigArgs, ToolArgs};
use crate::output;

/// Arguments for the `fetch-image` command.
#[derive(Args, Debug)]
pub struct FetchImageArgs {
    /// Tool to fetch.
    #[command(flatten)]
    pub tool: ToolArgs,

    /// Directory images are stored in.
    pub image_dir: PathBuf,

    /// Acquisition flags.
    #[command(flatten)]
    pub acquire: AcquireArgs,

    /// Services and naming scheme.
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Executes the `fetch-image` command.
///
/// # Errors
///
/// Returns an error if resolution, download or build fails.
pub fn execute(args: FetchImageArgs) -> anyhow::Result<()> {
    let config = args.config.to_config();
    let tool = args.tool.to_reference(&config.toolshed);
    let engine = Engine::new(&config);
    let report = engine.run_tools(&[tool], &args.image_dir, args.acquire.into())?;
    output::print_report(&report);
    Ok(())
}
