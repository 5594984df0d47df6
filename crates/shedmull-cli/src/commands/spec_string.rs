//! `shedmull spec-string`: Print a tool's spec string and image name.

use clap::Args;
use shedmull_engine::engine::Engine;

use super::{ConfigArgs, ToolArgs};
use crate::output;

/// Arguments for the `spec-string` command.
#[derive(Args, Debug)]
pub struct SpecStringArgs {
    /// Tool to resolve.
    #[command(flatten)]
    pub tool: ToolArgs,

    /// Services and naming scheme.
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Executes the `spec-string` command.
///
/// # Errors
///
/// Returns an error if resolution fails or the ToolShed has no matching
/// revision.
pub fn execute(args: SpecStringArgs) -> anyhow::Result<()> {
    let config = args.config.to_config();
    let tool = args.tool.to_reference(&config.toolshed);
    let engine = Engine::new(&config);
    let resolution = engine.resolve(&tool)?;

    output::print_warnings(&resolution.warnings);
    if resolution.targets.is_none() {
        anyhow::bail!("no downloadable revision {} of {}/{}", tool.revision, tool.owner, tool.name);
    }
    let image = resolution
        .image
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    println!("{} {image}", resolution.spec);
    Ok(())
}
