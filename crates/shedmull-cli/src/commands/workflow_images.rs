//! `shedmull workflow-images`: Download or build images for a workflow.

use std::path::PathBuf;

use clap::Args;
use shedmull_engine::engine::Engine;

use super::{AcquireArgs, ConfigArgs};
use crate::output;

/// Arguments for the `workflow-images` command.
#[derive(Args, Debug)]
pub struct WorkflowImagesArgs {
    /// Galaxy workflow (`.ga` JSON or gxformat2 YAML).
    pub workflow_file: PathBuf,

    /// Directory images are stored in.
    pub image_dir: PathBuf,

    /// Acquisition flags.
    #[command(flatten)]
    pub acquire: AcquireArgs,

    /// Services and naming scheme.
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Executes the `workflow-images` command.
///
/// # Errors
///
/// Returns an error if the workflow cannot be read, or a tool fails without
/// `--continue_after_failure`.
pub fn execute(args: WorkflowImagesArgs) -> anyhow::Result<()> {
    let config = args.config.to_config();
    let engine = Engine::new(&config);
    tracing::info!(workflow = %args.workflow_file.display(), "processing workflow");
    let report = engine.run_workflow(&args.workflow_file, &args.image_dir, args.acquire.into())?;
    output::print_report(&report);
    Ok(())
}
