//! `shedmull install-tools`: Install a workflow's repositories into Galaxy.

use std::path::PathBuf;

use clap::Args;
use shedmull_common::constants;
use shedmull_workflow::galaxy::{GalaxyClient, install_all};
use shedmull_workflow::install_list::{to_tool_list_yaml, tool_install_list};

/// Arguments for the `install-tools` command.
#[derive(Args, Debug)]
pub struct InstallToolsArgs {
    /// Galaxy workflow (`.ga` JSON or gxformat2 YAML).
    pub workflow_file: PathBuf,

    /// Galaxy server URL.
    pub galaxy_url: String,

    /// Galaxy API key.
    pub api_key: String,

    /// Tool panel section to install into.
    #[arg(long = "panel_label", default_value = constants::DEFAULT_PANEL_LABEL)]
    pub panel_label: String,

    /// ToolShed used for steps that name none.
    #[arg(long, env = "SHEDMULL_TOOLSHED", default_value = constants::DEFAULT_TOOLSHED)]
    pub toolshed: String,

    /// Print the tool list as YAML instead of installing.
    #[arg(long = "list_only")]
    pub list_only: bool,
}

/// Executes the `install-tools` command.
///
/// # Errors
///
/// Returns an error if the workflow cannot be read or any install fails.
pub fn execute(args: InstallToolsArgs) -> anyhow::Result<()> {
    let workflow = shedmull_workflow::document::load_workflow(&args.workflow_file)?;
    let repos = tool_install_list(&workflow, &args.panel_label, &args.toolshed);

    if args.list_only {
        print!("{}", to_tool_list_yaml(&repos)?);
        return Ok(());
    }

    let client = GalaxyClient::new(&args.galaxy_url, &args.api_key);
    let summary = install_all(&client, &repos);
    eprintln!(
        "Installed {}, already present {}, failed {}",
        summary.installed,
        summary.skipped,
        summary.failed.len()
    );
    for (repo, error) in &summary.failed {
        eprintln!("  {repo}: {error}");
    }
    if !summary.failed.is_empty() {
        anyhow::bail!("{} repository installs failed", summary.failed.len());
    }
    Ok(())
}
