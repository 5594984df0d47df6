//! `shedmull toolshed-info`: Dump the ToolShed install info of a revision.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use shedmull_common::constants;
use shedmull_resolver::toolshed::{HttpToolShed, ToolShedApi};

/// Arguments for the `toolshed-info` command.
#[derive(Args, Debug)]
pub struct ToolshedInfoArgs {
    /// Repository name.
    pub tool_name: String,
    /// Repository owner.
    pub tool_author: String,
    /// Changeset revision.
    pub tool_revision: String,

    /// ToolShed host.
    #[arg(long, env = "SHEDMULL_TOOLSHED", default_value = constants::DEFAULT_TOOLSHED)]
    pub toolshed: String,

    /// Write the JSON here instead of stdout.
    #[arg(long = "output_file")]
    pub output_file: Option<PathBuf>,
}

/// Executes the `toolshed-info` command.
///
/// # Errors
///
/// Returns an error if the ToolShed cannot be queried or the output cannot
/// be written.
pub fn execute(args: ToolshedInfoArgs) -> anyhow::Result<()> {
    let info = HttpToolShed::new().repository_revision_install_info(
        &args.toolshed,
        &args.tool_name,
        &args.tool_author,
        &args.tool_revision,
    )?;
    let mut text = to_indented_json(&info)?;
    text.push('\n');

    match &args.output_file {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(text.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}

/// Serializes with four-space indentation.
fn to_indented_json(value: &impl Serialize) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_indented_with_four_spaces() {
        let text = to_indented_json(&serde_json::json!([{"downloadable": true}])).expect("json");
        assert_eq!(text, "[\n    {\n        \"downloadable\": true\n    }\n]");
    }
}
