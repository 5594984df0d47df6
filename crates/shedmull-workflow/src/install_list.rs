//! Repository install lists.
//!
//! Groups a workflow's ToolShed steps by repository, collecting every
//! revision the workflow pins. This is the shape Galaxy's installer (and
//! the ephemeris tool-list YAML) expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shedmull_common::error::{Result, ShedmullError};

use crate::parser::tool_reference;
use crate::steps::workflow_steps;

/// A repository to install, with every revision a workflow uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInstall {
    /// Repository name.
    pub name: String,
    /// Repository owner.
    pub owner: String,
    /// ToolShed URL, including scheme.
    pub tool_shed_url: String,
    /// Tool panel section the tools are installed under.
    pub tool_panel_section_label: String,
    /// Changeset revisions, first-seen order, no duplicates.
    pub revisions: Vec<String>,
}

/// Container for serializing an install list as a tool-list document.
#[derive(Debug, Serialize)]
struct ToolList<'a> {
    tools: &'a [RepositoryInstall],
}

/// Builds the grouped install list for a workflow.
#[must_use]
pub fn tool_install_list(
    workflow: &Value,
    panel_label: &str,
    default_toolshed: &str,
) -> Vec<RepositoryInstall> {
    let mut repos: Vec<RepositoryInstall> = Vec::new();
    for tool in workflow_steps(workflow)
        .into_iter()
        .filter_map(|step| tool_reference(step, default_toolshed))
    {
        let url = format!("https://{}", tool.toolshed);
        if let Some(existing) = repos
            .iter_mut()
            .find(|r| r.name == tool.name && r.owner == tool.owner && r.tool_shed_url == url)
        {
            if !existing.revisions.contains(&tool.revision) {
                existing.revisions.push(tool.revision);
            }
            continue;
        }
        repos.push(RepositoryInstall {
            name: tool.name,
            owner: tool.owner,
            tool_shed_url: url,
            tool_panel_section_label: panel_label.to_string(),
            revisions: vec![tool.revision],
        });
    }
    tracing::info!(repositories = repos.len(), "built repository install list");
    repos
}

/// Renders an install list as a `tools:` YAML document.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn to_tool_list_yaml(repos: &[RepositoryInstall]) -> Result<String> {
    serde_yaml::to_string(&ToolList { tools: repos }).map_err(|e| ShedmullError::Yaml {
        message: e.to_string(),
    })
}
