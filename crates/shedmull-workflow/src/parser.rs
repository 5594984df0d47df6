//! Step-dictionary parsing into tool references.
//!
//! A step contributes a [`ToolReference`] only when it carries a
//! `tool_shed_repository` block with `name`, `owner` and
//! `changeset_revision`. Anything else (inputs, built-in tools, pauses,
//! malformed blocks) is skipped; one bad step never fails the parse.

use serde_json::Value;
use shedmull_common::types::ToolReference;

use crate::steps::workflow_steps;

/// Extracts one tool reference per ToolShed tool step, in step order.
///
/// Steps whose repository block omits `tool_shed` are attributed to
/// `default_toolshed`.
#[must_use]
pub fn parse_tool_references(workflow: &Value, default_toolshed: &str) -> Vec<ToolReference> {
    let references: Vec<ToolReference> = workflow_steps(workflow)
        .into_iter()
        .filter_map(|step| tool_reference(step, default_toolshed))
        .collect();
    tracing::info!(tools = references.len(), "parsed workflow tool references");
    references
}

/// Builds the tool reference for a single step, if it names a ToolShed tool.
#[must_use]
pub fn tool_reference(step: &Value, default_toolshed: &str) -> Option<ToolReference> {
    let repo = step.get("tool_shed_repository")?;
    let (Some(name), Some(owner), Some(revision)) = (
        str_field(repo, "name"),
        str_field(repo, "owner"),
        str_field(repo, "changeset_revision"),
    ) else {
        tracing::debug!(step = %step_label(step), "skipping step with incomplete repository");
        return None;
    };
    let toolshed = str_field(repo, "tool_shed").unwrap_or(default_toolshed);
    Some(ToolReference {
        name: name.to_string(),
        owner: owner.to_string(),
        revision: revision.to_string(),
        toolshed: toolshed.to_string(),
        tool_id: str_field(step, "tool_id").map(short_tool_id),
    })
}

/// Reduces a ToolShed GUID (`host/repos/owner/name/tool_id/version`) to
/// its tool id. Ids that are not GUIDs are returned unchanged.
#[must_use]
pub fn short_tool_id(tool_id: &str) -> String {
    let parts: Vec<&str> = tool_id.split('/').collect();
    if parts.len() >= 5 && parts[1] == "repos" {
        parts[4].to_string()
    } else {
        tool_id.to_string()
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn step_label(step: &Value) -> String {
    step.get("label")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| step.get("id").map(ToString::to_string))
        .unwrap_or_default()
}
