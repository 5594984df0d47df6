//! Requirement resolution against the ToolShed.
//!
//! Picks the downloadable metadata entry for the requested revision, then
//! the installable tool within it, and turns that tool's package
//! requirements into unrefined package targets. Ambiguity is reported as
//! a warning, never as an error.

use shedmull_common::error::Result;
use shedmull_common::types::{PackageTarget, Requirement, Resolved, ResolutionWarning, ToolReference};

use crate::toolshed::{RevisionInfo, ToolShedApi, ValidTool, parse_install_info};

/// Queries the ToolShed and selects the tool's package targets.
///
/// # Errors
///
/// Returns an error only if the ToolShed query itself fails.
pub fn resolve_requirements(
    api: &dyn ToolShedApi,
    tool: &ToolReference,
) -> Result<Resolved<Option<Vec<PackageTarget>>>> {
    let raw = api.repository_revision_install_info(
        &tool.toolshed,
        &tool.name,
        &tool.owner,
        &tool.revision,
    )?;
    Ok(select_targets(tool, &parse_install_info(&raw)))
}

/// Selects package targets from parsed revision metadata.
///
/// Returns `None` when no downloadable entry with installable tools matches
/// the requested revision.
#[must_use]
pub fn select_targets(
    tool: &ToolReference,
    revisions: &[RevisionInfo],
) -> Resolved<Option<Vec<PackageTarget>>> {
    let Some(valid_tools) = revisions.iter().find_map(|r| {
        let matches = r.downloadable && r.changeset_revision.as_deref() == Some(&tool.revision);
        if matches { r.valid_tools.as_deref() } else { None }
    }) else {
        tracing::info!(tool = %tool, "no downloadable revision matches");
        return Resolved::clean(None);
    };

    let candidates: Vec<&ValidTool> = match &tool.tool_id {
        Some(id) => valid_tools.iter().filter(|t| t.matches(id)).collect(),
        None => valid_tools.iter().collect(),
    };

    let mut resolved = Resolved::clean(Some(Vec::new()));
    let Some(chosen) = candidates.first() else {
        tracing::warn!(tool = %tool, "no matching installable tool");
        resolved.warn(ResolutionWarning::NoMatchingTool {
            tool: tool.to_string(),
        });
        return resolved;
    };
    if candidates.len() > 1 {
        tracing::warn!(tool = %tool, candidates = candidates.len(), "more than one matching tool");
        resolved.warn(ResolutionWarning::AmbiguousTool {
            tool: tool.to_string(),
            candidates: candidates.len(),
        });
    }

    let targets: Vec<PackageTarget> = chosen
        .requirements
        .iter()
        .filter(|r| r.is_package())
        .map(|r| PackageTarget::from(&Requirement::from(r)))
        .collect();
    tracing::debug!(tool = %tool, tool_id = %chosen.id, targets = targets.len(), "selected tool");
    resolved.value = Some(targets);
    resolved
}
