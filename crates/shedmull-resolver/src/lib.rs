//! # shedmull-resolver
//!
//! Turns a ToolShed tool reference into a set of pinned package targets.
//!
//! Handles:
//! - **ToolShed**: The install-info API and its response model.
//! - **Requirements**: Selecting the installable tool and its requirements.
//! - **Conda**: Pinning a single-package target to its newest build.
//! - **Spec**: Rendering targets as a `name=version` spec string.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod conda;
pub mod requirements;
pub mod spec;
pub mod toolshed;

use shedmull_common::error::Result;
use shedmull_common::types::{PackageTarget, Resolved, ToolReference};

use crate::conda::PackageIndex;
use crate::toolshed::ToolShedApi;

/// Resolves a tool to its package targets, pinning single-package tools
/// against the package index.
///
/// The value is `None` when the ToolShed has no downloadable revision
/// matching the tool's revision.
///
/// # Errors
///
/// Returns an error if the ToolShed or the package index cannot be queried.
pub fn resolve_tool_targets(
    toolshed: &dyn ToolShedApi,
    index: &dyn PackageIndex,
    tool: &ToolReference,
) -> Result<Resolved<Option<Vec<PackageTarget>>>> {
    let resolved = requirements::resolve_requirements(toolshed, tool)?;
    let Resolved {
        value,
        mut warnings,
    } = resolved;
    let Some(targets) = value else {
        return Ok(Resolved {
            value: None,
            warnings,
        });
    };
    let augmented = conda::augment_targets(index, targets)?;
    warnings.extend(augmented.warnings);
    Ok(Resolved {
        value: Some(augmented.value),
        warnings,
    })
}
