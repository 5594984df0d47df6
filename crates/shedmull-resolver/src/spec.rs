//! Spec string rendering.
//!
//! The build tool takes packages as a comma-joined `name=version` list.

use shedmull_common::types::{PackageTarget, Resolved, ResolutionWarning};

/// Renders targets as a spec string.
///
/// Unversioned targets are left out and reported as warnings.
#[must_use]
pub fn spec_string(targets: &[PackageTarget]) -> Resolved<String> {
    let mut resolved = Resolved::clean(String::new());
    let mut parts = Vec::with_capacity(targets.len());
    for target in targets {
        match &target.version {
            Some(version) => parts.push(format!("{}={version}", target.package_name)),
            None => {
                tracing::warn!(package = %target.package_name, "unversioned requirement left out of spec string");
                resolved.warn(ResolutionWarning::UnversionedRequirement {
                    package: target.package_name.clone(),
                });
            }
        }
    }
    resolved.value = parts.join(",");
    resolved
}
