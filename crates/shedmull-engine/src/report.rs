//! Per-tool outcomes of a run.

use shedmull_common::types::{ImageIdentifier, PackageTarget, ResolutionWarning, ToolReference};
use shedmull_image::acquire::Acquisition;

/// Everything resolution produced for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResolution {
    /// Package targets, `None` if the ToolShed had no matching revision.
    pub targets: Option<Vec<PackageTarget>>,
    /// Spec string handed to the build tool.
    pub spec: String,
    /// Image name, `None` if there were no targets to name.
    pub image: Option<ImageIdentifier>,
    /// Warnings from resolution, pinning and spec rendering.
    pub warnings: Vec<ResolutionWarning>,
}

/// What happened to one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// Resolved and reported only.
    Listed,
    /// No downloadable revision matched.
    Unresolved,
    /// The tool declares no package requirements.
    NoPackages,
    /// Acquisition ran; see its state.
    Acquired(Acquisition),
    /// The tool failed and the run continued past it.
    Failed(String),
}

/// Outcome for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    /// The tool.
    pub tool: ToolReference,
    /// Its resolution, if resolution got that far.
    pub resolution: Option<ToolResolution>,
    /// Final status.
    pub status: ToolStatus,
}

impl ToolOutcome {
    /// Whether this tool counts as a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        match &self.status {
            ToolStatus::Failed(_) => true,
            ToolStatus::Acquired(acq) => !acq.succeeded(),
            _ => false,
        }
    }
}

/// Outcomes of a run, in tool order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per processed tool.
    pub outcomes: Vec<ToolOutcome>,
}

impl RunReport {
    /// Number of tools that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Number of tools whose image is now available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.status, ToolStatus::Acquired(acq) if acq.succeeded()))
            .count()
    }
}
