//! Global configuration model for shedmull.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::types::MulledVersion;

/// Root configuration shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShedmullConfig {
    /// ToolShed host used when a tool reference names none.
    pub toolshed: String,
    /// Base URL of the image depot.
    pub depot_url: String,
    /// Image naming scheme.
    pub mulled_version: MulledVersion,
    /// Package index executable.
    pub conda_bin: PathBuf,
    /// Channels passed to the package index search, in priority order.
    pub conda_channels: Vec<String>,
    /// External image build tool.
    pub mulled_build_bin: PathBuf,
}

impl Default for ShedmullConfig {
    fn default() -> Self {
        Self {
            toolshed: constants::DEFAULT_TOOLSHED.to_string(),
            depot_url: constants::DEFAULT_DEPOT_URL.to_string(),
            mulled_version: MulledVersion::default(),
            conda_bin: PathBuf::from(constants::DEFAULT_CONDA_BIN),
            conda_channels: Vec::new(),
            mulled_build_bin: PathBuf::from(constants::DEFAULT_MULLED_BUILD_BIN),
        }
    }
}

/// What the Image Acquirer may do for each tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquireOptions {
    /// Re-download or rebuild even if the image file already exists.
    pub force: bool,
    /// Resolve and report only; no download and no build.
    pub list_only: bool,
    /// Fall back to the external build tool when the depot has no image.
    pub build_images: bool,
    /// Log a failed tool and carry on with the next one.
    pub continue_after_failure: bool,
}
