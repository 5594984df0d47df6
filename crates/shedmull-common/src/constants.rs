//! System-wide constants and defaults.

/// ToolShed queried when a workflow step or the CLI names none.
pub const DEFAULT_TOOLSHED: &str = "toolshed.g2.bx.psu.edu";

/// Base URL of the Singularity image depot.
pub const DEFAULT_DEPOT_URL: &str = "https://depot.galaxyproject.org/singularity";

/// Default package index executable.
pub const DEFAULT_CONDA_BIN: &str = "conda";

/// Default external image build tool.
pub const DEFAULT_MULLED_BUILD_BIN: &str = "mulled-build";

/// Image build numbers probed on the depot for multi-package images,
/// in probe order.
///
/// Multi-package images have no conda build string to disambiguate them,
/// so the depot copy is located by guessing small build numbers.
pub const PROBED_IMAGE_BUILDS: [u32; 4] = [3, 2, 1, 0];

/// Permission bits for a freshly created image directory.
pub const IMAGE_DIR_MODE: u32 = 0o755;

/// Suffix of an in-flight depot download.
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = ".part";

/// Default tool panel section for repositories installed from a workflow.
pub const DEFAULT_PANEL_LABEL: &str = "Workbench Tools";

/// Galaxy API route that installs one repository revision.
pub const GALAXY_INSTALL_ROUTE: &str = "api/tool_shed_repositories/new/install_repository_revision";

/// ToolShed API route returning install information for a revision.
pub const TOOLSHED_INSTALL_INFO_ROUTE: &str = "api/repositories/get_repository_revision_install_info";
