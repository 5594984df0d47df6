//! Run engine that takes tools from reference to image.

use std::path::Path;

use shedmull_common::config::{AcquireOptions, ShedmullConfig};
use shedmull_common::error::{Result, ShedmullError};
use shedmull_common::types::{MulledVersion, Resolved, ToolReference};
use shedmull_image::acquire::{AcquisitionState, ImageAcquirer};
use shedmull_image::build::{ImageBuilder, MulledBuild};
use shedmull_image::depot::{HttpDepot, ImageDepot};
use shedmull_image::naming::image_name;
use shedmull_image::storage::ImageStore;
use shedmull_resolver::conda::{CondaCli, PackageIndex};
use shedmull_resolver::spec::spec_string;
use shedmull_resolver::toolshed::{HttpToolShed, ToolShedApi};

use crate::report::{RunReport, ToolOutcome, ToolResolution, ToolStatus};

/// Coordinates the ToolShed, the package index, the depot and the build
/// tool for a run.
///
/// All four are trait objects so runs can be exercised without network or
/// subprocesses.
pub struct Engine {
    toolshed: Box<dyn ToolShedApi>,
    index: Box<dyn PackageIndex>,
    depot: Box<dyn ImageDepot>,
    builder: Box<dyn ImageBuilder>,
    default_toolshed: String,
    mulled_version: MulledVersion,
}

impl Engine {
    /// Creates an engine talking to the real services named in `config`.
    #[must_use]
    pub fn new(config: &ShedmullConfig) -> Self {
        Self {
            toolshed: Box::new(HttpToolShed::new()),
            index: Box::new(CondaCli::new(
                config.conda_bin.clone(),
                config.conda_channels.clone(),
            )),
            depot: Box::new(HttpDepot::new(config.depot_url.clone())),
            builder: Box::new(MulledBuild::new(config.mulled_build_bin.clone())),
            default_toolshed: config.toolshed.clone(),
            mulled_version: config.mulled_version,
        }
    }

    /// Creates an engine over caller-supplied backends.
    #[must_use]
    pub fn with_backends(
        toolshed: Box<dyn ToolShedApi>,
        index: Box<dyn PackageIndex>,
        depot: Box<dyn ImageDepot>,
        builder: Box<dyn ImageBuilder>,
        config: &ShedmullConfig,
    ) -> Self {
        Self {
            toolshed,
            index,
            depot,
            builder,
            default_toolshed: config.toolshed.clone(),
            mulled_version: config.mulled_version,
        }
    }

    /// Resolves a tool to its targets, spec string and image name.
    ///
    /// # Errors
    ///
    /// Returns an error if the ToolShed or the package index cannot be
    /// queried.
    pub fn resolve(&self, tool: &ToolReference) -> Result<ToolResolution> {
        let Resolved {
            value: targets,
            mut warnings,
        } = shedmull_resolver::resolve_tool_targets(self.toolshed.as_ref(), self.index.as_ref(), tool)?;

        let Some(targets) = targets else {
            return Ok(ToolResolution {
                targets: None,
                spec: String::new(),
                image: None,
                warnings,
            });
        };
        let spec = spec_string(&targets);
        warnings.extend(spec.warnings);
        let image = (!targets.is_empty()).then(|| image_name(self.mulled_version, &targets, None));
        if let Some(image) = &image {
            tracing::info!(tool = %tool, spec = %spec.value, %image, "resolved tool");
        }
        Ok(ToolResolution {
            targets: Some(targets),
            spec: spec.value,
            image,
            warnings,
        })
    }

    /// Loads a workflow and processes every tool step in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the workflow cannot be loaded, the image
    /// directory cannot be created, or a tool fails while
    /// `continue_after_failure` is off.
    pub fn run_workflow(
        &self,
        workflow_path: &Path,
        image_dir: &Path,
        options: AcquireOptions,
    ) -> Result<RunReport> {
        let workflow = shedmull_workflow::document::load_workflow(workflow_path)?;
        let tools = shedmull_workflow::parser::parse_tool_references(&workflow, &self.default_toolshed);
        self.run_tools(&tools, image_dir, options)
    }

    /// Processes tools in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the image directory cannot be created, or a
    /// tool fails while `continue_after_failure` is off.
    pub fn run_tools(
        &self,
        tools: &[ToolReference],
        image_dir: &Path,
        options: AcquireOptions,
    ) -> Result<RunReport> {
        let store = if options.list_only {
            None
        } else {
            Some(ImageStore::open(image_dir)?)
        };
        let mut report = RunReport::default();
        for tool in tools {
            match self.process_tool(tool, store.as_ref(), options) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) if options.continue_after_failure => {
                    tracing::error!(tool = %tool, error = %e, "tool failed, continuing");
                    report.outcomes.push(ToolOutcome {
                        tool: tool.clone(),
                        resolution: None,
                        status: ToolStatus::Failed(e.to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            tools = report.outcomes.len(),
            available = report.available(),
            failures = report.failures(),
            "run finished"
        );
        Ok(report)
    }

    fn process_tool(
        &self,
        tool: &ToolReference,
        store: Option<&ImageStore>,
        options: AcquireOptions,
    ) -> Result<ToolOutcome> {
        let resolution = self.resolve(tool)?;
        let status = match (&resolution.targets, store) {
            (None, _) => ToolStatus::Unresolved,
            (Some(targets), _) if targets.is_empty() => ToolStatus::NoPackages,
            (Some(_), None) => ToolStatus::Listed,
            (Some(targets), Some(store)) => {
                let acquirer = ImageAcquirer::new(
                    self.depot.as_ref(),
                    self.builder.as_ref(),
                    store,
                    self.mulled_version,
                    options,
                );
                let acq = acquirer.acquire(targets, &resolution.spec)?;
                if acq.state == AcquisitionState::BuildFailed {
                    if !options.continue_after_failure {
                        return Err(ShedmullError::Subprocess {
                            program: "mulled-build".into(),
                            message: format!("build failed for {}", resolution.spec),
                        });
                    }
                    tracing::error!(tool = %tool, spec = %resolution.spec, "BUILD FAILED, skipping");
                }
                ToolStatus::Acquired(acq)
            }
        };
        Ok(ToolOutcome {
            tool: tool.clone(),
            resolution: Some(resolution),
            status,
        })
    }
}
