//! Image acquisition.
//!
//! ```text
//! NotAttempted -> Downloading -> Downloaded
//!                             -> NotFound -> Building -> Built
//!                                                     -> BuildFailed
//! ```
//!
//! A single-package image is requested under its own name. Multi-package
//! images carry no conda build to pin them, so the depot is probed with
//! image builds 3, 2, 1, 0 in that order; a 404 moves on to the next
//! candidate, any other status ends probing.

use std::fmt;
use std::path::PathBuf;

use shedmull_common::config::AcquireOptions;
use shedmull_common::constants::PROBED_IMAGE_BUILDS;
use shedmull_common::error::Result;
use shedmull_common::types::{ImageIdentifier, MulledVersion, PackageTarget};

use crate::build::{BuildStatus, ImageBuilder};
use crate::depot::{DepotResponse, ImageDepot};
use crate::naming::image_name;
use crate::storage::ImageStore;

/// Where an acquisition stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// Nothing tried yet.
    NotAttempted,
    /// Requests to the depot are in progress.
    Downloading,
    /// The image is on disk, downloaded now or earlier.
    Downloaded,
    /// No depot candidate could be downloaded.
    NotFound,
    /// The build tool is running.
    Building,
    /// The build tool succeeded.
    Built,
    /// The build tool failed.
    BuildFailed,
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotAttempted => "not attempted",
            Self::Downloading => "downloading",
            Self::Downloaded => "downloaded",
            Self::NotFound => "not found",
            Self::Building => "building",
            Self::Built => "built",
            Self::BuildFailed => "build failed",
        };
        f.write_str(s)
    }
}

/// Record of one acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    /// Final state.
    pub state: AcquisitionState,
    /// Image that ended up on disk, if any was downloaded, found or built.
    pub image: Option<ImageIdentifier>,
    /// Path of that image.
    pub path: Option<PathBuf>,
    /// Image build number of the successful candidate (multi-package only).
    pub image_build: Option<u32>,
    /// Depot requests issued.
    pub requests: usize,
    /// The image was already present and nothing was fetched.
    pub already_present: bool,
    /// Non-404 depot statuses seen, with the candidate that produced them.
    pub depot_failures: Vec<(ImageIdentifier, u16)>,
}

impl Acquisition {
    const fn new() -> Self {
        Self {
            state: AcquisitionState::NotAttempted,
            image: None,
            path: None,
            image_build: None,
            requests: 0,
            already_present: false,
            depot_failures: Vec::new(),
        }
    }

    fn advance(&mut self, next: AcquisitionState) {
        tracing::debug!(from = %self.state, to = %next, "acquisition state");
        self.state = next;
    }

    /// Whether the image is now available (downloaded, present or built).
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.state, AcquisitionState::Downloaded | AcquisitionState::Built)
    }
}

/// Depot name candidates for a target set, in probe order.
#[must_use]
pub fn candidates(version: MulledVersion, targets: &[PackageTarget]) -> Vec<(ImageIdentifier, Option<u32>)> {
    if targets.len() == 1 {
        return vec![(image_name(version, targets, None), None)];
    }
    PROBED_IMAGE_BUILDS
        .iter()
        .map(|build| {
            let build_str = build.to_string();
            (image_name(version, targets, Some(&build_str)), Some(*build))
        })
        .collect()
}

/// Downloads images from a depot into a store, building them when the
/// depot has none.
pub struct ImageAcquirer<'a> {
    depot: &'a dyn ImageDepot,
    builder: &'a dyn ImageBuilder,
    store: &'a ImageStore,
    version: MulledVersion,
    options: AcquireOptions,
}

impl<'a> ImageAcquirer<'a> {
    /// Creates an acquirer writing into `store`.
    #[must_use]
    pub fn new(
        depot: &'a dyn ImageDepot,
        builder: &'a dyn ImageBuilder,
        store: &'a ImageStore,
        version: MulledVersion,
        options: AcquireOptions,
    ) -> Self {
        Self {
            depot,
            builder,
            store,
            version,
            options,
        }
    }

    /// Acquires the image for `targets`; `spec` is handed to the build
    /// tool if it comes to that.
    ///
    /// A failed build is reported in the returned state, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failures, filesystem failures, or if
    /// the build tool cannot be started.
    pub fn acquire(&self, targets: &[PackageTarget], spec: &str) -> Result<Acquisition> {
        let mut acq = Acquisition::new();
        if targets.is_empty() {
            return Ok(acq);
        }
        let candidates = candidates(self.version, targets);

        if !self.options.force {
            if let Some((image, build)) = candidates.iter().find(|(image, _)| self.store.has_image(image)) {
                tracing::info!(%image, "image already present");
                acq.path = Some(self.store.image_path(image));
                acq.image = Some(image.clone());
                acq.image_build = *build;
                acq.already_present = true;
                acq.advance(AcquisitionState::Downloaded);
                return Ok(acq);
            }
        }

        acq.advance(AcquisitionState::Downloading);
        for (image, build) in &candidates {
            let path = self.store.image_path(image);
            acq.requests += 1;
            match self.depot.fetch(image, &path)? {
                DepotResponse::Downloaded { .. } => {
                    acq.image = Some(image.clone());
                    acq.path = Some(path);
                    acq.image_build = *build;
                    acq.advance(AcquisitionState::Downloaded);
                    return Ok(acq);
                }
                DepotResponse::NotFound => {}
                DepotResponse::Failed { status } => {
                    tracing::warn!(%image, status, "depot error, stopping probe");
                    acq.depot_failures.push((image.clone(), status));
                    break;
                }
            }
        }
        acq.advance(AcquisitionState::NotFound);

        if !self.options.build_images {
            tracing::info!(%spec, "no depot image and building is disabled");
            return Ok(acq);
        }

        if spec.is_empty() {
            tracing::warn!(targets = targets.len(), "no versioned package to build, skipping build");
            return Ok(acq);
        }

        acq.advance(AcquisitionState::Building);
        match self.builder.build(spec, self.store.root())? {
            BuildStatus::Succeeded => {
                // mulled-build names its output like the last probe candidate
                if let Some((image, build)) = candidates.last() {
                    acq.path = Some(self.store.image_path(image));
                    acq.image = Some(image.clone());
                    acq.image_build = *build;
                }
                acq.advance(AcquisitionState::Built);
            }
            BuildStatus::Failed { .. } => acq.advance(AcquisitionState::BuildFailed),
        }
        Ok(acq)
    }
}
