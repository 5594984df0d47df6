//! Pre-built image depot.
//!
//! The depot serves one file per image identifier at
//! `{base_url}/{image_identifier}`.

use std::fs::File;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use shedmull_common::constants::PARTIAL_DOWNLOAD_SUFFIX;
use shedmull_common::error::{Result, ShedmullError};
use shedmull_common::types::ImageIdentifier;

/// Outcome of one depot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepotResponse {
    /// The image was written to the destination.
    Downloaded {
        /// Bytes written.
        bytes: u64,
    },
    /// The depot has no such image (HTTP 404).
    NotFound,
    /// The depot answered with another non-success status.
    Failed {
        /// HTTP status code.
        status: u16,
    },
}

/// A source of pre-built images.
pub trait ImageDepot {
    /// Downloads `image` to `dest`.
    ///
    /// Nothing is left at `dest` unless the response is `Downloaded`.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure or if the file cannot be
    /// written.
    fn fetch(&self, image: &ImageIdentifier, dest: &Path) -> Result<DepotResponse>;
}

/// Depot reached over HTTP(S).
#[derive(Debug)]
pub struct HttpDepot {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpDepot {
    /// Creates a depot client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Returns the URL of an image.
    #[must_use]
    pub fn image_url(&self, image: &ImageIdentifier) -> String {
        format!("{}/{image}", self.base_url)
    }
}

impl ImageDepot for HttpDepot {
    fn fetch(&self, image: &ImageIdentifier, dest: &Path) -> Result<DepotResponse> {
        let url = self.image_url(image);
        tracing::info!(%url, "downloading image from depot");
        let mut response = self.http.get(&url).send().map_err(|e| ShedmullError::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                tracing::debug!(%url, "image not on depot");
                return Ok(DepotResponse::NotFound);
            }
            status => {
                tracing::warn!(%url, status = status.as_u16(), "depot request failed");
                return Ok(DepotResponse::Failed {
                    status: status.as_u16(),
                });
            }
        }

        let partial = partial_path(dest);
        let mut file = File::create(&partial).map_err(|e| ShedmullError::io(&partial, e))?;
        let bytes = match response.copy_to(&mut file) {
            Ok(bytes) => bytes,
            Err(e) => {
                drop(file);
                let _ = std::fs::remove_file(&partial);
                return Err(ShedmullError::Http {
                    url,
                    message: format!("failed to read response body: {e}"),
                });
            }
        };
        drop(file);
        std::fs::rename(&partial, dest).map_err(|e| ShedmullError::io(dest, e))?;

        #[allow(clippy::cast_precision_loss)]
        let mib = bytes as f64 / 1_048_576.0;
        tracing::info!(path = %dest.display(), size_mib = %format!("{mib:.1}"), "image downloaded");
        Ok(DepotResponse::Downloaded { bytes })
    }
}

/// In-flight download path next to `dest`.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(PARTIAL_DOWNLOAD_SUFFIX);
    dest.with_file_name(name)
}
