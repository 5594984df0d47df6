//! External image builds via `mulled-build`.

use std::path::{Path, PathBuf};
use std::process::Command;

use shedmull_common::error::{Result, ShedmullError};

/// Exit result of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The build tool exited successfully.
    Succeeded,
    /// The build tool exited unsuccessfully.
    Failed {
        /// Exit code, `None` if killed by a signal.
        code: Option<i32>,
    },
}

/// Something that can build a Singularity image from a spec string.
pub trait ImageBuilder {
    /// Builds the packages in `spec` into `image_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the build tool cannot be started at all.
    fn build(&self, spec: &str, image_dir: &Path) -> Result<BuildStatus>;
}

/// Runs `mulled-build build-and-test` as a subprocess.
#[derive(Debug, Clone)]
pub struct MulledBuild {
    program: PathBuf,
}

impl MulledBuild {
    /// Uses the given executable name or path.
    #[must_use]
    pub const fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

/// Arguments passed to `mulled-build`.
#[must_use]
pub fn build_args(spec: &str, image_dir: &Path) -> Vec<String> {
    vec![
        "build-and-test".into(),
        "--test".into(),
        "echo".into(),
        "--singularity".into(),
        "--singularity-image-dir".into(),
        image_dir.display().to_string(),
        spec.into(),
    ]
}

impl ImageBuilder for MulledBuild {
    fn build(&self, spec: &str, image_dir: &Path) -> Result<BuildStatus> {
        let program = which::which(&self.program).map_err(|_| ShedmullError::NotFound {
            kind: "executable",
            id: self.program.display().to_string(),
        })?;
        tracing::info!(%spec, dir = %image_dir.display(), "building image");
        let status = Command::new(&program)
            .args(build_args(spec, image_dir))
            .status()
            .map_err(|e| ShedmullError::io(&program, e))?;
        if status.success() {
            Ok(BuildStatus::Succeeded)
        } else {
            tracing::error!(%spec, %status, "image build failed");
            Ok(BuildStatus::Failed {
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_end_with_spec_string() {
        let args = build_args("samtools=1.9,bwa=0.7.17", Path::new("/data/images"));
        assert_eq!(
            args,
            [
                "build-and-test",
                "--test",
                "echo",
                "--singularity",
                "--singularity-image-dir",
                "/data/images",
                "samtools=1.9,bwa=0.7.17"
            ]
        );
    }

    #[test]
    fn missing_executable_is_not_found() {
        let builder = MulledBuild::new(PathBuf::from("definitely-not-a-real-mulled-build"));
        let dir = tempfile::tempdir().expect("tempdir");
        let err = builder.build("pkg=1.0", dir.path()).unwrap_err();
        assert!(matches!(err, ShedmullError::NotFound { kind: "executable", .. }));
    }
}
