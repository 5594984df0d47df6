//! Local image directory.
//!
//! Images are plain files named by their image identifier, directly under
//! the configured directory.

use std::path::{Path, PathBuf};

use shedmull_common::error::{Result, ShedmullError};
use shedmull_common::types::ImageIdentifier;

/// The directory downloaded and built images are stored in.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Opens the store, creating the directory (mode 0755) if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, or the path
    /// exists and is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            tracing::info!(path = %root.display(), "creating image directory");
            create_dir(&root)?;
        } else if !root.is_dir() {
            return Err(ShedmullError::Config {
                message: format!("image directory {} is not a directory", root.display()),
            });
        }
        Ok(Self { root })
    }

    /// Returns the path an image is stored at.
    #[must_use]
    pub fn image_path(&self, image: &ImageIdentifier) -> PathBuf {
        self.root.join(image.as_str())
    }

    /// Checks whether an image file is already present.
    #[must_use]
    pub fn has_image(&self, image: &ImageIdentifier) -> bool {
        self.image_path(image).is_file()
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    use shedmull_common::constants::IMAGE_DIR_MODE;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(IMAGE_DIR_MODE)
        .create(path)
        .map_err(|e| ShedmullError::io(path, e))
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| ShedmullError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("images");
        let store = ImageStore::open(&root).expect("open");
        assert!(root.is_dir());
        assert_eq!(store.root(), root);
    }

    #[cfg(unix)]
    #[test]
    fn created_directory_has_mode_0755() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("images");
        let _store = ImageStore::open(&root).expect("open");
        let mode = std::fs::metadata(&root).expect("metadata").permissions().mode();
        // umask may only clear bits
        assert_eq!(mode & !0o755 & 0o777, 0);
        assert_eq!(mode & 0o700, 0o700);
    }

    #[test]
    fn open_rejects_regular_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").expect("write");
        assert!(ImageStore::open(&file).is_err());
    }

    #[test]
    fn image_path_uses_identifier_as_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ImageStore::open(dir.path()).expect("open");
        let image = ImageIdentifier::new("samtools:1.9--h91753b0_8");
        assert!(store.image_path(&image).ends_with("samtools:1.9--h91753b0_8"));
        assert!(!store.has_image(&image));
        std::fs::write(store.image_path(&image), b"sif").expect("write");
        assert!(store.has_image(&image));
    }
}
