//! Persisted default image name

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{K8aError, Result};
use crate::image::ImageRef;

/// Read/write access to the single default image name.
///
/// There is no locking; concurrent writers race and the last one wins.
pub trait DefaultImageStore: Send + Sync {
    /// The stored name with surrounding whitespace removed.
    /// Fails with [`K8aError::NoDefaultImage`] when nothing is stored.
    fn read(&self) -> Result<String>;

    fn write(&self, image: &ImageRef) -> Result<()>;
}

/// Default image kept as one line in a text file
#[derive(Debug, Clone)]
pub struct FileImageStore {
    path: PathBuf,
}

impl FileImageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DefaultImageStore for FileImageStore {
    fn read(&self) -> Result<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(K8aError::NoDefaultImage {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(K8aError::io(&self.path, e)),
        };

        let image = content.trim();
        if image.is_empty() {
            return Err(K8aError::NoDefaultImage {
                path: self.path.clone(),
            });
        }
        Ok(image.to_string())
    }

    fn write(&self, image: &ImageRef) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| K8aError::io(parent, e))?;
        }
        // write-then-rename so readers see either the old or the new name
        let tmp = self.temp_path();
        std::fs::write(&tmp, format!("{}\n", image)).map_err(|e| K8aError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| K8aError::io(&self.path, e))?;
        debug!("Stored default image {} in {}", image, self.path.display());
        Ok(())
    }
}
