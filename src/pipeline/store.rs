//! Upload store: persist an inbound byte stream under its original filename.
//!
//! The filename is the storage key. A second upload with the same name
//! overwrites the first, and concurrent same-name uploads race with the last
//! writer winning. Only the final path component of the client-supplied name
//! is used, so a name like `../../etc/passwd` lands inside the upload
//! directory as `passwd`.

use crate::error::CertScanError;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, info};

/// Writes uploads into a single flat directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an upload named `file_name` is stored at.
    pub fn path_for(&self, file_name: &str) -> Result<PathBuf, CertScanError> {
        let base = Path::new(file_name)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CertScanError::InvalidFileName {
                file_name: file_name.to_string(),
            })?;
        Ok(self.dir.join(base))
    }

    /// Stream `reader` to `<dir>/<file_name>`, creating the directory if needed.
    ///
    /// Any existing file with the same name is truncated and replaced.
    pub async fn save<R>(&self, file_name: &str, reader: &mut R) -> Result<PathBuf, CertScanError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.path_for(file_name)?;
        let storage_err = |source| CertScanError::Storage {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(storage_err)?;

        let mut file = tokio::fs::File::create(&path).await.map_err(storage_err)?;
        let written = tokio::io::copy(reader, &mut file)
            .await
            .map_err(storage_err)?;
        file.flush().await.map_err(storage_err)?;

        debug!("Wrote {} bytes to {}", written, path.display());
        info!("Stored upload: {}", path.display());
        Ok(path)
    }
}
