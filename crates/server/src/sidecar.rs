//! Image sidecar store.
//!
//! A flat JSON array of [`ImageRecord`]s kept next to the uploaded files in
//! `<image_dir>/metadata.json`. Every mutation rewrites the whole file:
//! writers in this process are serialized by a mutex and the new content is
//! written to a temporary file and renamed into place, so readers never see
//! a half-written array. Separate processes writing the same directory can
//! still lose each other's updates.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;

use optica_core::{ImageRecord, ProductId};

const METADATA_FILE: &str = "metadata.json";

/// Errors from reading or writing the sidecar file.
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("image storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image metadata is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Handle to the image directory and its metadata file.
#[derive(Debug)]
pub struct ImageSidecar {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ImageSidecar {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding the uploaded files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a stored upload.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Create the image directory if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns `SidecarError::Io` if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), SidecarError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Every record, in insertion order. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `SidecarError` if the file can't be read or parsed.
    pub async fn all(&self) -> Result<Vec<ImageRecord>, SidecarError> {
        match tokio::fs::read(self.metadata_path()).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Records for one product, in upload order.
    ///
    /// # Errors
    ///
    /// Returns `SidecarError` if the file can't be read or parsed.
    pub async fn list_for_product(&self, id: ProductId) -> Result<Vec<ImageRecord>, SidecarError> {
        let mut records = self.all().await?;
        records.retain(|r| r.product_id == id);
        Ok(records)
    }

    /// Add one record at the end.
    ///
    /// # Errors
    ///
    /// Returns `SidecarError` if the file can't be read, parsed, or written.
    pub async fn append(&self, record: ImageRecord) -> Result<(), SidecarError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.all().await?;
        records.push(record);
        self.write(&records).await
    }

    /// Drop every record of `id` and delete its files.
    ///
    /// Returns the removed records.
    ///
    /// # Errors
    ///
    /// Returns `SidecarError` if the metadata can't be read or rewritten.
    pub async fn remove_for_product(
        &self,
        id: ProductId,
    ) -> Result<Vec<ImageRecord>, SidecarError> {
        self.retain(|r| r.product_id != id).await
    }

    /// Keep only records for which `keep` returns `true`; delete the files
    /// of the rest.
    ///
    /// A record is only dropped once its file is gone. If a file can't be
    /// deleted the failure is logged and its record stays, so a later call
    /// retries it. Returns the records actually removed. The metadata file
    /// is left untouched when nothing is removed.
    ///
    /// # Errors
    ///
    /// Returns `SidecarError` on read, parse, or write failure.
    pub async fn retain<F>(&self, mut keep: F) -> Result<Vec<ImageRecord>, SidecarError>
    where
        F: FnMut(&ImageRecord) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;
        let (mut kept, candidates): (Vec<_>, Vec<_>) =
            self.all().await?.into_iter().partition(|r| keep(r));

        let mut removed = Vec::with_capacity(candidates.len());
        for record in candidates {
            match tokio::fs::remove_file(self.file_path(&record.filename)).await {
                Ok(()) => removed.push(record),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(filename = %record.filename, "Image file already gone");
                    removed.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        filename = %record.filename,
                        error = %e,
                        "Failed to delete image file, keeping its record"
                    );
                    kept.push(record);
                }
            }
        }
        if removed.is_empty() {
            return Ok(removed);
        }

        self.write(&kept).await?;
        Ok(removed)
    }

    async fn write(&self, records: &[ImageRecord]) -> Result<(), SidecarError> {
        self.ensure_dir().await?;
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.dir.join(format!("{METADATA_FILE}.tmp"));
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, self.metadata_path()).await?;
        Ok(())
    }
}
