use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::engine_debug;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::fetch::ImageFetcher;
use crate::filename::{pin_file_name, pin_file_path};
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: PathBuf, bytes: u64 },
    /// A file with this index was already on disk; nothing was fetched.
    AlreadyPresent { path: PathBuf },
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Saved { path, .. } | DownloadOutcome::AlreadyPresent { path } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("cancelled")]
    Cancelled,
    #[error("download failed: {0}")]
    Network(FetchError),
    #[error("write failed: {0}")]
    Io(#[from] PersistError),
}

impl From<FetchError> for DownloadError {
    fn from(err: FetchError) -> Self {
        if err.kind == FailureKind::Cancelled {
            DownloadError::Cancelled
        } else {
            DownloadError::Network(err)
        }
    }
}

/// Saves images as `Pin_{index:03}.jpg`.
///
/// The existence check is by index only: an existing file is trusted to hold
/// the image for that slot.
#[derive(Clone)]
pub struct Downloader {
    fetcher: Arc<dyn ImageFetcher>,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn download(
        &self,
        url: &str,
        dir: &Path,
        index: usize,
        cancel: &CancellationToken,
    ) -> Result<DownloadOutcome, DownloadError> {
        let file_name = pin_file_name(index);
        let path = pin_file_path(dir, index);
        if path.exists() {
            engine_debug!("{} already present, skipping {}", file_name, url);
            return Ok(DownloadOutcome::AlreadyPresent { path });
        }
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let output = self.fetcher.fetch(url, cancel).await?;
        let bytes = output.bytes.len() as u64;

        // Awaited to completion; the writer checks `cancel` before the rename.
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        let token = cancel.clone();
        let written = tokio::task::spawn_blocking(move || {
            writer.write_unless_cancelled(&file_name, &output.bytes, &token)
        })
        .await
        .map_err(|err| PersistError::Io(io::Error::other(err)))??;

        match written {
            Some(path) => Ok(DownloadOutcome::Saved { path, bytes }),
            None => Err(DownloadError::Cancelled),
        }
    }
}
