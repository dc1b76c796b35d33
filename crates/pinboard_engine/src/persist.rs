use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Writability probe; the temp file is removed on drop.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes `{dir}/{filename}` through a temp file in the same directory so a
/// reader never sees a half-written image.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let tmp = self.stage(content)?;
        self.commit(tmp, filename)
    }

    /// Like [`write`](Self::write), but discards the temp file instead of
    /// renaming it once `cancel` has fired. Returns `None` in that case.
    pub fn write_unless_cancelled(
        &self,
        filename: &str,
        content: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Option<PathBuf>, PersistError> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let tmp = self.stage(content)?;
        if cancel.is_cancelled() {
            return Ok(None);
        }
        self.commit(tmp, filename).map(Some)
    }

    fn stage(&self, content: &[u8]) -> Result<NamedTempFile, PersistError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        Ok(tmp)
    }

    fn commit(&self, tmp: NamedTempFile, filename: &str) -> Result<PathBuf, PersistError> {
        let target = self.dir.join(filename);
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
