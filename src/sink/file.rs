//! Destination file writer.

use crate::error::{Error, Result};

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

/// Sequential writer for the destination of one download.
///
/// The file is created (or truncated) by [`FileSink::create`]. Bytes become
/// durable once [`FileSink::finish`] returns.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl FileSink {
    /// Create `directory` if needed and open `directory/filename` for writing.
    pub async fn create(directory: &Path, filename: &str) -> Result<Self> {
        debug!("Creating destination directory {:?}", directory);
        fs::create_dir_all(directory)
            .await
            .map_err(|e| Error::filesystem(directory, e))?;

        let path = directory.join(filename);
        debug!("Creating destination file {:?}", &path);
        let file = File::create(&path)
            .await
            .map_err(|e| Error::filesystem(&path, e))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes accepted so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append `chunk` to the file.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.writer
            .write_all(chunk)
            .await
            .map_err(|e| Error::filesystem(&self.path, e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered bytes and sync the file to disk.
    pub async fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .await
            .map_err(|e| Error::filesystem(&self.path, e))?;
        self.writer
            .get_ref()
            .sync_all()
            .await
            .map_err(|e| Error::filesystem(&self.path, e))?;
        Ok(self.path)
    }

    /// Close the file and delete it.
    pub async fn discard(self) {
        let Self { path, writer, .. } = self;
        drop(writer);
        remove_partial(&path).await;
    }
}

/// Best-effort removal of a partially written file.
pub(crate) async fn remove_partial(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial file {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial file {:?}: {}", path, e),
    }
}
