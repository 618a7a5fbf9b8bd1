//! Directory collaborators of the user interface.

use directories::{BaseDirs, UserDirs};
use std::path::PathBuf;

/// Lets the user pick a destination directory.
pub trait FolderChooser: Send + Sync {
    /// The chosen directory, or `None` if the user declined.
    fn choose(&self) -> Option<PathBuf>;
}

/// Supplies the directory used when the user chose none.
pub trait DownloadDirProvider: Send + Sync {
    fn download_dir(&self) -> PathBuf;
}

/// The platform downloads directory.
///
/// Falls back to the home directory, then to the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDownloadDir;

impl DownloadDirProvider for SystemDownloadDir {
    fn download_dir(&self) -> PathBuf {
        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(PathBuf::from))
            .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl<F> FolderChooser for F
where
    F: Fn() -> Option<PathBuf> + Send + Sync,
{
    fn choose(&self) -> Option<PathBuf> {
        self()
    }
}
