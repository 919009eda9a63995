use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREFIX: &str = "lazygit-";

#[derive(Debug, thiserror::Error)]
#[error("Failed to create scratch directory in '{}'", parent.display())]
pub struct ScratchDirError {
    parent: PathBuf,
    #[source]
    source: io::Error,
}

/// Per-session scratch directory. Removed with its contents when dropped, so
/// every return path of the owning scope releases it.
#[derive(Debug)]
pub struct ScratchDir(TempDir);

impl ScratchDir {
    pub fn acquire() -> Result<Self, ScratchDirError> {
        Self::acquire_in(&std::env::temp_dir())
    }

    pub fn acquire_in(parent: &Path) -> Result<Self, ScratchDirError> {
        tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(parent)
            .map(Self)
            .map_err(|source| ScratchDirError {
                parent: parent.to_path_buf(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        self.0.path()
    }
}
