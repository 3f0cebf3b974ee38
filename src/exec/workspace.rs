//! Per-invocation temporary directory

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};

/// Scoped temp directory holding the synthesized values file.
///
/// Removed by [`Workspace::close`], which reports failures, or on drop as a
/// fallback when a panic unwinds past it.
pub struct Workspace {
    dir: TempDir,
    values_path: PathBuf,
}

impl Workspace {
    /// Create `<tmp>/<prefix>.XXXXXX`.
    pub fn create(prefix: &str, values_file: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{prefix}."))
            .tempdir()
            .map_err(|source| Error::TempDirCreate { source })?;
        let values_path = dir.path().join(values_file);
        tracing::debug!("created temporary directory {}", dir.path().display());
        Ok(Self { dir, values_path })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the merged values are written; nothing exists there until then.
    pub fn values_path(&self) -> &Path {
        &self.values_path
    }

    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|source| Error::TempDirRemove { path: path.clone(), source })?;
        tracing::debug!("removed temporary directory {}", path.display());
        Ok(())
    }
}
