/*!
 * Idempotent creation of taxonomy nodes
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AcadFsError, Result, ResultExt};
use crate::types::TaxonomyPath;
use crate::{ensure, error};

/// Creates branch, semester, subject and year directories on demand
#[derive(Debug, Clone)]
pub struct TaxonomyBuilder {
    root: PathBuf,
}

impl TaxonomyBuilder {
    /// Create a builder over an existing storage root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every missing directory along `path` and return its location.
    ///
    /// Succeeds silently for nodes that already exist. Names were validated
    /// when `path` was built, so no component can point outside the root.
    pub fn ensure_path(&self, path: &TaxonomyPath) -> Result<PathBuf> {
        let root_meta = fs::metadata(&self.root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                error!(NotFound, "storage root {} ({})", self.root.display(), e)
            }
            _ => AcadFsError::io(&self.root, e),
        })?;
        ensure!(
            root_meta.is_dir(),
            NotFound,
            "storage root {} is not a directory",
            self.root.display()
        );

        let dir = path.resolve(&self.root);
        let existed = dir.is_dir();
        fs::create_dir_all(&dir).at_path(&dir)?;

        if !existed {
            info!(path = %path, "created taxonomy node");
        }
        Ok(dir)
    }
}
