/*!
 * Writing and removing materials and taxonomy subtrees
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::builder::TaxonomyBuilder;
use crate::catalog::PathCatalog;
use crate::error::{AcadFsError, Result, ResultExt};
use crate::locks::PathLocks;
use crate::types::{StoredMaterial, TaxonomyPath};
use crate::{bail, ensure};

/// Upload, replace and delete operations over a storage root
#[derive(Clone)]
pub struct MaterialStore {
    catalog: PathCatalog,
    builder: TaxonomyBuilder,
    locks: PathLocks,
    /// Progress bar ticked once per removed entry
    pub progress: Arc<ProgressBar>,
}

impl MaterialStore {
    /// Create a store over `root` with a hidden progress bar
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            catalog: PathCatalog::new(root.clone()),
            builder: TaxonomyBuilder::new(root),
            locks: PathLocks::new(),
            progress: Arc::new(ProgressBar::hidden()),
        }
    }

    /// Report subtree removal on the given progress bar
    pub fn with_progress(mut self, progress: Arc<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        self.catalog.root()
    }

    /// Create a taxonomy node and its missing ancestors.
    ///
    /// Holds the node's lock so creation never interleaves with removal of
    /// an ancestor or descendant.
    pub fn create_node(&self, path: &TaxonomyPath) -> Result<PathBuf> {
        let _guard = self.locks.lock(path);
        self.builder.ensure_path(path)
    }

    /// Write a new material under a year, creating missing ancestors.
    ///
    /// An existing file with the same name is overwritten. The name is kept
    /// exactly as given.
    pub fn upload(
        &self,
        path: &TaxonomyPath,
        content: &[u8],
        file_name: &str,
    ) -> Result<StoredMaterial> {
        let target = self.catalog.material_path(path, file_name)?;
        let _guard = self.locks.lock(path);

        self.builder.ensure_path(path)?;
        let stored = write_material(&target, content, file_name)?;

        info!(path = %path, file = file_name, bytes = stored.size, "uploaded material");
        Ok(stored)
    }

    /// Overwrite an existing material. Fails with `NotFound` when no file of
    /// that name exists under the year.
    pub fn replace(
        &self,
        path: &TaxonomyPath,
        content: &[u8],
        file_name: &str,
    ) -> Result<StoredMaterial> {
        let target = self.catalog.material_path(path, file_name)?;
        let _guard = self.locks.lock(path);

        ensure!(
            is_regular_file(&target)?,
            NotFound,
            "no material named '{}' in {} to replace",
            file_name,
            path
        );
        let stored = write_material(&target, content, file_name)?;

        info!(path = %path, file = file_name, bytes = stored.size, "replaced material");
        Ok(stored)
    }

    /// Remove exactly one material by name. Directories are never removed.
    pub fn delete_file(&self, path: &TaxonomyPath, file_name: &str) -> Result<()> {
        let target = self.catalog.material_path(path, file_name)?;
        let _guard = self.locks.lock(path);

        if !is_regular_file(&target)? {
            warn!(path = %path, file = file_name, "delete of missing material");
            bail!(NotFound, "no material named '{}' in {}", file_name, path);
        }
        fs::remove_file(&target).at_path(&target)?;

        info!(path = %path, file = file_name, "deleted material");
        Ok(())
    }

    /// Remove a taxonomy node and everything below it.
    ///
    /// Returns `Ok(false)` when the node does not exist. The storage root
    /// itself cannot be removed this way.
    pub fn delete_node(&self, path: &TaxonomyPath) -> Result<bool> {
        ensure!(
            !path.is_root(),
            Validation,
            "refusing to delete the storage root"
        );
        let _guard = self.locks.lock(path);

        let removed = delete_subtree_with_progress(&path.resolve(self.root()), &self.progress)?;
        if removed {
            info!(path = %path, "deleted subtree");
        }
        Ok(removed)
    }
}

/// Recursively remove `path` and everything beneath it.
///
/// Returns `Ok(false)` if nothing exists at `path`.
pub fn delete_subtree(path: &Path) -> Result<bool> {
    delete_subtree_with_progress(path, &ProgressBar::hidden())
}

/// Recursively remove `path`, ticking `progress` once per removed entry.
///
/// The walk is driven by an explicit stack rather than recursion. Each
/// directory is pushed twice: first to empty it (files go immediately,
/// subdirectories are pushed on top), then to remove it once everything
/// above it on the stack is gone. Symlinks are unlinked, never followed.
pub fn delete_subtree_with_progress(path: &Path, progress: &ProgressBar) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Nothing to delete at {}", path.display());
            return Ok(false);
        }
        Err(e) => return Err(AcadFsError::io(path, e)),
    };

    if !metadata.is_dir() {
        fs::remove_file(path).at_path(path)?;
        progress.inc(1);
        return Ok(true);
    }

    let mut stack: Vec<(PathBuf, bool)> = vec![(path.to_path_buf(), false)];
    while let Some((dir, emptied)) = stack.pop() {
        if emptied {
            fs::remove_dir(&dir).at_path(&dir)?;
            progress.inc(1);
            continue;
        }

        progress.set_message(format!("Removing {}", dir.display()));
        let entries = fs::read_dir(&dir)
            .at_path(&dir)?
            .collect::<io::Result<Vec<_>>>()
            .at_path(&dir)?;

        stack.push((dir, true));
        for entry in entries {
            let entry_path = entry.path();
            if entry.file_type().at_path(&entry_path)?.is_dir() {
                stack.push((entry_path, false));
            } else {
                fs::remove_file(&entry_path).at_path(&entry_path)?;
                progress.inc(1);
            }
        }
    }

    Ok(true)
}

/// Whether `path` is a regular file, treating absence as `false`
fn is_regular_file(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AcadFsError::io(path, e)),
    }
}

fn write_material(target: &Path, content: &[u8], file_name: &str) -> Result<StoredMaterial> {
    fs::write(target, content).at_path(target)?;
    Ok(StoredMaterial {
        name: file_name.to_string(),
        size: content.len() as u64,
        path: target.to_path_buf(),
    })
}
