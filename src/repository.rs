/*!
 * Single entry point over catalog and store
 *
 * Every mutation goes through the store and its per-path locks. Admin
 * operations take the caller's [`Session`] and refuse to run unless it is
 * elevated.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::access::Session;
use crate::catalog::PathCatalog;
use crate::error::Result;
use crate::store::MaterialStore;
use crate::types::{Download, MaterialDescriptor, StoredMaterial, TaxonomyPath, TreeSummary};

/// Academic materials repository rooted at one storage directory
#[derive(Clone)]
pub struct Repository {
    catalog: PathCatalog,
    store: MaterialStore,
}

impl Repository {
    /// Open a repository over `root`
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            catalog: PathCatalog::new(root.clone()),
            store: MaterialStore::new(root),
        }
    }

    /// Report subtree removal on the given progress bar
    pub fn with_progress(mut self, progress: Arc<ProgressBar>) -> Self {
        self.store = self.store.with_progress(progress);
        self
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        self.catalog.root()
    }

    /// Read-only catalog
    pub fn catalog(&self) -> &PathCatalog {
        &self.catalog
    }

    pub fn list_branches(&self) -> Result<Vec<String>> {
        self.catalog.list_branches()
    }

    pub fn list_children(&self, path: &TaxonomyPath) -> Result<Vec<String>> {
        self.catalog.list_children(path)
    }

    pub fn list_materials(&self, path: &TaxonomyPath) -> Result<Vec<MaterialDescriptor>> {
        self.catalog.list_materials(path)
    }

    pub fn download(&self, path: &TaxonomyPath, file_name: &str) -> Result<Download> {
        self.catalog.read_material(path, file_name)
    }

    pub fn summarize(&self) -> Result<TreeSummary> {
        self.catalog.summarize()
    }

    /// Create a taxonomy node and its missing ancestors
    pub fn create_node(&self, session: &Session, path: &TaxonomyPath) -> Result<PathBuf> {
        session.require_admin()?;
        self.store.create_node(path)
    }

    pub fn upload(
        &self,
        session: &Session,
        path: &TaxonomyPath,
        content: &[u8],
        file_name: &str,
    ) -> Result<StoredMaterial> {
        session.require_admin()?;
        self.store.upload(path, content, file_name)
    }

    pub fn replace(
        &self,
        session: &Session,
        path: &TaxonomyPath,
        content: &[u8],
        file_name: &str,
    ) -> Result<StoredMaterial> {
        session.require_admin()?;
        self.store.replace(path, content, file_name)
    }

    pub fn delete_file(
        &self,
        session: &Session,
        path: &TaxonomyPath,
        file_name: &str,
    ) -> Result<()> {
        session.require_admin()?;
        self.store.delete_file(path, file_name)
    }

    /// Remove a node and everything below it; `Ok(false)` if it was absent
    pub fn delete_node(&self, session: &Session, path: &TaxonomyPath) -> Result<bool> {
        session.require_admin()?;
        self.store.delete_node(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::StaticCredentials;
    use crate::error::AcadFsError;
    use tempfile::tempdir;

    #[test]
    fn test_admin_operations_require_login() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let repo = Repository::open(temp_dir.path());
        let year = TaxonomyPath::year("CS", "5", "DS", "2023")?;
        let mut session = Session::new();

        let err = repo.upload(&session, &year, b"x", "notes.pdf").unwrap_err();
        assert!(matches!(err, AcadFsError::Unauthorized(_)));
        assert!(matches!(
            repo.create_node(&session, &year),
            Err(AcadFsError::Unauthorized(_))
        ));
        assert!(repo.list_branches()?.is_empty());

        session.login(&StaticCredentials::default(), "admin", "admin123")?;
        repo.upload(&session, &year, b"x", "notes.pdf")?;
        assert_eq!(repo.list_materials(&year)?.len(), 1);

        session.logout();
        assert!(repo.delete_file(&session, &year, "notes.pdf").is_err());
        assert_eq!(repo.list_materials(&year)?.len(), 1);
        Ok(())
    }
}
