/*!
 * Read-only views over the storage root
 *
 * The catalog holds no state besides the root path: every call reflects
 * whatever is on disk at that moment.
 */

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use glob_match::glob_match;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, ResultExt};
use crate::material::{classify, extension_of, media_type, preview_kind};
use crate::types::{
    Download, MaterialDescriptor, TaxonomyLevel, TaxonomyPath, TreeSummary, TAXONOMY_DEPTH,
};
use crate::utils::is_ignored;
use crate::{bail, ensure, error};

/// Lists taxonomy nodes and materials under a storage root
#[derive(Debug, Clone)]
pub struct PathCatalog {
    root: PathBuf,
}

impl PathCatalog {
    /// Create a catalog over `root`. The root is checked lazily on each call.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all branches directly under the root
    pub fn list_branches(&self) -> Result<Vec<String>> {
        self.list_children(&TaxonomyPath::root())
    }

    /// Names of the directories one level below `path`
    pub fn list_children(&self, path: &TaxonomyPath) -> Result<Vec<String>> {
        ensure!(
            !path.is_year(),
            Validation,
            "year '{}' holds materials, not further levels",
            path
        );

        let dir = self.existing_dir(path)?;
        let mut names: Vec<String> = self
            .entries(&dir)
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();

        debug!(path = %path, count = names.len(), "listed children");
        Ok(names)
    }

    /// Regular files stored under a year directory
    pub fn list_materials(&self, path: &TaxonomyPath) -> Result<Vec<MaterialDescriptor>> {
        ensure!(
            path.is_year(),
            Validation,
            "materials live at the year level, '{}' is not a year",
            path
        );

        let dir = self.existing_dir(path)?;
        let mut materials = Vec::new();
        for entry in self.entries(&dir).filter(|e| e.file_type().is_file()) {
            match describe(&entry) {
                Ok(descriptor) => materials.push(descriptor),
                Err(e) => warn!("Error reading {}: {}", entry.path().display(), e),
            }
        }
        materials.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(path = %path, count = materials.len(), "listed materials");
        Ok(materials)
    }

    /// Materials whose name matches a glob pattern such as `*.pdf`
    pub fn list_materials_matching(
        &self,
        path: &TaxonomyPath,
        pattern: &str,
    ) -> Result<Vec<MaterialDescriptor>> {
        let materials = self.list_materials(path)?;
        Ok(materials
            .into_iter()
            .filter(|m| glob_match(pattern, &m.name))
            .collect())
    }

    /// Read a material for download or preview
    pub fn read_material(&self, path: &TaxonomyPath, file_name: &str) -> Result<Download> {
        let file_path = self.material_path(path, file_name)?;
        let metadata = fs::symlink_metadata(&file_path).at_path(&file_path)?;
        if !metadata.is_file() {
            bail!(NotFound, "no material named '{}' in {}", file_name, path);
        }

        let bytes = fs::read(&file_path).at_path(&file_path)?;
        let extension = extension_of(file_name);
        debug!(path = %path, file = file_name, bytes = bytes.len(), "read material");

        Ok(Download {
            name: file_name.to_string(),
            media_type: media_type(&extension),
            bytes,
        })
    }

    /// Walk the whole root and count what sits at each level
    pub fn summarize(&self) -> Result<TreeSummary> {
        let root = self.existing_dir(&TaxonomyPath::root())?;
        let mut summary = TreeSummary::default();

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !is_ignored(&e.file_name().to_string_lossy()))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Error walking {}: {}", root.display(), err);
                    None
                }
            })
        {
            let depth = entry.depth();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                match TaxonomyLevel::at_depth(depth) {
                    Some(level) => summary.add_directory(level),
                    None => summary.misplaced.push(entry.path().to_path_buf()),
                }
            } else if file_type.is_file() {
                if depth == TAXONOMY_DEPTH + 1 {
                    summary.materials += 1;
                    summary.total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
                } else {
                    summary.misplaced.push(entry.path().to_path_buf());
                }
            }
        }

        Ok(summary)
    }

    /// Location of a material, validating the file name
    pub(crate) fn material_path(&self, path: &TaxonomyPath, file_name: &str) -> Result<PathBuf> {
        ensure!(
            path.is_year(),
            Validation,
            "materials live at the year level, '{}' is not a year",
            path
        );
        crate::types::validate_name("file", file_name)?;
        Ok(path.resolve(&self.root).join(file_name))
    }

    /// Resolve `path` and make sure it is an existing directory
    fn existing_dir(&self, path: &TaxonomyPath) -> Result<PathBuf> {
        let dir = path.resolve(&self.root);
        let metadata = fs::metadata(&dir).map_err(|e| {
            if path.is_root() {
                error!(NotFound, "storage root {} ({})", dir.display(), e)
            } else {
                crate::error::AcadFsError::io(&dir, e)
            }
        })?;
        ensure!(
            metadata.is_dir(),
            NotFound,
            "{} is not a directory",
            dir.display()
        );
        Ok(dir)
    }

    /// Immediate entries of a directory
    fn entries(&self, dir: &Path) -> impl Iterator<Item = DirEntry> {
        let dir_display = dir.display().to_string();
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(move |e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Error reading entry in {}: {}", dir_display, err);
                    None
                }
            })
            .filter(|e| !is_ignored(&e.file_name().to_string_lossy()))
    }
}

/// Build a descriptor from a directory entry known to be a regular file
fn describe(entry: &DirEntry) -> Result<MaterialDescriptor> {
    let metadata = entry.metadata().map_err(|e| {
        let io = e
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk error"));
        crate::error::AcadFsError::io(entry.path(), io)
    })?;

    let name = entry.file_name().to_string_lossy().to_string();
    let extension = extension_of(&name);

    Ok(MaterialDescriptor {
        category: classify(&name),
        preview: preview_kind(&extension),
        size: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        extension,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, PreviewKind};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn year() -> TaxonomyPath {
        TaxonomyPath::year("CS", "5", "DS", "2023").unwrap()
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = tempdir().unwrap();
        let catalog = PathCatalog::new(temp_dir.path().join("absent"));

        let err = catalog.list_branches().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_root() {
        let temp_dir = tempdir().unwrap();
        let catalog = PathCatalog::new(temp_dir.path());

        assert!(catalog.list_branches().unwrap().is_empty());
    }

    #[test]
    fn test_children_are_directories_only() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("CS").join("5"))?;
        fs::create_dir_all(root.join("CS").join("3"))?;
        File::create(root.join("CS").join("notes.txt"))?;
        fs::create_dir(root.join("EE"))?;

        let catalog = PathCatalog::new(root);
        assert_eq!(catalog.list_branches()?, vec!["CS", "EE"]);

        let cs = TaxonomyPath::new(["CS"])?;
        assert_eq!(catalog.list_children(&cs)?, vec!["3", "5"]);

        let missing = TaxonomyPath::new(["ME"])?;
        assert!(catalog.list_children(&missing).unwrap_err().is_not_found());
        Ok(())
    }

    #[test]
    fn test_list_materials() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let dir = year().resolve(temp_dir.path());
        fs::create_dir_all(dir.join("nested"))?;
        let mut file = File::create(dir.join("midsem_paper.PDF"))?;
        file.write_all(b"%PDF-1.4")?;
        File::create(dir.join("lecture.pptx"))?;
        File::create(dir.join("Thumbs.db"))?;

        let catalog = PathCatalog::new(temp_dir.path());
        let materials = catalog.list_materials(&year())?;

        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "lecture.pptx");
        assert_eq!(materials[0].preview, PreviewKind::None);
        assert_eq!(materials[1].name, "midsem_paper.PDF");
        assert_eq!(materials[1].extension, ".pdf");
        assert_eq!(materials[1].size, 8);
        assert_eq!(materials[1].category, Category::MidsemPaper);
        assert_eq!(materials[1].preview, PreviewKind::Pdf);

        let pdfs = catalog.list_materials_matching(&year(), "*.PDF")?;
        assert_eq!(pdfs.len(), 1);
        Ok(())
    }

    #[test]
    fn test_level_checks() {
        let temp_dir = tempdir().unwrap();
        let catalog = PathCatalog::new(temp_dir.path());

        let subject = TaxonomyPath::new(["CS", "5", "DS"]).unwrap();
        assert!(catalog.list_materials(&subject).is_err());
        assert!(catalog.list_children(&year()).is_err());
    }

    #[test]
    fn test_read_material() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let dir = year().resolve(temp_dir.path());
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("scan.png"), [0x89, b'P', b'N', b'G'])?;

        let catalog = PathCatalog::new(temp_dir.path());
        let download = catalog.read_material(&year(), "scan.png")?;
        assert_eq!(download.media_type, "image/png");
        assert_eq!(download.bytes, vec![0x89, b'P', b'N', b'G']);

        let err = catalog.read_material(&year(), "missing.pdf").unwrap_err();
        assert!(err.is_not_found());

        assert!(catalog.read_material(&year(), "../scan.png").is_err());
        Ok(())
    }

    #[test]
    fn test_summarize() -> Result<()> {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let dir = year().resolve(root);
        fs::create_dir_all(&dir)?;
        fs::create_dir_all(root.join("EE").join("1"))?;
        fs::write(dir.join("solutions.pdf"), b"12345")?;
        fs::write(root.join("stray.txt"), b"x")?;
        fs::write(dir.join(".DS_Store"), b"junk")?;

        let summary = PathCatalog::new(root).summarize()?;
        assert_eq!(summary.branches, 2);
        assert_eq!(summary.semesters, 2);
        assert_eq!(summary.subjects, 1);
        assert_eq!(summary.years, 1);
        assert_eq!(summary.materials, 1);
        assert_eq!(summary.total_bytes, 5);
        assert_eq!(summary.misplaced, vec![root.join("stray.txt")]);
        Ok(())
    }
}
