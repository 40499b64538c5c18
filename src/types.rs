/*!
 * Core types and data structures for acadfs
 */

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::Result;
use crate::utils::is_ignored;
use crate::{bail, ensure};

/// Number of directory levels between the root and the materials
pub const TAXONOMY_DEPTH: usize = 4;

/// The four fixed levels of the taxonomy, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumIter, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaxonomyLevel {
    /// Directory directly under the root
    Branch,
    /// Directory under a branch
    Semester,
    /// Directory under a semester
    Subject,
    /// Leaf directory holding materials
    Year,
}

impl TaxonomyLevel {
    /// Level at the given depth below the root (1-based)
    pub fn at_depth(depth: usize) -> Option<Self> {
        Self::iter().nth(depth.checked_sub(1)?)
    }
}

/// Material category, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[strum(to_string = "Mid Semester Paper")]
    MidsemPaper,
    #[strum(to_string = "End Semester Paper")]
    EndsemPaper,
    #[strum(to_string = "Question Bank")]
    QuestionBank,
    #[strum(to_string = "Solutions")]
    Solutions,
    #[strum(to_string = "Short Notes")]
    ShortNotes,
    #[strum(to_string = "Other Material")]
    Other,
}

impl Category {
    /// File-name token signalling this category
    pub fn token(&self) -> Option<&'static str> {
        match self {
            Category::MidsemPaper => Some("midsem_paper"),
            Category::EndsemPaper => Some("endsem_paper"),
            Category::QuestionBank => Some("question_bank"),
            Category::Solutions => Some("solutions"),
            Category::ShortNotes => Some("short_notes"),
            Category::Other => None,
        }
    }

    /// Human readable label
    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// What a client can do with a material besides downloading it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PreviewKind {
    Pdf,
    Image,
    /// Download only
    None,
}

/// A validated location in the taxonomy, relative to the root.
///
/// Holds between zero (the root itself) and four segments. Every segment
/// has passed [`validate_name`], so joining onto a root cannot escape it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TaxonomyPath {
    segments: Vec<String>,
}

impl TaxonomyPath {
    /// The root itself
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from raw segments, validating each one
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = Self::root();
        for segment in segments {
            path = path.child(segment.as_ref())?;
        }
        Ok(path)
    }

    /// Full path down to a year directory
    pub fn year(branch: &str, semester: &str, subject: &str, year: &str) -> Result<Self> {
        Self::new([branch, semester, subject, year])
    }

    /// Extend this path by one level
    pub fn child(&self, name: &str) -> Result<Self> {
        let next = self.segments.len() + 1;
        let Some(level) = TaxonomyLevel::at_depth(next) else {
            bail!(
                Validation,
                "'{}' would be nested below the year level",
                name
            );
        };
        validate_name(level, name)?;

        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Path segments, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Level of the deepest segment, `None` for the root
    pub fn level(&self) -> Option<TaxonomyLevel> {
        TaxonomyLevel::at_depth(self.segments.len())
    }

    /// Whether this path points at the root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this path points at a year directory
    pub fn is_year(&self) -> bool {
        self.segments.len() == TAXONOMY_DEPTH
    }

    /// Join onto a storage root
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.segments
            .iter()
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }

}

impl fmt::Display for TaxonomyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        write!(f, "{}", self.segments.join(" ➔ "))
    }
}

/// Reject names that could escape their parent directory, that the
/// filesystem would interpret specially, or that listings always hide.
pub fn validate_name(level: impl fmt::Display, name: &str) -> Result<()> {
    ensure!(!name.is_empty(), Validation, "{} name must not be empty", level);
    ensure!(
        !name.trim().is_empty(),
        Validation,
        "{} name must not be blank",
        level
    );
    ensure!(
        name != "." && name != "..",
        Validation,
        "{} name '{}' is a directory reference",
        level,
        name
    );
    ensure!(
        !name.contains(['/', '\\']),
        Validation,
        "{} name '{}' contains a path separator",
        level,
        name
    );
    ensure!(
        !name.chars().any(char::is_control),
        Validation,
        "{} name {:?} contains control characters",
        level,
        name
    );
    ensure!(
        !is_ignored(name),
        Validation,
        "{} name '{}' matches an ignored pattern and would never be listed",
        level,
        name
    );
    Ok(())
}

/// A material listed under a year directory
#[derive(Debug, Clone, Serialize)]
pub struct MaterialDescriptor {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Lower-cased extension including the dot, empty if none
    pub extension: String,
    /// Category derived from the file name
    pub category: Category,
    /// Preview capability derived from the extension
    pub preview: PreviewKind,
    /// Last modification time, when the filesystem reports one
    pub modified: Option<DateTime<Utc>>,
}

/// Result of writing a material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMaterial {
    /// Final stored file name
    pub name: String,
    /// Bytes written
    pub size: u64,
    /// Absolute location on disk
    pub path: PathBuf,
}

/// Bytes of a material ready to hand to a client
#[derive(Debug, Clone)]
pub struct Download {
    /// File name to present
    pub name: String,
    /// Media type label
    pub media_type: &'static str,
    /// File content
    pub bytes: Vec<u8>,
}

/// Aggregate counts over a whole storage root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub branches: usize,
    pub semesters: usize,
    pub subjects: usize,
    pub years: usize,
    pub materials: usize,
    pub total_bytes: u64,
    /// Files sitting above the year level, or directories below it
    pub misplaced: Vec<PathBuf>,
}

impl TreeSummary {
    /// Count a directory at the given depth
    pub fn add_directory(&mut self, level: TaxonomyLevel) {
        match level {
            TaxonomyLevel::Branch => self.branches += 1,
            TaxonomyLevel::Semester => self.semesters += 1,
            TaxonomyLevel::Subject => self.subjects += 1,
            TaxonomyLevel::Year => self.years += 1,
        }
    }
}
