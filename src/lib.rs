/*!
 * acadfs - Browse and manage an academic materials repository
 *
 * Materials live on disk as `root/{branch}/{semester}/{subject}/{year}/{file}`.
 * The filesystem is the only source of truth: a node exists when its
 * directory does, and a material is a regular file at the year level.
 */

pub mod error;

pub mod access;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod locks;
pub mod material;
pub mod report;
pub mod repository;
pub mod store;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use access::{CredentialCheck, Session, StaticCredentials};
pub use builder::TaxonomyBuilder;
pub use catalog::PathCatalog;
pub use config::Config;
pub use error::{AcadFsError, Result};
pub use locks::PathLocks;
pub use material::classify;
pub use report::{ReportFormat, Reporter};
pub use repository::Repository;
pub use store::{delete_subtree, MaterialStore};
pub use types::{
    Category, Download, MaterialDescriptor, PreviewKind, StoredMaterial, TaxonomyLevel,
    TaxonomyPath, TreeSummary,
};
pub use utils::format_file_size;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
