//! Global error handling for acadfs
//!
//! Every catalog, builder and store operation reports failures through
//! [`AcadFsError`]. Failures are scoped to the single operation that raised
//! them; nothing in the library aborts the process.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Global error type for acadfs operations
#[derive(Error, Debug)]
pub enum AcadFsError {
    /// A root, taxonomy node or material does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The underlying storage denied the operation
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Any other storage failure (disk full, read-only mount, ...)
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A node or file name was rejected before touching the filesystem
    #[error("Invalid name: {0}")]
    Validation(String),

    /// An admin operation was attempted without an authenticated session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AcadFsError {
    /// Classify an IO error raised while operating on `path`
    pub fn io(path: &Path, err: io::Error) -> Self {
        let context = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => AcadFsError::NotFound(context),
            io::ErrorKind::PermissionDenied => {
                AcadFsError::Permission(format!("{}: {}", context, err))
            }
            _ => AcadFsError::Io {
                context,
                source: err,
            },
        }
    }

    /// Whether this is a recoverable "nothing there" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, AcadFsError::NotFound(_))
    }
}

impl From<io::Error> for AcadFsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => AcadFsError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => AcadFsError::Permission(err.to_string()),
            _ => AcadFsError::Io {
                context: "storage".to_string(),
                source: err,
            },
        }
    }
}

/// Specialized Result type for acadfs operations
pub type Result<T> = std::result::Result<T, AcadFsError>;

/// Creates an AcadFsError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::AcadFsError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for attaching the offending path to IO errors
pub trait ResultExt<T> {
    /// Classify the error against `path`
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| AcadFsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_io_classification() {
        let path = PathBuf::from("/data/CS");

        let err = AcadFsError::io(&path, io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: /data/CS");

        let err = AcadFsError::io(&path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, AcadFsError::Permission(_)));

        let err = AcadFsError::io(&path, io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(matches!(err, AcadFsError::Io { .. }));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_macros() {
        fn check(value: &str) -> Result<()> {
            ensure!(!value.is_empty(), Validation, "name must not be empty");
            Ok(())
        }

        assert!(check("CS").is_ok());
        let err = check("").unwrap_err();
        assert_eq!(err.to_string(), "Invalid name: name must not be empty");
    }
}
