//! Error type shared by the resolver, the record stores and the walker.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{Category, RecordId};

/// Result alias used across the crate.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Failures that abort a rewrite pass.
///
/// A reference that cannot be resolved is never an error; it is left as-is.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The SQLite database does not exist.
    #[error("database not found at {}", .0.display())]
    MissingDatabase(PathBuf),
    /// The JSON document does not exist.
    #[error("document not found at {}", .0.display())]
    MissingDocument(PathBuf),
    /// The uploads directory does not exist.
    #[error("uploads directory not found at {}", .0.display())]
    MissingUploadsDir(PathBuf),
    /// Reading or writing a file failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// A JSON document could not be parsed.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// The configuration file exists but is not valid.
    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// Serializing the document failed.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A database statement failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The configured uploads prefix produced an invalid pattern.
    #[error("invalid uploads prefix pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// The store was asked for a category it does not hold.
    #[error("{0} records are not held by this store")]
    UnsupportedCategory(Category),
    /// A write targeted a record the store cannot locate.
    #[error("record {id} not found in {category}")]
    MissingRecord {
        /// Category of the write.
        category: Category,
        /// Identifier that failed to resolve.
        id: RecordId,
    },
}

impl RewriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
