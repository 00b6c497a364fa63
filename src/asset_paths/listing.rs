use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use super::resolver::{AssetResolver, resolve_hashed};
use crate::error::{RewriteError, RewriteResult};

/// Point-in-time snapshot of the file names inside the uploads directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetListing {
    files: Vec<String>,
}

impl AssetListing {
    /// List the regular files in `dir`, sorted by name.
    ///
    /// Names that are not valid UTF-8 cannot appear in text references and are skipped.
    pub fn snapshot(dir: &Path) -> RewriteResult<Self> {
        let entries = fs::read_dir(dir).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RewriteError::MissingUploadsDir(dir.to_path_buf()),
            _ => RewriteError::io(dir, err),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| RewriteError::io(dir, err))?;
            let file_type = entry
                .file_type()
                .map_err(|err| RewriteError::io(entry.path(), err))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => files.push(name),
                Err(name) => debug!(?name, "skipping non UTF-8 upload name"),
            }
        }
        files.sort();

        debug!(dir = %dir.display(), count = files.len(), "snapshotted uploads directory");
        Ok(Self { files })
    }

    /// Build a listing from names in the order given.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: names.into_iter().map(Into::into).collect(),
        }
    }

    /// File names in listing order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when the snapshot holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetResolver for AssetListing {
    fn resolve<'a>(&'a self, original_filename: &str) -> Option<&'a str> {
        resolve_hashed(original_filename, &self.files)
    }
}
