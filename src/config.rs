//! Project configuration loader describing where the content store and uploads live.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RewriteError, RewriteResult};
use crate::rewrite::DEFAULT_UPLOADS_PREFIX;

/// File name searched for in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "uploads-rewriter.config.json";

/// Media host used when neither the command line, the environment nor the config names one.
pub const DEFAULT_CLOUD_MEDIA_URL: &str = "https://grateful-excitement-dfe9d47bad.media.strapiapp.com";

/// Environment variable read for the cloud media base URL.
pub const DEFAULT_CLOUD_MEDIA_URL_ENV: &str = "STRAPI_CLOUD_MEDIA_URL";

/// Discoverable project configuration. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// SQLite content database.
    pub database_path: String,
    /// Directory holding the hashed uploads.
    pub uploads_dir: String,
    /// JSON seed document.
    pub document_path: String,
    /// Prefix under which uploads are referenced in content.
    pub uploads_prefix: String,
    /// Cloud media base URL, overridden by the environment.
    pub cloud_media_url: Option<String>,
    /// Name of the environment variable holding the cloud media base URL.
    pub cloud_media_url_env: String,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            database_path: ".tmp/data.db".into(),
            uploads_dir: "public/uploads".into(),
            document_path: "data/data.json".into(),
            uploads_prefix: DEFAULT_UPLOADS_PREFIX.into(),
            cloud_media_url: None,
            cloud_media_url_env: DEFAULT_CLOUD_MEDIA_URL_ENV.into(),
        }
    }
}

impl RewriterConfig {
    /// Load [`DEFAULT_CONFIG_FILE`] from `root`, using defaults when it does not exist.
    pub fn discover(root: &Path) -> RewriteResult<Self> {
        Self::load_from_path(root.join(DEFAULT_CONFIG_FILE))
    }

    /// Read configuration from a specific JSON file.
    ///
    /// A missing file yields the defaults; a file that exists but does not parse is an error.
    pub fn load_from_path(path: impl AsRef<Path>) -> RewriteResult<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(RewriteError::io(path, err)),
        };

        serde_json::from_str(&contents).map_err(|source| RewriteError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path to the content database.
    pub fn database_path(&self, root: &Path) -> PathBuf {
        root.join(&self.database_path)
    }

    /// Path to the uploads directory.
    pub fn uploads_dir_path(&self, root: &Path) -> PathBuf {
        root.join(&self.uploads_dir)
    }

    /// Path to the JSON seed document.
    pub fn document_path(&self, root: &Path) -> PathBuf {
        root.join(&self.document_path)
    }

    /// Cloud media base URL, preferring `flag`, then the environment, then the config file.
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(&self.cloud_media_url_env).ok();
        pick_base_url(flag, env.as_deref(), self.cloud_media_url.as_deref())
    }
}

fn pick_base_url(flag: Option<&str>, env: Option<&str>, configured: Option<&str>) -> String {
    [flag, env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CLOUD_MEDIA_URL)
        .trim_end_matches('/')
        .to_string()
}
