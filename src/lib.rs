#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod models;
pub mod rewrite;
pub mod store;
pub mod walker;

pub use asset_paths::{AssetListing, AssetResolver};
pub use config::RewriterConfig;
pub use error::{RewriteError, RewriteResult};
pub use models::{Category, PassReport, TargetMode};
pub use store::{DocumentStore, RecordStore, SqliteStore};
pub use walker::{PassMode, RecordWalker};
