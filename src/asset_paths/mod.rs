//! Helpers for locating the hashed file that backs an upload reference.
//!
//! The listing snapshot, the name matching rule and the reference joining logic live in
//! separate submodules so each can be tested on its own.

mod join;
mod listing;
mod resolver;

pub use join::join_reference;
pub use listing::AssetListing;
pub use resolver::{
    AssetResolver, extract_hash, resolve_hashed, split_extension,
};
