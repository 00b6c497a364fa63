//! Reference rewriting in its three flavours: markdown text, blanket prefix and bare fields.

mod field;
mod prefix;
mod text;

pub use field::{rewrite_field, rewrite_file_metadata};
pub use prefix::{PrefixRewriter, rewrite_prefix};
pub use text::{DEFAULT_UPLOADS_PREFIX, MarkdownRewriter, rewrite_text};
