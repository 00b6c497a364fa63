//! Data structures exchanged between the rewriter, the walker and the record stores.

use std::collections::BTreeMap;
use std::fmt;

use crate::asset_paths::join_reference;

/// Where a resolved reference should point after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetMode {
  /// Keep references under the local uploads prefix, e.g. `/uploads/photo_ab12.png`.
  Local,
  /// Point references at an external media host, e.g. `https://cdn.example.com/photo_ab12.png`.
  Cloud {
    /// Base URL without a trailing slash.
    base_url: String,
  },
}

impl TargetMode {
  /// Build a cloud target, trimming any trailing slashes from `base_url`.
  pub fn cloud(base_url: impl AsRef<str>) -> Self {
    Self::Cloud {
      base_url: base_url.as_ref().trim_end_matches('/').to_string(),
    }
  }

  /// Full reference for a hashed file name under this target.
  pub fn reference(&self, uploads_prefix: &str, file_name: &str) -> String {
    match self {
      Self::Local => join_reference(uploads_prefix, file_name),
      Self::Cloud { base_url } => join_reference(base_url, file_name),
    }
  }

  /// Whether a match is rewritten even when the hashed name equals the original.
  ///
  /// Cloud targets always change the reference because the prefix is replaced.
  pub fn rewrites_unchanged_names(&self) -> bool {
    matches!(self, Self::Cloud { .. })
  }
}

/// One substitution performed while rewriting a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
  /// Reference as it appeared before the rewrite.
  pub original: String,
  /// Reference written in its place.
  pub target: String,
}

/// Output of a text-mode rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRewrite {
  /// Body with every resolved reference substituted.
  pub body: String,
  /// Substitutions in the order they were made.
  pub replacements: Vec<Replacement>,
}

/// Output of a blanket-prefix rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRewrite {
  /// Text with every prefixed path moved under the base URL.
  pub text: String,
  /// Number of paths that were rewritten.
  pub count: usize,
}

/// New values for a row of the file metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadataUpdate {
  /// Hashed file name.
  pub name: String,
  /// Reference built from the target mode.
  pub url: String,
  /// Hex token extracted from the hashed name.
  pub hash: String,
}

/// Record categories visited by a rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
  /// Markdown bodies of rich-text blocks.
  RichTextBodies,
  /// Markdown bodies stored directly on articles.
  ArticleBodies,
  /// Rows of the upload metadata table.
  FileMetadata,
  /// Article cover image file names.
  ArticleCovers,
  /// Article SEO share image file names.
  ArticleShareImages,
  /// Author avatar file names.
  AuthorAvatars,
  /// Category featured image file names.
  CategoryImages,
}

impl Category {
  /// Stable name used in logs and reports.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::RichTextBodies => "rich_text_bodies",
      Self::ArticleBodies => "article_bodies",
      Self::FileMetadata => "file_metadata",
      Self::ArticleCovers => "article_covers",
      Self::ArticleShareImages => "article_share_images",
      Self::AuthorAvatars => "author_avatars",
      Self::CategoryImages => "category_images",
    }
  }

  /// Kind of value held by records of this category.
  pub fn kind(&self) -> FieldKind {
    match self {
      Self::RichTextBodies | Self::ArticleBodies => FieldKind::Markdown,
      Self::FileMetadata => FieldKind::FileMetadata,
      Self::ArticleCovers | Self::ArticleShareImages | Self::AuthorAvatars | Self::CategoryImages => {
        FieldKind::Filename
      }
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How a field value is interpreted by the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  /// Markdown text containing `![alt](/uploads/...)` images.
  Markdown,
  /// A bare file name.
  Filename,
  /// A file metadata row keyed by its file name.
  FileMetadata,
}

/// Identifier of a record inside its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
  /// Database row id.
  Row(i64),
  /// JSON pointer into a document.
  Pointer(String),
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Row(id) => write!(f, "id={id}"),
      Self::Pointer(pointer) => f.write_str(pointer),
    }
  }
}

/// One field of one record, as read from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
  /// Identifier used to write the record back.
  pub id: RecordId,
  /// Human readable handle for logs (slug, name, title or id).
  pub label: String,
  /// Current field value.
  pub value: String,
}

/// Change persisted for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
  /// Replace the field value.
  Value(String),
  /// Replace the name, url and hash of a file metadata row.
  File(FileMetadataUpdate),
}

/// Summary of a completed rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
  /// Substitutions performed across all categories.
  pub total: usize,
  /// Records written back.
  pub records_updated: usize,
  /// Substitutions per category.
  pub by_category: BTreeMap<Category, usize>,
}

impl PassReport {
  /// Account for one updated record.
  pub fn record(&mut self, category: Category, replacements: usize) {
    self.total += replacements;
    self.records_updated += 1;
    *self.by_category.entry(category).or_default() += replacements;
  }
}
