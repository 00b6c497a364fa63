//! Reference rewrite pass over the categories of a record store.

use std::borrow::Cow;

use tracing::{debug, info};

use crate::asset_paths::AssetResolver;
use crate::error::RewriteResult;
use crate::models::{Category, FieldKind, PassReport, RecordUpdate, TargetMode, TextRecord};
use crate::rewrite::{
  DEFAULT_UPLOADS_PREFIX, MarkdownRewriter, PrefixRewriter, rewrite_field, rewrite_file_metadata,
};
use crate::store::RecordStore;

/// Categories visited when rewriting a JSON seed document.
pub const DOCUMENT_PLAN: &[Category] = &[
  Category::ArticleCovers,
  Category::ArticleShareImages,
  Category::RichTextBodies,
  Category::AuthorAvatars,
  Category::CategoryImages,
];

/// Categories visited when resolving hashed names in a database.
pub const DATABASE_PLAN: &[Category] = &[
  Category::RichTextBodies,
  Category::FileMetadata,
  Category::ArticleBodies,
];

/// Categories visited by a blanket-prefix pass over a database.
pub const PREFIX_PLAN: &[Category] = &[Category::RichTextBodies, Category::ArticleBodies];

/// How values are rewritten during a pass.
#[derive(Clone, Copy)]
pub enum PassMode<'a> {
  /// Resolve references against a hashed file listing.
  Hashed {
    /// Listing used to resolve original names.
    resolver: &'a dyn AssetResolver,
    /// Where resolved references should point.
    target: &'a TargetMode,
  },
  /// Replace the uploads prefix with a base URL without resolving anything.
  Prefix {
    /// Base URL substituted for the prefix.
    base_url: &'a str,
  },
}

/// Visits every record of a plan exactly once and writes back the ones that changed.
pub struct RecordWalker<'a> {
  mode: PassMode<'a>,
  uploads_prefix: String,
  markdown: MarkdownRewriter,
  prefix: PrefixRewriter,
  dry_run: bool,
}

impl<'a> RecordWalker<'a> {
  /// Create a walker using the default `/uploads` prefix.
  pub fn new(mode: PassMode<'a>) -> Self {
    Self {
      mode,
      uploads_prefix: DEFAULT_UPLOADS_PREFIX.to_string(),
      markdown: MarkdownRewriter::default(),
      prefix: PrefixRewriter::default(),
      dry_run: false,
    }
  }

  /// Match references under `uploads_prefix` instead of `/uploads`.
  pub fn with_uploads_prefix(mut self, uploads_prefix: &str) -> RewriteResult<Self> {
    self.markdown = MarkdownRewriter::new(uploads_prefix)?;
    self.prefix = PrefixRewriter::new(uploads_prefix)?;
    self.uploads_prefix = self.markdown.prefix().to_string();
    Ok(self)
  }

  /// Compute and log replacements without writing anything back.
  pub fn dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Run the pass over every category of `plan` held by `store`.
  pub fn run<S: RecordStore + ?Sized>(
    &self,
    store: &mut S,
    plan: &[Category],
  ) -> RewriteResult<PassReport> {
    let available = store.categories()?;
    let mut report = PassReport::default();

    for &category in plan {
      if !available.contains(&category) {
        debug!(%category, "category not present in store; skipping");
        continue;
      }

      let records = store.read(category)?;
      debug!(%category, count = records.len(), "visiting records");
      for record in records {
        let Some((update, replacements)) = self.rewrite_record(category, &record) else {
          continue;
        };
        if !self.dry_run {
          store.write(category, &record.id, &update)?;
        }
        report.record(category, replacements);
      }
    }

    if !self.dry_run {
      store.flush()?;
    }
    Ok(report)
  }

  fn rewrite_record(&self, category: Category, record: &TextRecord) -> Option<(RecordUpdate, usize)> {
    let (resolver, target) = match self.mode {
      PassMode::Hashed { resolver, target } => (resolver, target),
      PassMode::Prefix { base_url } => {
        let result = self.prefix.rewrite(&record.value, base_url);
        if result.count == 0 {
          return None;
        }
        info!(%category, record = %record.label, count = result.count, "path(s) updated");
        return Some((RecordUpdate::Value(result.text), result.count));
      }
    };

    match category.kind() {
      FieldKind::Markdown => {
        let result = self.markdown.rewrite(&record.value, resolver, target);
        if result.replacements.is_empty() {
          return None;
        }
        for replacement in &result.replacements {
          info!(
            %category,
            record = %record.label,
            "{} -> {}",
            replacement.original,
            replacement.target
          );
        }
        let count = result.replacements.len();
        Some((RecordUpdate::Value(result.body), count))
      }
      FieldKind::Filename => match rewrite_field(&record.value, resolver) {
        Cow::Owned(hashed) if hashed != record.value => {
          info!(%category, record = %record.label, "{} -> {}", record.value, hashed);
          Some((RecordUpdate::Value(hashed), 1))
        }
        _ => None,
      },
      FieldKind::FileMetadata => {
        let update = rewrite_file_metadata(&record.value, resolver, target, &self.uploads_prefix)?;
        info!(%category, record = %record.label, "{} -> {}", record.value, update.url);
        Some((RecordUpdate::File(update), 1))
      }
    }
  }
}
