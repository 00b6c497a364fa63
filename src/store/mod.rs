//! Record stores the rewrite pass reads from and writes back to.

mod document;
mod sqlite;

pub use document::DocumentStore;
pub use sqlite::SqliteStore;

use crate::error::RewriteResult;
use crate::models::{Category, RecordId, RecordUpdate, TextRecord};

/// Read and write access to the fields visited by a rewrite pass.
pub trait RecordStore {
  /// Categories this store holds.
  fn categories(&self) -> RewriteResult<Vec<Category>>;

  /// All records of `category` whose field is present and non-null.
  fn read(&self, category: Category) -> RewriteResult<Vec<TextRecord>>;

  /// Persist `update` for the record identified by `id`.
  fn write(&mut self, category: Category, id: &RecordId, update: &RecordUpdate)
  -> RewriteResult<()>;

  /// Finish the pass, writing buffered changes if the store keeps any.
  fn flush(&mut self) -> RewriteResult<()> {
    Ok(())
  }
}
