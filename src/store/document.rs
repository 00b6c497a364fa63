//! JSON seed document holding articles, authors and categories.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::RecordStore;
use crate::error::{RewriteError, RewriteResult};
use crate::models::{Category, RecordId, RecordUpdate, TextRecord};

const RICH_TEXT_COMPONENT: &str = "shared.rich-text";

/// Record store backed by a JSON document loaded into memory.
///
/// Record ids are JSON pointers. Changes are kept in memory until [`RecordStore::flush`].
#[derive(Debug)]
pub struct DocumentStore {
  path: PathBuf,
  root: Value,
  dirty: bool,
}

impl DocumentStore {
  /// Load the document at `path`.
  pub fn load(path: &Path) -> RewriteResult<Self> {
    let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
      ErrorKind::NotFound => RewriteError::MissingDocument(path.to_path_buf()),
      _ => RewriteError::io(path, err),
    })?;
    let root = serde_json::from_str(&contents).map_err(|source| RewriteError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Self::from_value(path, root))
  }

  /// Wrap an already parsed document that will be written back to `path`.
  pub fn from_value(path: impl Into<PathBuf>, root: Value) -> Self {
    Self {
      path: path.into(),
      root,
      dirty: false,
    }
  }

  /// Current document contents.
  pub fn value(&self) -> &Value {
    &self.root
  }

  fn array(&self, key: &str) -> Option<&Vec<Value>> {
    self.root.get(key).and_then(Value::as_array)
  }

  /// Collect a string field from every element of a top-level array.
  fn collect_field(&self, key: &str, field_path: &[&str], label_key: &str) -> Vec<TextRecord> {
    let Some(items) = self.array(key) else {
      return Vec::new();
    };

    items
      .iter()
      .enumerate()
      .filter_map(|(index, item)| {
        let value = field_path
          .iter()
          .try_fold(item, |current, segment| current.get(*segment))?
          .as_str()
          .filter(|value| !value.is_empty())?;
        Some(TextRecord {
          id: RecordId::Pointer(format!("/{key}/{index}/{}", field_path.join("/"))),
          label: label_of(item, label_key, index),
          value: value.to_string(),
        })
      })
      .collect()
  }

  fn collect_rich_text_blocks(&self) -> Vec<TextRecord> {
    let Some(articles) = self.array("articles") else {
      return Vec::new();
    };

    let mut records = Vec::new();
    for (article_index, article) in articles.iter().enumerate() {
      let Some(blocks) = article.get("blocks").and_then(Value::as_array) else {
        continue;
      };
      for (block_index, block) in blocks.iter().enumerate() {
        if block.get("__component").and_then(Value::as_str) != Some(RICH_TEXT_COMPONENT) {
          continue;
        }
        let Some(body) = block.get("body").and_then(Value::as_str).filter(|b| !b.is_empty()) else {
          continue;
        };
        records.push(TextRecord {
          id: RecordId::Pointer(format!("/articles/{article_index}/blocks/{block_index}/body")),
          label: label_of(article, "slug", article_index),
          value: body.to_string(),
        });
      }
    }
    records
  }
}

fn label_of(item: &Value, key: &str, index: usize) -> String {
  item
    .get(key)
    .and_then(Value::as_str)
    .map(str::to_string)
    .unwrap_or_else(|| format!("#{index}"))
}

impl RecordStore for DocumentStore {
  fn categories(&self) -> RewriteResult<Vec<Category>> {
    let mut categories = Vec::new();
    if self.array("articles").is_some() {
      categories.extend([
        Category::ArticleCovers,
        Category::ArticleShareImages,
        Category::RichTextBodies,
      ]);
    }
    if self.array("authors").is_some() {
      categories.push(Category::AuthorAvatars);
    }
    if self.array("categories").is_some() {
      categories.push(Category::CategoryImages);
    }
    Ok(categories)
  }

  fn read(&self, category: Category) -> RewriteResult<Vec<TextRecord>> {
    let records = match category {
      Category::ArticleCovers => self.collect_field("articles", &["cover"], "slug"),
      Category::ArticleShareImages => self.collect_field("articles", &["seo", "shareImage"], "slug"),
      Category::RichTextBodies => self.collect_rich_text_blocks(),
      Category::AuthorAvatars => self.collect_field("authors", &["avatar"], "name"),
      Category::CategoryImages => self.collect_field("categories", &["featuredImage"], "slug"),
      Category::ArticleBodies | Category::FileMetadata => {
        return Err(RewriteError::UnsupportedCategory(category));
      }
    };
    Ok(records)
  }

  fn write(&mut self, category: Category, id: &RecordId, update: &RecordUpdate) -> RewriteResult<()> {
    let RecordUpdate::Value(value) = update else {
      return Err(RewriteError::UnsupportedCategory(category));
    };
    let slot = match id {
      RecordId::Pointer(pointer) => self.root.pointer_mut(pointer),
      RecordId::Row(_) => None,
    };
    let Some(slot) = slot else {
      return Err(RewriteError::MissingRecord {
        category,
        id: id.clone(),
      });
    };

    *slot = Value::String(value.clone());
    self.dirty = true;
    Ok(())
  }

  fn flush(&mut self) -> RewriteResult<()> {
    if !self.dirty {
      return Ok(());
    }
    let serialized = serde_json::to_string_pretty(&self.root)?;
    fs::write(&self.path, serialized).map_err(|err| RewriteError::io(&self.path, err))?;
    self.dirty = false;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::tempdir;

  fn document() -> Value {
    json!({
      "articles": [
        {
          "slug": "hello",
          "cover": "cover.png",
          "seo": { "shareImage": "share.png" },
          "blocks": [
            { "__component": "shared.quote", "body": "![q](/uploads/q.png)" },
            { "__component": "shared.rich-text", "body": "![a](/uploads/a.png)" }
          ]
        },
        { "slug": "empty", "cover": "" }
      ],
      "authors": [{ "name": "Olli", "avatar": "meet_olli_img_1.png" }, { "name": "Nobody" }],
      "categories": [{ "slug": "news", "featuredImage": 3 }]
    })
  }

  #[test]
  fn reports_categories_for_present_arrays() -> RewriteResult<()> {
    let store = DocumentStore::from_value("data.json", json!({ "authors": [] }));
    assert_eq!(store.categories()?, vec![Category::AuthorAvatars]);
    Ok(())
  }

  #[test]
  fn reads_string_fields_with_pointers_and_labels() -> RewriteResult<()> {
    let store = DocumentStore::from_value("data.json", document());

    assert_eq!(store.read(Category::ArticleCovers)?, vec![TextRecord {
      id: RecordId::Pointer("/articles/0/cover".into()),
      label: "hello".into(),
      value: "cover.png".into(),
    }]);
    assert_eq!(
      store.read(Category::ArticleShareImages)?[0].id,
      RecordId::Pointer("/articles/0/seo/shareImage".into())
    );
    assert_eq!(store.read(Category::AuthorAvatars)?.len(), 1);
    assert!(store.read(Category::CategoryImages)?.is_empty());
    Ok(())
  }

  #[test]
  fn reads_only_rich_text_blocks() -> RewriteResult<()> {
    let store = DocumentStore::from_value("data.json", document());
    let blocks = store.read(Category::RichTextBodies)?;

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id, RecordId::Pointer("/articles/0/blocks/1/body".into()));
    assert_eq!(blocks[0].value, "![a](/uploads/a.png)");
    Ok(())
  }

  #[test]
  fn flush_writes_pretty_json_in_original_key_order() -> RewriteResult<()> {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("data.json");
    fs::write(&path, r#"{"zeta":1,"authors":[{"name":"Olli","avatar":"a.png"}]}"#)
      .expect("failed to write document");

    let mut store = DocumentStore::load(&path)?;
    store.write(
      Category::AuthorAvatars,
      &RecordId::Pointer("/authors/0/avatar".into()),
      &RecordUpdate::Value("a_ff.png".into()),
    )?;
    assert_eq!(store.value()["authors"][0]["avatar"], "a_ff.png");
    store.flush()?;

    let written = fs::read_to_string(&path).expect("failed to read document");
    assert_eq!(
      written,
      "{\n  \"zeta\": 1,\n  \"authors\": [\n    {\n      \"name\": \"Olli\",\n      \"avatar\": \"a_ff.png\"\n    }\n  ]\n}"
    );
    Ok(())
  }

  #[test]
  fn flush_without_changes_leaves_file_alone() -> RewriteResult<()> {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("data.json");
    fs::write(&path, r#"{"authors":[]}"#).expect("failed to write document");

    let mut store = DocumentStore::load(&path)?;
    store.flush()?;

    assert_eq!(fs::read_to_string(&path).expect("failed to read"), r#"{"authors":[]}"#);
    Ok(())
  }

  #[test]
  fn rejects_unknown_pointers_and_missing_files() {
    let mut store = DocumentStore::from_value("data.json", document());
    let result = store.write(
      Category::AuthorAvatars,
      &RecordId::Pointer("/authors/9/avatar".into()),
      &RecordUpdate::Value("x".into()),
    );
    assert!(matches!(result, Err(RewriteError::MissingRecord { .. })));

    let temp = tempdir().expect("failed to create temp dir");
    let missing = temp.path().join("data.json");
    assert!(matches!(
      DocumentStore::load(&missing),
      Err(RewriteError::MissingDocument(_))
    ));
  }
}
