//! SQLite database holding rich-text components, upload metadata and articles.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, params};
use tracing::debug;

use super::RecordStore;
use crate::error::{RewriteError, RewriteResult};
use crate::models::{Category, RecordId, RecordUpdate, TextRecord};

const FILES_TABLE: &str = "files";
const ARTICLES_TABLE: &str = "articles";

/// Record store backed by a content database.
///
/// Tables are discovered once when the store is opened: the first table whose name contains
/// `rich_text` or `rich-text`, the `files` table and the `articles` table when it carries a
/// `body` column.
pub struct SqliteStore {
    conn: Connection,
    rich_text_table: Option<String>,
    has_files: bool,
    articles_have_body: bool,
}

impl SqliteStore {
    /// Open an existing database without creating it.
    pub fn open(path: &Path) -> RewriteResult<Self> {
        if !path.is_file() {
            return Err(RewriteError::MissingDatabase(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        Self::from_connection(conn)
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection) -> RewriteResult<Self> {
        let tables = table_names(&conn)?;
        debug!(tables = %tables.join(", "), "available tables");

        let rich_text_table = tables
            .iter()
            .find(|name| name.contains("rich_text") || name.contains("rich-text"))
            .cloned();
        let has_files = tables.iter().any(|name| name == FILES_TABLE);
        let articles_have_body = tables.iter().any(|name| name == ARTICLES_TABLE)
            && column_names(&conn, ARTICLES_TABLE)?
                .iter()
                .any(|column| column == "body");

        Ok(Self {
            conn,
            rich_text_table,
            has_files,
            articles_have_body,
        })
    }

    fn body_table(&self, category: Category) -> RewriteResult<&str> {
        let table = match category {
            Category::RichTextBodies => self.rich_text_table.as_deref(),
            Category::ArticleBodies if self.articles_have_body => Some(ARTICLES_TABLE),
            _ => None,
        };
        table.ok_or(RewriteError::UnsupportedCategory(category))
    }

    fn read_bodies(&self, category: Category) -> RewriteResult<Vec<TextRecord>> {
        let table = quote_identifier(self.body_table(category)?);
        let label_column = if category == Category::ArticleBodies {
            "title"
        } else {
            "NULL"
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, {label_column}, body FROM {table} WHERE body IS NOT NULL"
        ))?;
        let records = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let title: Option<String> = row.get(1)?;
                Ok(TextRecord {
                    id: RecordId::Row(id),
                    label: title.unwrap_or_else(|| format!("id={id}")),
                    value: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn read_files(&self) -> RewriteResult<Vec<TextRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name FROM {} WHERE name IS NOT NULL",
            quote_identifier(FILES_TABLE)
        ))?;
        let records = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                Ok(TextRecord {
                    id: RecordId::Row(id),
                    label: format!("id={id}"),
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl RecordStore for SqliteStore {
    fn categories(&self) -> RewriteResult<Vec<Category>> {
        let mut categories = Vec::new();
        if self.rich_text_table.is_some() {
            categories.push(Category::RichTextBodies);
        }
        if self.has_files {
            categories.push(Category::FileMetadata);
        }
        if self.articles_have_body {
            categories.push(Category::ArticleBodies);
        }
        Ok(categories)
    }

    fn read(&self, category: Category) -> RewriteResult<Vec<TextRecord>> {
        match category {
            Category::RichTextBodies | Category::ArticleBodies => self.read_bodies(category),
            Category::FileMetadata if self.has_files => self.read_files(),
            _ => Err(RewriteError::UnsupportedCategory(category)),
        }
    }

    fn write(
        &mut self,
        category: Category,
        id: &RecordId,
        update: &RecordUpdate,
    ) -> RewriteResult<()> {
        let RecordId::Row(row_id) = id else {
            return Err(RewriteError::MissingRecord {
                category,
                id: id.clone(),
            });
        };

        let changed = match (category, update) {
            (Category::FileMetadata, RecordUpdate::File(file)) => self.conn.execute(
                &format!(
                    "UPDATE {} SET name = ?1, url = ?2, hash = ?3 WHERE id = ?4",
                    quote_identifier(FILES_TABLE)
                ),
                params![file.name, file.url, file.hash, row_id],
            )?,
            (Category::FileMetadata, RecordUpdate::Value(_)) | (_, RecordUpdate::File(_)) => {
                return Err(RewriteError::UnsupportedCategory(category));
            }
            (_, RecordUpdate::Value(body)) => {
                let table = quote_identifier(self.body_table(category)?);
                self.conn.execute(
                    &format!("UPDATE {table} SET body = ?1 WHERE id = ?2"),
                    params![body, row_id],
                )?
            }
        };

        if changed == 0 {
            return Err(RewriteError::MissingRecord {
                category,
                id: id.clone(),
            });
        }
        Ok(())
    }
}

fn table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn column_names(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
    let names = stmt
        .query_map([], |row| row.get(1))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
