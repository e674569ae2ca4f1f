//! SQLite upload index
//!
//! Durable metadata for every stored upload: who owns it, where the
//! original and extracted text live, a bounded content preview, and a
//! content hash used to skip duplicate uploads from the same user.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Metadata row for one stored upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Unique record ID
    pub id: Uuid,
    /// Owning user
    pub user_id: String,
    /// Session scope; None means the user's knowledge base
    pub session_id: Option<Uuid>,
    /// Original filename as uploaded
    pub filename: String,
    /// Declared or guessed MIME type
    pub mime_type: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// SHA-256 of the original bytes, for duplicate detection
    pub content_hash: String,
    /// Object key of the stored original
    pub object_key: String,
    /// Object key of the stored extracted text
    pub plaintext_key: String,
    /// Bounded preview of the extracted text
    pub preview: String,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

/// SQLite-backed upload index
pub struct UploadIndex {
    conn: Arc<Mutex<Connection>>,
}

impl UploadIndex {
    /// Create or open the index at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::Database(format!("Failed to open upload index: {}", e)))?;

        let index = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        index.migrate()?;
        Ok(index)
    }

    /// Create an in-memory index (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("Failed to open in-memory index: {}", e)))?;

        let index = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        index.migrate()?;
        Ok(index)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )
        .map_err(|e| Error::Database(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS uploads (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                session_id TEXT,
                filename TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                content_hash TEXT NOT NULL,
                object_key TEXT NOT NULL,
                plaintext_key TEXT NOT NULL,
                preview TEXT NOT NULL,
                uploaded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_uploads_user ON uploads(user_id);
            CREATE INDEX IF NOT EXISTS idx_uploads_session ON uploads(user_id, session_id);
            CREATE INDEX IF NOT EXISTS idx_uploads_hash ON uploads(user_id, content_hash);
            "#,
        )
        .map_err(|e| Error::Database(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    /// Insert a new upload record
    pub fn insert(&self, record: &UploadRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO uploads
                (id, user_id, session_id, filename, mime_type, size_bytes,
                 content_hash, object_key, plaintext_key, preview, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.id.to_string(),
                record.user_id,
                record.session_id.map(|s| s.to_string()),
                record.filename,
                record.mime_type,
                record.size_bytes as i64,
                record.content_hash,
                record.object_key,
                record.plaintext_key,
                record.preview,
                record.uploaded_at,
            ],
        )?;
        Ok(())
    }

    /// Look up a record by ID
    pub fn get(&self, id: &Uuid) -> Result<Option<UploadRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT * FROM uploads WHERE id = ?1",
            params![id.to_string()],
            row_to_record,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Find an existing upload with the same content for the same user
    pub fn find_by_hash(&self, user_id: &str, content_hash: &str) -> Result<Option<UploadRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT * FROM uploads WHERE user_id = ?1 AND content_hash = ?2 LIMIT 1",
            params![user_id, content_hash],
            row_to_record,
        )
        .optional()
        .map_err(Error::from)
    }

    /// All of a user's knowledge-base uploads, newest first
    pub fn list_knowledge_base(&self, user_id: &str) -> Result<Vec<UploadRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT * FROM uploads WHERE user_id = ?1 AND session_id IS NULL
             ORDER BY uploaded_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_record)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// A session's uploads, newest first
    pub fn list_session(&self, user_id: &str, session_id: &Uuid) -> Result<Vec<UploadRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT * FROM uploads WHERE user_id = ?1 AND session_id = ?2
             ORDER BY uploaded_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id, session_id.to_string()], row_to_record)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Every upload belonging to a user, newest first
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<UploadRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT * FROM uploads WHERE user_id = ?1 ORDER BY uploaded_at DESC")?;
        let rows = stmt.query_map(params![user_id], row_to_record)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Delete a record, returning it if it existed
    pub fn delete(&self, id: &Uuid) -> Result<Option<UploadRecord>> {
        let conn = self.conn.lock();
        let existing = conn
            .query_row(
                "SELECT * FROM uploads WHERE id = ?1",
                params![id.to_string()],
                row_to_record,
            )
            .optional()?;

        if existing.is_some() {
            conn.execute("DELETE FROM uploads WHERE id = ?1", params![id.to_string()])?;
        }
        Ok(existing)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<UploadRecord> {
    let id: String = row.get("id")?;
    let session_id: Option<String> = row.get("session_id")?;
    let size_bytes: i64 = row.get("size_bytes")?;

    Ok(UploadRecord {
        id: parse_uuid(&id)?,
        user_id: row.get("user_id")?,
        session_id: match session_id {
            Some(s) => Some(parse_uuid(&s)?),
            None => None,
        },
        filename: row.get("filename")?,
        mime_type: row.get("mime_type")?,
        size_bytes: size_bytes as u64,
        content_hash: row.get("content_hash")?,
        object_key: row.get("object_key")?,
        plaintext_key: row.get("plaintext_key")?,
        preview: row.get("preview")?,
        uploaded_at: row.get("uploaded_at")?,
    })
}

fn parse_uuid(value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, session: Option<Uuid>, filename: &str, hash: &str) -> UploadRecord {
        UploadRecord {
            id: Uuid::new_v4(),
            user_id: user.to_string(),
            session_id: session,
            filename: filename.to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 42,
            content_hash: hash.to_string(),
            object_key: format!("{}/knowledge-base/1_{}", user, filename),
            plaintext_key: format!("{}/knowledge-base/1_{}.txt", user, filename),
            preview: "preview".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let index = UploadIndex::in_memory().unwrap();
        let rec = record("u1", None, "a.txt", "h1");
        index.insert(&rec).unwrap();

        let fetched = index.get(&rec.id).unwrap().expect("record exists");
        assert_eq!(fetched.filename, "a.txt");
        assert_eq!(fetched.user_id, "u1");
        assert_eq!(fetched.session_id, None);
        assert_eq!(fetched.size_bytes, 42);
    }

    #[test]
    fn find_by_hash_is_scoped_to_user() {
        let index = UploadIndex::in_memory().unwrap();
        index.insert(&record("u1", None, "a.txt", "same")).unwrap();

        assert!(index.find_by_hash("u1", "same").unwrap().is_some());
        assert!(index.find_by_hash("u2", "same").unwrap().is_none());
        assert!(index.find_by_hash("u1", "other").unwrap().is_none());
    }

    #[test]
    fn session_and_knowledge_base_listings_are_disjoint() {
        let index = UploadIndex::in_memory().unwrap();
        let session = Uuid::new_v4();
        index.insert(&record("u1", None, "kb.txt", "h1")).unwrap();
        index
            .insert(&record("u1", Some(session), "sess.txt", "h2"))
            .unwrap();

        let kb = index.list_knowledge_base("u1").unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb[0].filename, "kb.txt");

        let sess = index.list_session("u1", &session).unwrap();
        assert_eq!(sess.len(), 1);
        assert_eq!(sess[0].filename, "sess.txt");

        assert_eq!(index.list_for_user("u1").unwrap().len(), 2);
    }

    #[test]
    fn delete_returns_the_removed_record() {
        let index = UploadIndex::in_memory().unwrap();
        let rec = record("u1", None, "a.txt", "h1");
        index.insert(&rec).unwrap();

        let removed = index.delete(&rec.id).unwrap().expect("was present");
        assert_eq!(removed.id, rec.id);
        assert!(index.get(&rec.id).unwrap().is_none());
        assert!(index.delete(&rec.id).unwrap().is_none());
    }
}
