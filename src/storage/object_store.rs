//! Object storage for original files and extracted text
//!
//! Keys are deterministic:
//! `{user}/knowledge-base/{timestamp}_{name}` for documents available
//! across sessions, `{user}/sessions/{id}/{timestamp}_{name}` for
//! session-scoped ones. The filename component is sanitized to a
//! restricted character set before composition and the millisecond
//! timestamp keeps concurrent uploads from the same user distinct.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Where an uploaded document lives relative to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageScope {
    /// Persistent, user-scoped collection available across sessions
    KnowledgeBase,
    /// Scoped to a single chat session
    Session(Uuid),
}

/// Restrict a path component to `[A-Za-z0-9._-]`.
///
/// Anything else becomes `_`; an empty result falls back to `file` so
/// keys never end with a bare separator.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Compose the deterministic object key for an upload.
///
/// Both the user id and the filename are sanitized, so the key can be
/// joined onto a filesystem root without escaping it.
pub fn object_key(
    user_id: &str,
    scope: &StorageScope,
    uploaded_at: DateTime<Utc>,
    filename: &str,
) -> String {
    let user = sanitize_filename(user_id);
    let name = sanitize_filename(filename);
    let ts = uploaded_at.timestamp_millis();

    match scope {
        StorageScope::KnowledgeBase => format!("{}/knowledge-base/{}_{}", user, ts, name),
        StorageScope::Session(session_id) => {
            format!("{}/sessions/{}/{}_{}", user, session_id, ts, name)
        }
    }
}

/// Object storage collaborator for uploaded documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store an object under the given key, returning its URI
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Fetch an object's bytes
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete an object; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Cheap liveness probe
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Filesystem-backed document store
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    /// Create a store rooted at the given directory, creating it if needed
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        tracing::debug!(key = %key, bytes = data.len(), content_type = %content_type, "stored object");

        Ok(path.to_string_lossy().to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key);
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::internal(format!("Failed to read object {}: {}", key, e)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.root.exists())
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize_filename("Report_v2.final-1.pdf"), "Report_v2.final-1.pdf");
    }

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_filename("my report (1).pdf"), "my_report__1_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[test]
    fn sanitize_never_returns_an_empty_component() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("///"), "file");
    }

    #[test]
    fn knowledge_base_key_layout() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let key = object_key("user-1", &StorageScope::KnowledgeBase, ts, "notes.txt");
        assert_eq!(key, "user-1/knowledge-base/1700000000000_notes.txt");
    }

    #[test]
    fn session_key_layout() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let session = Uuid::nil();
        let key = object_key("user-1", &StorageScope::Session(session), ts, "notes.txt");
        assert_eq!(
            key,
            format!("user-1/sessions/{}/1700000000000_notes.txt", session)
        );
    }

    #[test]
    fn key_components_stay_inside_the_root() {
        let ts = Utc.timestamp_millis_opt(0).unwrap();
        let key = object_key("../sneaky", &StorageScope::KnowledgeBase, ts, "../../x");
        // no component can escape the root: slashes in inputs are
        // replaced, so ".." never stands alone as a path segment
        assert!(key.split('/').all(|component| component != ".."));
    }

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path().to_path_buf()).unwrap();

        let uri = store
            .put("u/knowledge-base/1_a.txt", b"hello", "text/plain")
            .await
            .unwrap();
        assert!(uri.ends_with("1_a.txt"));

        let data = store.get("u/knowledge-base/1_a.txt").await.unwrap();
        assert_eq!(data, b"hello");

        store.delete("u/knowledge-base/1_a.txt").await.unwrap();
        assert!(store.get("u/knowledge-base/1_a.txt").await.is_err());
        // deleting again is a no-op
        store.delete("u/knowledge-base/1_a.txt").await.unwrap();
    }
}
