//! Storage adapters for uploaded documents
//!
//! Original bytes and extracted plain text go to a [`DocumentStore`]
//! under deterministic keys; per-upload metadata rows (with content
//! previews) go to the SQLite [`index::UploadIndex`].

pub mod index;
pub mod object_store;

pub use index::{UploadIndex, UploadRecord};
pub use object_store::{object_key, sanitize_filename, DocumentStore, LocalDocumentStore, StorageScope};
