//! docq: document Q&A ingestion gateway
//!
//! This crate sits between a chat front-end and a hosted RAG backend. It
//! validates uploaded files, extracts plain text from the supported
//! formats (PDF, Word, Excel, PowerPoint, CSV, plain text), stores the
//! original bytes and extracted text, and forwards questions together
//! with the extracted document contents to the external RAG HTTP API.
//!
//! The ingestion pipeline is usable as a library without the HTTP
//! server; see [`ingest`].

pub mod config;
pub mod error;
pub mod ingest;
pub mod rag;
pub mod server;
pub mod storage;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use ingest::{
    batch::{BatchExtractor, ExtractionOutcome},
    extractor::{Extractor, ExtractorRegistry},
    preview::content_preview,
    validate::{FileValidator, ValidationResult},
    UploadCandidate,
};
