//! Configuration for the ingestion gateway

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// RAG API configuration
    #[serde(default)]
    pub rag: RagApiConfig,
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load from the given path if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum multipart body size in bytes (covers a whole upload batch)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 64 * 1024 * 1024, // 64MB batch ceiling
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum size of a single uploaded file in bytes
    pub max_file_size: u64,
    /// Maximum length of a stored content preview, in characters
    pub preview_max_chars: usize,
    /// Timeout for extracting a single file, in seconds
    pub file_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            preview_max_chars: crate::ingest::preview::DEFAULT_PREVIEW_CHARS,
            file_timeout_secs: 60,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored objects (originals and extracted text)
    pub root_dir: PathBuf,
    /// Path to the SQLite upload index
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docq");

        Self {
            root_dir: data_dir.join("objects"),
            database_path: data_dir.join("index.db"),
        }
    }
}

/// RAG API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagApiConfig {
    /// Base URL of the external RAG service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for RagApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.ingest.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.ingest.preview_max_chars, 500);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090
            enable_cors = false
            max_upload_size = 1048576

            [rag]
            base_url = "http://rag.internal:8000"
            timeout_secs = 30
            max_retries = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.rag.base_url, "http://rag.internal:8000");
        // sections omitted from the file fall back to defaults
        assert_eq!(config.ingest.max_file_size, 10 * 1024 * 1024);
    }
}
