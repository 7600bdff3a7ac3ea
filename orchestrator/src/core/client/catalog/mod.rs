pub mod rest;

use async_trait::async_trait;
pub use rest::RestCatalog;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Network error while querying {table}: {message}")]
    Network { table: String, message: String },

    #[error("Lookup in {table} failed with status {status}")]
    Api { table: String, status: u16 },

    #[error("Unexpected response from {table}: {message}")]
    Decode { table: String, message: String },

    #[error("Failed to build URL for {table}: {message}")]
    Url { table: String, message: String },
}

/// Parent references of a derived document (translation or summary)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentParents {
    #[serde(default)]
    pub transcript_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Read-only lookups into the system of record, used to find the cache entries that depend on
/// a changed entity. `Ok(None)` means the row does not exist or the reference is empty.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityCatalog: Send + Sync {
    /// File a transcript was produced from
    async fn transcript_file(&self, transcript_id: &str) -> Result<Option<String>, CatalogError>;

    /// Owner of a file
    async fn file_owner(&self, file_id: &str) -> Result<Option<String>, CatalogError>;

    async fn translation_parents(&self, translation_id: &str) -> Result<Option<DocumentParents>, CatalogError>;

    async fn summary_parents(&self, summary_id: &str) -> Result<Option<DocumentParents>, CatalogError>;
}
