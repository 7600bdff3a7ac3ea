use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{CatalogError, DocumentParents, EntityCatalog};
use crate::types::params::CatalogParams;

#[derive(Deserialize)]
struct TranscriptRow {
    file_id: Option<String>,
}

#[derive(Deserialize)]
struct FileRow {
    owner_id: Option<String>,
}

/// Catalog backed by a PostgREST style interface (`GET /rest/v1/<table>?id=eq.<id>`).
pub struct RestCatalog {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl RestCatalog {
    pub fn new(params: &CatalogParams) -> Self {
        Self { client: reqwest::Client::new(), base_url: params.base_url.clone(), api_key: params.api_key.clone() }
    }

    fn table_url(&self, table: &str, id: &str, columns: &str) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Url { table: table.to_string(), message: "base URL cannot be a base".into() })?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id)).append_pair("select", columns);
        Ok(url)
    }

    /// First row of `table` with the given id, if any
    async fn single<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        columns: &str,
    ) -> Result<Option<T>, CatalogError> {
        let url = self.table_url(table, id, columns)?;
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CatalogError::Network { table: table.to_string(), message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Api { table: table.to_string(), status: status.as_u16() });
        }
        let rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode { table: table.to_string(), message: e.to_string() })?;
        debug!(table = %table, id = %id, found = !rows.is_empty(), "Catalog lookup");
        Ok(rows.into_iter().next())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl EntityCatalog for RestCatalog {
    async fn transcript_file(&self, transcript_id: &str) -> Result<Option<String>, CatalogError> {
        let row: Option<TranscriptRow> = self.single("transcripts", transcript_id, "file_id").await?;
        Ok(non_empty(row.and_then(|r| r.file_id)))
    }

    async fn file_owner(&self, file_id: &str) -> Result<Option<String>, CatalogError> {
        let row: Option<FileRow> = self.single("files", file_id, "owner_id").await?;
        Ok(non_empty(row.and_then(|r| r.owner_id)))
    }

    async fn translation_parents(&self, translation_id: &str) -> Result<Option<DocumentParents>, CatalogError> {
        let row: Option<DocumentParents> = self.single("translations", translation_id, "transcript_id,owner_id").await?;
        Ok(row.map(|r| DocumentParents { transcript_id: non_empty(r.transcript_id), owner_id: non_empty(r.owner_id) }))
    }

    async fn summary_parents(&self, summary_id: &str) -> Result<Option<DocumentParents>, CatalogError> {
        let row: Option<DocumentParents> = self.single("summaries", summary_id, "transcript_id,owner_id").await?;
        Ok(row.map(|r| DocumentParents { transcript_id: non_empty(r.transcript_id), owner_id: non_empty(r.owner_id) }))
    }
}
