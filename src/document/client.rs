//! Read-only client for the document store's filtered list queries.

use crate::document::PaginatedDocs;
use crate::error::NavError;
use crate::fetch::Fetcher;
use crate::query::{build_query, QueryParams};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Issues `where`/`sort`/`limit`/`depth` list queries against one document store
#[derive(Clone)]
pub struct DocumentStoreClient {
    fetcher: Fetcher,
    base_url: String,
}

impl DocumentStoreClient {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn query_url(&self, collection: &str, params: &QueryParams) -> Result<Url, NavError> {
        build_query(&self.base_url, collection, params)
    }

    /// Run a list query and decode `{ docs, totalDocs }`
    pub async fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: &QueryParams,
    ) -> Result<PaginatedDocs<T>, NavError> {
        let url = self.query_url(collection, params)?;
        debug!(collection, url = %url, "Querying document store");
        self.fetcher.get_json(&url).await
    }
}
