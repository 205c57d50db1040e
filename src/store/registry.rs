//! Section registry: one independent navigation store per configured section.

use crate::chain::FallbackChain;
use crate::config::NavConfig;
use crate::document::DocumentStoreClient;
use crate::error::NavError;
use crate::fetch::{Fetcher, HttpTransport};
use crate::service::NavigationService;
use crate::store::NavigationStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Where tier 1 of each section's chain gets its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimarySource {
    /// The section's configured HTTP endpoints
    #[default]
    Endpoint,
    /// A [`NavigationService`] querying the document store directly
    InProcess,
}

/// Registry of navigation stores keyed by section name
#[derive(Default)]
pub struct SectionRegistry {
    stores: BTreeMap<String, Arc<NavigationStore>>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store for every section in `config`, all sharing one transport
    pub fn from_config(
        config: &NavConfig,
        transport: Arc<dyn HttpTransport>,
        primary: PrimarySource,
    ) -> Self {
        let fetcher = Fetcher::new(transport, config.retry);
        let client = DocumentStoreClient::new(fetcher, config.document_store.base_url.clone());

        let mut registry = Self::new();
        for (name, section) in &config.sections {
            let mut chain = FallbackChain::new(
                name.clone(),
                section.clone(),
                config.site_url.clone(),
                client.clone(),
            );
            if primary == PrimarySource::InProcess {
                chain = chain.with_primary(Arc::new(NavigationService::new(
                    client.clone(),
                    section.clone(),
                )));
            }
            debug!(section = %name, ?primary, "Registered navigation section");
            registry.register(name.clone(), NavigationStore::new(chain));
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, store: NavigationStore) {
        self.stores.insert(name.into(), Arc::new(store));
    }

    pub fn get(&self, name: &str) -> Result<Arc<NavigationStore>, NavError> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| NavError::UnknownSection(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
