//! Fallback Chain Orchestrator
//!
//! Loads one level of navigation for a section by walking three tiers in
//! order: the hierarchical endpoint, a direct flat collection query and the
//! static snapshot. The first tier that yields at least one node wins. Every
//! tier failure is caught at the tier boundary; [`FallbackChain::fetch_level`]
//! never returns an error.

use crate::config::{DirectFallback, SectionConfig};
use crate::document::{DocumentStoreClient, RawNode};
use crate::error::NavError;
use crate::fetch::Fetcher;
use crate::query::{build_query, resolve_endpoint, Operator, QueryParams};
use crate::resolver::ChildExistenceResolver;
use crate::snapshot::{read_snapshot, SnapshotSource};
use crate::tree::{nav_item_from_raw, normalize, NavItem, ProcessedNode};
use crate::types::NodeId;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Source of hierarchical (tier 1) navigation levels
#[async_trait]
pub trait HierarchySource: Send + Sync {
    /// Categories with their first-level pages embedded
    async fn top_level(&self) -> Result<Vec<NavItem>, NavError>;

    /// Direct children of `parent_id`
    async fn children(&self, parent_id: &str) -> Result<Vec<NavItem>, NavError>;

    /// Whether [`HierarchySource::children`] is backed by anything
    fn serves_children(&self) -> bool {
        true
    }
}

/// Tier 1 over HTTP: the section's `primary_endpoint` and children endpoint pattern
pub struct EndpointSource {
    fetcher: Fetcher,
    site_url: String,
    section: SectionConfig,
}

impl EndpointSource {
    pub fn new(fetcher: Fetcher, site_url: impl Into<String>, section: SectionConfig) -> Self {
        Self {
            fetcher,
            site_url: site_url.into(),
            section,
        }
    }

    async fn get_level(&self, endpoint: &str) -> Result<Vec<NavItem>, NavError> {
        let url = resolve_endpoint(&self.site_url, endpoint)?;
        self.fetcher.get_json(&url).await
    }
}

#[async_trait]
impl HierarchySource for EndpointSource {
    async fn top_level(&self) -> Result<Vec<NavItem>, NavError> {
        self.get_level(&self.section.primary_endpoint).await
    }

    async fn children(&self, parent_id: &str) -> Result<Vec<NavItem>, NavError> {
        match self.section.children_endpoint(parent_id) {
            Some(endpoint) => self.get_level(&endpoint).await,
            None => Ok(Vec::new()),
        }
    }

    fn serves_children(&self) -> bool {
        self.section.children_endpoint_pattern.is_some()
    }
}

/// Fallback tiers in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Hierarchical,
    DirectCollection,
    StaticSnapshot,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Hierarchical => "hierarchical",
            Tier::DirectCollection => "direct_collection",
            Tier::StaticSnapshot => "static_snapshot",
        };
        f.write_str(name)
    }
}

/// Result of one level fetch with the tiers that were run
#[derive(Debug, Clone, Default)]
pub struct LevelFetch {
    /// Tier that produced `nodes`; `None` when every tier came up empty
    pub tier: Option<Tier>,
    /// Tiers actually attempted, in order
    pub attempted: Vec<Tier>,
    pub nodes: Vec<ProcessedNode>,
}

/// Per-section orchestrator over the three tiers
#[derive(Clone)]
pub struct FallbackChain {
    section_name: String,
    section: SectionConfig,
    site_url: String,
    primary: Arc<dyn HierarchySource>,
    client: DocumentStoreClient,
}

impl FallbackChain {
    /// Chain whose tier 1 is the section's HTTP endpoints
    pub fn new(
        section_name: impl Into<String>,
        section: SectionConfig,
        site_url: impl Into<String>,
        client: DocumentStoreClient,
    ) -> Self {
        let site_url = site_url.into();
        let primary = Arc::new(EndpointSource::new(
            client.fetcher().clone(),
            site_url.clone(),
            section.clone(),
        ));
        Self {
            section_name: section_name.into(),
            section,
            site_url,
            primary,
            client,
        }
    }

    /// Replace tier 1, e.g. with an in-process [`crate::service::NavigationService`]
    pub fn with_primary(mut self, primary: Arc<dyn HierarchySource>) -> Self {
        self.primary = primary;
        self
    }

    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    pub fn section(&self) -> &SectionConfig {
        &self.section
    }

    /// Load a level: top level for `None`, children of the node otherwise.
    ///
    /// Empty means "no data"; the reason has already been logged.
    pub async fn fetch_level(&self, parent_id: Option<&str>) -> Vec<ProcessedNode> {
        self.fetch_level_traced(parent_id).await.nodes
    }

    /// [`FallbackChain::fetch_level`] plus which tiers ran
    pub async fn fetch_level_traced(&self, parent_id: Option<&str>) -> LevelFetch {
        let mut outcome = LevelFetch::default();

        let hierarchical_applies = parent_id.is_none() || self.primary.serves_children();
        if hierarchical_applies {
            outcome.attempted.push(Tier::Hierarchical);
            let fetched = match parent_id {
                None => self.primary.top_level().await,
                Some(id) => self.primary.children(id).await,
            };
            if let Some(nodes) = self.settle(Tier::Hierarchical, parent_id, fetched) {
                return outcome.finish(Tier::Hierarchical, nodes);
            }
        }

        if let Some(fallback) = &self.section.direct_fallback {
            outcome.attempted.push(Tier::DirectCollection);
            let fetched = self.direct_collection(fallback, parent_id).await;
            if let Some(nodes) = self.settle(Tier::DirectCollection, parent_id, fetched) {
                return outcome.finish(Tier::DirectCollection, nodes);
            }
        }

        if let (None, Some(snapshot)) = (parent_id, &self.section.static_snapshot) {
            outcome.attempted.push(Tier::StaticSnapshot);
            let fetched = self.static_snapshot(snapshot).await;
            if let Some(nodes) = self.settle(Tier::StaticSnapshot, parent_id, fetched) {
                return outcome.finish(Tier::StaticSnapshot, nodes);
            }
        }

        warn!(
            section = %self.section_name,
            parent_id = parent_id.unwrap_or("<root>"),
            attempted = outcome.attempted.len(),
            "All navigation tiers exhausted"
        );
        outcome
    }

    /// Normalize a tier's result, or log why it is being skipped
    fn settle(
        &self,
        tier: Tier,
        parent_id: Option<&str>,
        fetched: Result<Vec<NavItem>, NavError>,
    ) -> Option<Vec<ProcessedNode>> {
        let parent = parent_id.unwrap_or("<root>");
        match fetched {
            Ok(items) if items.is_empty() => {
                debug!(section = %self.section_name, %tier, parent_id = parent, "Tier returned no items");
                None
            }
            Ok(items) => {
                let nodes = normalize(&items);
                if nodes.is_empty() {
                    debug!(section = %self.section_name, %tier, parent_id = parent, "Tier returned no usable items");
                    return None;
                }
                info!(section = %self.section_name, %tier, parent_id = parent, count = nodes.len(), "Loaded navigation level");
                Some(nodes)
            }
            Err(err) => {
                error!(section = %self.section_name, %tier, parent_id = parent, error = %err, "Navigation tier failed");
                None
            }
        }
    }

    /// Tier 2: flat `where[parent]` query against the page collection
    async fn direct_collection(
        &self,
        fallback: &DirectFallback,
        parent_id: Option<&str>,
    ) -> Result<Vec<NavItem>, NavError> {
        let params = direct_query(parent_id, fallback.limit);
        let page = self
            .client
            .find::<RawNode>(&fallback.collection, &params)
            .await?;

        let ids: HashSet<NodeId> = page.docs.iter().map(|doc| doc.id.clone()).collect();
        let resolver = ChildExistenceResolver::new(self.client.clone(), fallback.collection.clone());
        let has_children = match resolver.resolve_has_children(&ids).await {
            Ok(map) => map,
            Err(err) => {
                warn!(
                    section = %self.section_name,
                    error = %err,
                    "Child existence lookup failed; marking fallback items as leaves"
                );
                Default::default()
            }
        };

        Ok(page
            .docs
            .iter()
            .map(|doc| nav_item_from_raw(doc, has_children.get(&doc.id).copied().unwrap_or(false)))
            .collect())
    }

    /// Tier 3: pre-generated top-level tree
    async fn static_snapshot(&self, location: &str) -> Result<Vec<NavItem>, NavError> {
        match SnapshotSource::resolve(location, &self.site_url)? {
            SnapshotSource::Remote(url) => self.client.fetcher().get_json(&url).await,
            SnapshotSource::File(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| NavError::Snapshot {
                    location: path.display().to_string(),
                    message: e.to_string(),
                })?;
                read_snapshot(&bytes, &path.display().to_string())
            }
        }
    }

    /// URL the direct collection tier would request, if configured
    pub fn direct_query_url(&self, parent_id: Option<&str>) -> Option<Result<reqwest::Url, NavError>> {
        self.section.direct_fallback.as_ref().map(|fallback| {
            build_query(
                self.client.base_url(),
                &fallback.collection,
                &direct_query(parent_id, fallback.limit),
            )
        })
    }
}

impl LevelFetch {
    fn finish(mut self, tier: Tier, nodes: Vec<ProcessedNode>) -> Self {
        self.tier = Some(tier);
        self.nodes = nodes;
        self
    }
}

fn direct_query(parent_id: Option<&str>, limit: u32) -> QueryParams {
    let params = match parent_id {
        Some(id) => QueryParams::new().where_eq("parent", id),
        None => QueryParams::new().where_op("parent", Operator::Exists, false),
    };
    params
        .where_eq("status", "published")
        .sort("sort")
        .limit(limit)
        .depth(0)
}
