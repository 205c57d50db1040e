//! Child-Existence Resolver
//!
//! Determines which nodes of a level have at least one published child with a
//! single batched `where[parent][in]=...` query, instead of one query per node.

use crate::document::{DocumentStoreClient, Relation};
use crate::error::NavError;
use crate::query::{Operator, QueryParams};
use crate::types::NodeId;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Default cap on child documents returned by the batched query
pub const DEFAULT_CHILD_SCAN_LIMIT: u32 = 1000;

/// Only the parent reference is needed to partition children
#[derive(Debug, Deserialize)]
struct ChildRef {
    #[serde(default)]
    parent: Option<Relation>,
}

/// Batched `hasChildren` lookups against one page collection
#[derive(Clone)]
pub struct ChildExistenceResolver {
    client: DocumentStoreClient,
    collection: String,
    scan_limit: u32,
}

impl ChildExistenceResolver {
    pub fn new(client: DocumentStoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            scan_limit: DEFAULT_CHILD_SCAN_LIMIT,
        }
    }

    pub fn with_scan_limit(mut self, scan_limit: u32) -> Self {
        self.scan_limit = scan_limit.max(1);
        self
    }

    /// Query for any published, non-homepage child whose parent is in `parent_ids`.
    ///
    /// Ids are sorted so the generated URL is stable.
    pub fn child_query(&self, parent_ids: &HashSet<NodeId>) -> QueryParams {
        let mut ids: Vec<&str> = parent_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        QueryParams::new()
            .where_op("parent", Operator::In, ids)
            .where_op("status", Operator::Equals, "published")
            .where_op("isSectionHomepage", Operator::NotEquals, true)
            .limit(self.scan_limit)
            .depth(0)
    }

    /// Map every requested id to whether it has at least one published child.
    ///
    /// Ids that never appear as a returned child's parent map to `false`.
    pub async fn resolve_has_children(
        &self,
        parent_ids: &HashSet<NodeId>,
    ) -> Result<HashMap<NodeId, bool>, NavError> {
        let mut result: HashMap<NodeId, bool> =
            parent_ids.iter().map(|id| (id.clone(), false)).collect();
        if parent_ids.is_empty() {
            return Ok(result);
        }

        let params = self.child_query(parent_ids);
        let page = self.client.find::<ChildRef>(&self.collection, &params).await?;
        if page.total_docs > page.docs.len() as u64 {
            debug!(
                collection = %self.collection,
                returned = page.docs.len(),
                total = page.total_docs,
                "Child scan truncated; parents beyond the limit resolve to false"
            );
        }

        for child in &page.docs {
            if let Some(parent) = child.parent.as_ref().map(Relation::id) {
                if let Some(flag) = result.get_mut(parent) {
                    *flag = true;
                }
            }
        }
        Ok(result)
    }
}
