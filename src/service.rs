//! Hierarchical endpoint service
//!
//! Server side of tier 1: builds the top-level tree (categories with their
//! first-level pages) and children-of-X levels straight from the document
//! store, with `hasChildren` resolved in one batched query per level.

use crate::chain::HierarchySource;
use crate::config::SectionConfig;
use crate::document::{Category, DocumentStoreClient, RawNode};
use crate::error::NavError;
use crate::query::{Operator, QueryParams};
use crate::resolver::ChildExistenceResolver;
use crate::tree::flatten::UNCATEGORIZED_ID;
use crate::tree::{build_hierarchy, nav_item_from_raw, sort_siblings, NavItem};
use crate::types::NodeId;
use async_trait::async_trait;
use futures::try_join;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

pub const CATEGORY_LIMIT: u32 = 50;
pub const TOP_LEVEL_PAGE_LIMIT: u32 = 1000;
pub const CHILDREN_LIMIT: u32 = 100;

/// Display name of the group collecting pages without a known category
pub const OTHER_GROUP_NAME: &str = "Other";

/// Builds navigation levels for one section
#[derive(Clone)]
pub struct NavigationService {
    client: DocumentStoreClient,
    section: SectionConfig,
    resolver: ChildExistenceResolver,
}

impl NavigationService {
    pub fn new(client: DocumentStoreClient, section: SectionConfig) -> Self {
        let resolver = ChildExistenceResolver::new(client.clone(), section.collection.clone());
        Self {
            client,
            section,
            resolver,
        }
    }

    /// Published pages visible in navigation.
    ///
    /// The homepage filter applies to the page itself only. Children of an
    /// excluded homepage are never reached through the parent chain, so they
    /// are not filtered separately.
    fn visible_pages() -> QueryParams {
        QueryParams::new()
            .where_op("status", Operator::Equals, "published")
            .where_op("isSectionHomepage", Operator::NotEquals, true)
    }

    /// Categories in `sort` order, each carrying its top-level pages.
    ///
    /// Categories without visible pages are dropped. Pages with a missing or
    /// unknown category are grouped under a trailing "Other" category. A
    /// section with `group_by_category` off gets the bare pages instead.
    pub async fn top_level_tree(&self) -> Result<Vec<NavItem>, NavError> {
        let top_level = Self::visible_pages()
            .where_op("parent", Operator::Exists, false)
            .sort("sort")
            .limit(TOP_LEVEL_PAGE_LIMIT)
            .depth(0);
        let (categories, pages) = try_join!(
            self.categories(),
            self.client.find::<RawNode>(&self.section.collection, &top_level)
        )?;
        let pages = pages.docs;

        let has_children = self.resolve_level(&pages).await?;
        let roots = pages
            .iter()
            .map(|page| {
                let flag = has_children.get(&page.id).copied().unwrap_or(false);
                (page.category_id(), nav_item_from_raw(page, flag))
            })
            .collect();
        let tree = self.arrange(&categories, roots);

        info!(
            collection = %self.section.collection,
            items = tree.len(),
            pages = pages.len(),
            "Built top-level navigation tree"
        );
        Ok(tree)
    }

    /// Every visible page nested under its parent, grouped like [`Self::top_level_tree`].
    ///
    /// Pages whose parent is not visible are left out along with their subtree.
    pub async fn full_tree(&self) -> Result<Vec<NavItem>, NavError> {
        let visible = Self::visible_pages().limit(TOP_LEVEL_PAGE_LIMIT).depth(0);
        let (categories, pages) = try_join!(
            self.categories(),
            self.client.find::<RawNode>(&self.section.collection, &visible)
        )?;
        let pages = pages.docs;

        let category_of: HashMap<&str, Option<&str>> = pages
            .iter()
            .map(|page| (page.id.as_str(), page.category_id()))
            .collect();
        let roots = build_hierarchy(&pages)
            .into_iter()
            .map(|item| {
                let category = category_of.get(item.id.as_str()).copied().flatten();
                (category, item)
            })
            .collect();
        let tree = self.arrange(&categories, roots);

        info!(
            collection = %self.section.collection,
            items = tree.len(),
            pages = pages.len(),
            "Built full navigation tree"
        );
        Ok(tree)
    }

    /// Published children of `parent_id` in `sort` order
    pub async fn children_of(&self, parent_id: &str) -> Result<Vec<NavItem>, NavError> {
        let children = self
            .client
            .find::<RawNode>(
                &self.section.collection,
                &Self::visible_pages()
                    .where_op("parent", Operator::Equals, parent_id)
                    .sort("sort")
                    .limit(CHILDREN_LIMIT)
                    .depth(0),
            )
            .await?
            .docs;

        let has_children = self.resolve_level(&children).await?;
        let mut items: Vec<NavItem> = children
            .iter()
            .map(|doc| nav_item_from_raw(doc, has_children.get(&doc.id).copied().unwrap_or(false)))
            .collect();
        sort_siblings(&mut items);
        Ok(items)
    }

    fn arrange(&self, categories: &[Category], roots: Vec<(Option<&str>, NavItem)>) -> Vec<NavItem> {
        if self.section.group_by_category {
            return group_by_category(categories, roots);
        }
        let mut items: Vec<NavItem> = roots.into_iter().map(|(_, item)| item).collect();
        sort_siblings(&mut items);
        items
    }

    async fn categories(&self) -> Result<Vec<Category>, NavError> {
        if !self.section.group_by_category {
            return Ok(Vec::new());
        }
        let params = QueryParams::new().sort("sort").limit(CATEGORY_LIMIT).depth(0);
        Ok(self
            .client
            .find::<Category>(&self.section.categories_collection, &params)
            .await?
            .docs)
    }

    async fn resolve_level(&self, docs: &[RawNode]) -> Result<HashMap<NodeId, bool>, NavError> {
        let ids: HashSet<NodeId> = docs.iter().map(|doc| doc.id.clone()).collect();
        self.resolver.resolve_has_children(&ids).await
    }
}

/// One category item per category with at least one page, in category order,
/// plus a trailing "Other" group for pages with a missing or unknown category.
fn group_by_category(categories: &[Category], roots: Vec<(Option<&str>, NavItem)>) -> Vec<NavItem> {
    let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    let mut grouped: HashMap<&str, Vec<NavItem>> = HashMap::new();
    let mut other = Vec::new();
    for (category, item) in roots {
        match category.filter(|id| known.contains(id)) {
            Some(category_id) => grouped.entry(category_id).or_default().push(item),
            None => other.push(item),
        }
    }

    let mut tree = Vec::with_capacity(categories.len() + 1);
    for category in categories {
        let Some(mut pages) = grouped.remove(category.id.as_str()) else {
            debug!(category = %category.name, "Dropping category without visible pages");
            continue;
        };
        sort_siblings(&mut pages);
        tree.push(NavItem {
            sort: category.sort,
            ..NavItem::category(category.id.clone(), category.name.clone(), pages)
        });
    }

    if !other.is_empty() {
        sort_siblings(&mut other);
        let trailing_sort = categories
            .iter()
            .filter_map(|c| c.sort)
            .fold(0.0_f64, f64::max)
            + 1.0;
        tree.push(NavItem {
            sort: Some(trailing_sort),
            ..NavItem::category(UNCATEGORIZED_ID, OTHER_GROUP_NAME, other)
        });
    }
    tree
}

#[async_trait]
impl HierarchySource for NavigationService {
    async fn top_level(&self) -> Result<Vec<NavItem>, NavError> {
        self.top_level_tree().await
    }

    async fn children(&self, parent_id: &str) -> Result<Vec<NavItem>, NavError> {
        self.children_of(parent_id).await
    }
}
