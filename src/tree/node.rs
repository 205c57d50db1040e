//! Navigation item wire shape and the client-held processed node.

use crate::types::{NodeId, Slug};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Item as served by the hierarchical endpoint and the static snapshot.
///
/// Categories carry their first-level pages in `children`; pages usually
/// arrive flat and are expanded later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub id: NodeId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<f64>,
    #[serde(default)]
    pub is_category: bool,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavItem>>,
}

impl NavItem {
    pub fn page(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: None,
            icon: None,
            icon_background_color: None,
            sort: None,
            is_category: false,
            has_children: false,
            children: None,
        }
    }

    pub fn category(id: impl Into<NodeId>, name: impl Into<String>, pages: Vec<NavItem>) -> Self {
        Self {
            has_children: !pages.is_empty(),
            is_category: true,
            children: Some(pages),
            ..Self::page(id, name)
        }
    }
}

/// Discriminates category headers from pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Page,
}

/// Navigation node with client-side presentation state.
///
/// Fields are only mutated by the navigation store that owns the forest;
/// everything handed out is a read-only view or an owned copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedNode {
    pub(crate) id: NodeId,
    pub(crate) title: String,
    pub(crate) slug: Option<Slug>,
    pub(crate) icon: Option<String>,
    pub(crate) icon_background_color: Option<String>,
    pub(crate) sort: Option<f64>,
    pub(crate) kind: NodeKind,
    pub(crate) expanded: bool,
    pub(crate) loading_children: bool,
    pub(crate) has_children: bool,
    pub(crate) children: Vec<ProcessedNode>,
}

impl ProcessedNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn icon_background_color(&self) -> Option<&str> {
        self.icon_background_color.as_deref()
    }

    pub fn sort(&self) -> Option<f64> {
        self.sort
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_category(&self) -> bool {
        self.kind == NodeKind::Category
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_loading_children(&self) -> bool {
        self.loading_children
    }

    pub fn has_children(&self) -> bool {
        self.has_children
    }

    pub fn children(&self) -> &[ProcessedNode] {
        &self.children
    }

    /// Whether expanding this node would trigger a child fetch
    pub(crate) fn needs_children(&self) -> bool {
        self.has_children && self.children.is_empty() && !self.loading_children
    }
}

/// Depth-first lookup
pub fn find_node<'a>(items: &'a [ProcessedNode], id: &str) -> Option<&'a ProcessedNode> {
    for item in items {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find_node(&item.children, id) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn find_node_mut<'a>(
    items: &'a mut [ProcessedNode],
    id: &str,
) -> Option<&'a mut ProcessedNode> {
    for item in items.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find_node_mut(&mut item.children, id) {
            return Some(found);
        }
    }
    None
}

/// Root-to-target id path within the loaded forest
pub fn path_to(items: &[ProcessedNode], id: &str) -> Option<Vec<NodeId>> {
    for item in items {
        if item.id == id {
            return Some(vec![item.id.clone()]);
        }
        if let Some(mut rest) = path_to(&item.children, id) {
            rest.insert(0, item.id.clone());
            return Some(rest);
        }
    }
    None
}

/// Every id reachable in the forest
pub fn collect_ids(items: &[ProcessedNode]) -> HashSet<NodeId> {
    let mut ids = HashSet::new();
    let mut stack: Vec<&ProcessedNode> = items.iter().collect();
    while let Some(node) = stack.pop() {
        ids.insert(node.id.clone());
        stack.extend(node.children.iter());
    }
    ids
}

/// Number of nodes in the forest
pub fn count_nodes(items: &[ProcessedNode]) -> usize {
    items
        .iter()
        .map(|item| 1 + count_nodes(&item.children))
        .sum()
}
