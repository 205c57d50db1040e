//! Tree Normalizer
//!
//! Turns wire items into processed nodes. Input is never mutated; embedded
//! children are normalized recursively whether or not a fetch path supplied
//! them.

use crate::document::RawNode;
use crate::tree::node::{NavItem, NodeKind, ProcessedNode};
use crate::types::{NodeId, DEFAULT_SORT};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::warn;

/// Ascending `sort`, absent values treated as 0. Stable for equal keys.
pub fn sort_key_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(DEFAULT_SORT).total_cmp(&b.unwrap_or(DEFAULT_SORT))
}

pub fn sort_siblings(items: &mut [NavItem]) {
    items.sort_by(|a, b| sort_key_order(a.sort, b.sort));
}

/// Normalize a level of wire items (and any embedded subtrees).
///
/// Items with an empty id, or an id already seen earlier in the same input,
/// are dropped so every id in the output is unique.
pub fn normalize(items: &[NavItem]) -> Vec<ProcessedNode> {
    let mut seen = HashSet::new();
    normalize_level(items, &mut seen)
}

/// Drop nodes (and their subtrees) whose id is already in `known`.
///
/// Used when attaching a freshly fetched level to an existing forest.
pub fn exclude_known(nodes: Vec<ProcessedNode>, known: &HashSet<NodeId>) -> Vec<ProcessedNode> {
    nodes
        .into_iter()
        .filter_map(|mut node| {
            if known.contains(&node.id) {
                warn!(id = %node.id, "Dropping fetched node already present in the tree");
                return None;
            }
            node.children = exclude_known(std::mem::take(&mut node.children), known);
            Some(node)
        })
        .collect()
}

fn normalize_level(items: &[NavItem], seen: &mut HashSet<NodeId>) -> Vec<ProcessedNode> {
    let mut ordered: Vec<&NavItem> = items.iter().collect();
    ordered.sort_by(|a, b| sort_key_order(a.sort, b.sort));

    let mut processed = Vec::with_capacity(ordered.len());
    for item in ordered {
        if item.id.is_empty() {
            warn!(title = %item.title, "Dropping navigation item without id");
            continue;
        }
        if !seen.insert(item.id.clone()) {
            warn!(id = %item.id, "Dropping duplicate navigation item");
            continue;
        }

        let children = item
            .children
            .as_deref()
            .map(|children| normalize_level(children, seen))
            .unwrap_or_default();
        let kind = if item.is_category {
            NodeKind::Category
        } else {
            NodeKind::Page
        };

        processed.push(ProcessedNode {
            id: item.id.clone(),
            title: item.title.clone(),
            slug: item.slug.clone(),
            icon: item.icon.clone(),
            icon_background_color: item.icon_background_color.clone(),
            sort: item.sort,
            kind,
            expanded: kind == NodeKind::Category,
            loading_children: false,
            has_children: item.has_children || !children.is_empty(),
            children,
        });
    }
    processed
}

/// Coerce a document store page into the wire item shape
pub fn nav_item_from_raw(raw: &RawNode, has_children: bool) -> NavItem {
    NavItem {
        id: raw.id.clone(),
        title: raw.title.clone(),
        slug: raw.slug.clone(),
        icon: raw.icon.clone(),
        icon_background_color: raw.icon_background_color.clone(),
        sort: raw.sort,
        is_category: false,
        has_children,
        children: None,
    }
}
