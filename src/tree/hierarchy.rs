//! Nested tree construction from flat page lists.

use crate::document::RawNode;
use crate::tree::node::NavItem;
use crate::tree::normalize::{nav_item_from_raw, sort_siblings};
use std::collections::{HashMap, HashSet};

/// Build nested wire items from flat records linked by `parent`.
///
/// Roots are records without a parent. Records whose parent is not in the
/// input, or that sit on a parent cycle, are unreachable and left out.
/// Siblings are ordered by `sort` at every level.
pub fn build_hierarchy(records: &[RawNode]) -> Vec<NavItem> {
    let mut children_by_parent: HashMap<&str, Vec<&RawNode>> = HashMap::new();
    let mut roots: Vec<&RawNode> = Vec::new();
    for record in records {
        match record.parent_id() {
            Some(parent) => children_by_parent.entry(parent).or_default().push(record),
            None => roots.push(record),
        }
    }

    let mut visited = HashSet::new();
    let mut items: Vec<NavItem> = roots
        .into_iter()
        .filter_map(|root| attach(root, &children_by_parent, &mut visited))
        .collect();
    sort_siblings(&mut items);
    items
}

fn attach<'a>(
    record: &'a RawNode,
    children_by_parent: &HashMap<&str, Vec<&'a RawNode>>,
    visited: &mut HashSet<&'a str>,
) -> Option<NavItem> {
    if !visited.insert(record.id.as_str()) {
        return None;
    }
    let mut children: Vec<NavItem> = children_by_parent
        .get(record.id.as_str())
        .map(|kids| {
            kids.iter()
                .filter_map(|kid| attach(kid, children_by_parent, visited))
                .collect()
        })
        .unwrap_or_default();
    sort_siblings(&mut children);

    let mut item = nav_item_from_raw(record, !children.is_empty());
    if !children.is_empty() {
        item.children = Some(children);
    }
    Some(item)
}
