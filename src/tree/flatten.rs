//! Depth-first flattening of the loaded tree, used for page listings and
//! previous/next links.

use crate::tree::node::ProcessedNode;
use crate::types::NodeId;
use serde::Serialize;

pub const UNCATEGORIZED_ID: &str = "uncategorized";
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// One page in reading order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatPage {
    pub id: NodeId,
    pub title: String,
    pub slug: Option<String>,
    pub depth: usize,
    pub parent_id: Option<NodeId>,
    pub category_id: String,
    pub category_name: String,
}

/// Neighbours of the current page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrevNext<'a> {
    pub previous: Option<&'a FlatPage>,
    pub current: Option<&'a FlatPage>,
    pub next: Option<&'a FlatPage>,
}

/// Flatten pages in display order. Category headers are not emitted; their
/// pages start at depth 0. Root-level pages are grouped as uncategorized.
pub fn flatten(items: &[ProcessedNode]) -> Vec<FlatPage> {
    let mut flat = Vec::new();
    for item in items {
        if item.is_category() {
            collect(&item.children, 0, &item.id, &item.title, None, &mut flat);
        } else {
            collect(
                std::slice::from_ref(item),
                0,
                UNCATEGORIZED_ID,
                UNCATEGORIZED_NAME,
                None,
                &mut flat,
            );
        }
    }
    flat
}

fn collect(
    pages: &[ProcessedNode],
    depth: usize,
    category_id: &str,
    category_name: &str,
    parent_id: Option<&str>,
    flat: &mut Vec<FlatPage>,
) {
    for page in pages {
        flat.push(FlatPage {
            id: page.id.clone(),
            title: page.title.clone(),
            slug: page.slug.clone(),
            depth,
            parent_id: parent_id.map(str::to_string),
            category_id: category_id.to_string(),
            category_name: category_name.to_string(),
        });
        collect(
            &page.children,
            depth + 1,
            category_id,
            category_name,
            Some(&page.id),
            flat,
        );
    }
}

pub fn prev_next<'a>(flat: &'a [FlatPage], slug: &str) -> PrevNext<'a> {
    let Some(index) = flat.iter().position(|p| p.slug.as_deref() == Some(slug)) else {
        return PrevNext {
            previous: None,
            current: None,
            next: None,
        };
    };
    PrevNext {
        previous: index.checked_sub(1).and_then(|i| flat.get(i)),
        current: flat.get(index),
        next: flat.get(index + 1),
    }
}
