//! Navigation Tree
//!
//! Wire items, processed nodes, normalization, hierarchy construction and
//! flattening for the category → page → sub-page tree.

pub mod flatten;
pub mod hierarchy;
pub mod node;
pub mod normalize;

pub use flatten::{flatten, prev_next, FlatPage, PrevNext};
pub use hierarchy::build_hierarchy;
pub use node::{collect_ids, count_nodes, find_node, path_to, NavItem, NodeKind, ProcessedNode};
pub use normalize::{nav_item_from_raw, exclude_known, normalize, sort_siblings};
