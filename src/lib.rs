//! navsync: Hierarchical Navigation Synchronization
//!
//! Builds, caches and lazily expands a category → page → sub-page navigation
//! tree sourced from a headless document store, degrading through a live
//! hierarchical endpoint, a direct collection query and a static snapshot.

pub mod chain;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod query;
pub mod resolver;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use chain::{FallbackChain, HierarchySource, Tier};
pub use error::NavError;
pub use store::{NavigationStore, SectionRegistry};
pub use tree::{NavItem, ProcessedNode};
