//! Core types shared across the navigation modules.

/// NodeId: store-assigned identifier of a page or category document
pub type NodeId = String;

/// Slug: URL segment of a page, unique within a section
pub type Slug = String;

/// Sort key used when a document carries no `sort` field
pub const DEFAULT_SORT: f64 = 0.0;
