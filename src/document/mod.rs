//! Document Store Records
//!
//! Wire shapes of the headless CMS collections the navigation core reads:
//! pages (`wiki-pages`, `registry-pages`) and `categories`. Relations arrive
//! either as bare ids (`depth=0`) or as populated objects (`depth=1`).

pub mod client;

pub use client::DocumentStoreClient;

use crate::types::{NodeId, Slug};
use serde::{Deserialize, Serialize};

/// Reference to another document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Id(NodeId),
    Populated { id: NodeId },
}

impl Relation {
    pub fn id(&self) -> &str {
        match self {
            Relation::Id(id) => id,
            Relation::Populated { id } => id,
        }
    }
}

/// Publication status of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    Draft,
    #[default]
    Published,
}

/// Page record as returned by the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: NodeId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Relation>,
    #[serde(default)]
    pub status: DocStatus,
    #[serde(default)]
    pub is_section_homepage: bool,
}

impl RawNode {
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(Relation::id)
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().map(Relation::id)
    }

    pub fn is_published(&self) -> bool {
        self.status == DocStatus::Published
    }
}

/// Category record; a synthetic root one level above top-level pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<f64>,
}

/// `{ docs, totalDocs }` list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedDocs<T> {
    pub docs: Vec<T>,
    #[serde(default)]
    pub total_docs: u64,
}
