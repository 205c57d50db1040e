//! Configuration
//!
//! One [`SectionConfig`] per content section replaces module-level store
//! singletons: each section names its hierarchical endpoint, optional
//! children endpoint pattern, optional direct collection fallback and
//! optional static snapshot.

pub mod facade;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::NavError;
use crate::fetch::RetryPolicy;
use crate::logging::LoggingConfig;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted with the URL-encoded parent id
pub const PARENT_ID_PLACEHOLDER: &str = "{parent_id}";

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_categories_collection() -> String {
    "categories".to_string()
}

fn default_fallback_limit() -> u32 {
    100
}

fn default_group_by_category() -> bool {
    true
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavConfig {
    /// Root that relative section endpoints are resolved against
    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default)]
    pub document_store: DocumentStoreConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default = "default_sections")]
    pub sections: BTreeMap<String, SectionConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            document_store: DocumentStoreConfig::default(),
            retry: RetryPolicy::default(),
            sections: default_sections(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NavConfig {
    pub fn section(&self, name: &str) -> Result<&SectionConfig, NavError> {
        self.sections
            .get(name)
            .ok_or_else(|| NavError::UnknownSection(name.to_string()))
    }

    pub fn validate(&self) -> Result<(), NavError> {
        if self.retry.attempts == 0 {
            return Err(NavError::ConfigError(
                "retry.attempts must be at least 1".to_string(),
            ));
        }
        if self.document_store.base_url.trim().is_empty() {
            return Err(NavError::ConfigError(
                "document_store.base_url cannot be empty".to_string(),
            ));
        }
        for (name, section) in &self.sections {
            section.validate().map_err(|e| {
                NavError::ConfigError(format!("Invalid section '{}': {}", name, e))
            })?;
        }
        Ok(())
    }
}

/// Document store (headless CMS) connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// Base URL; a trailing `/api` is tolerated
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Tier 2: flat filtered query straight against the page collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectFallback {
    pub collection: String,
    #[serde(default = "default_fallback_limit")]
    pub limit: u32,
}

/// Per-section navigation sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Page collection backing this section
    pub collection: String,

    #[serde(default = "default_categories_collection")]
    pub categories_collection: String,

    /// Tier 1 top-level tree endpoint
    pub primary_endpoint: String,

    /// Tier 1 children endpoint, containing `{parent_id}`
    #[serde(default)]
    pub children_endpoint_pattern: Option<String>,

    #[serde(default)]
    pub direct_fallback: Option<DirectFallback>,

    /// Tier 3 snapshot: http(s) URL or filesystem path
    #[serde(default)]
    pub static_snapshot: Option<String>,

    /// Wrap top-level pages in category items. When off, the top level is
    /// the flat list of parentless pages.
    #[serde(default = "default_group_by_category")]
    pub group_by_category: bool,
}

impl SectionConfig {
    pub fn wiki() -> Self {
        Self::for_collection("wiki-pages", "/api/wiki-nav", "/wiki-navigation.json")
    }

    pub fn registry() -> Self {
        Self {
            group_by_category: false,
            ..Self::for_collection("registry-pages", "/api/registry-nav", "/registry-navigation.json")
        }
    }

    fn for_collection(collection: &str, endpoint: &str, snapshot: &str) -> Self {
        Self {
            collection: collection.to_string(),
            categories_collection: default_categories_collection(),
            primary_endpoint: endpoint.to_string(),
            children_endpoint_pattern: Some(format!("{}?parentId={}", endpoint, PARENT_ID_PLACEHOLDER)),
            direct_fallback: Some(DirectFallback {
                collection: collection.to_string(),
                limit: default_fallback_limit(),
            }),
            static_snapshot: Some(snapshot.to_string()),
            group_by_category: default_group_by_category(),
        }
    }

    /// Children endpoint for `parent_id`, if a pattern is configured
    pub fn children_endpoint(&self, parent_id: &str) -> Option<String> {
        self.children_endpoint_pattern
            .as_ref()
            .map(|pattern| {
                let encoded = utf8_percent_encode(parent_id, NON_ALPHANUMERIC).to_string();
                pattern.replace(PARENT_ID_PLACEHOLDER, &encoded)
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.primary_endpoint.trim().is_empty() {
            return Err("primary_endpoint cannot be empty".to_string());
        }
        if self.collection.trim().is_empty() {
            return Err("collection cannot be empty".to_string());
        }
        if let Some(pattern) = &self.children_endpoint_pattern {
            if !pattern.contains(PARENT_ID_PLACEHOLDER) {
                return Err(format!(
                    "children_endpoint_pattern must contain {}",
                    PARENT_ID_PLACEHOLDER
                ));
            }
        }
        if let Some(fallback) = &self.direct_fallback {
            if fallback.collection.trim().is_empty() {
                return Err("direct_fallback.collection cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

fn default_sections() -> BTreeMap<String, SectionConfig> {
    let mut sections = BTreeMap::new();
    sections.insert("wiki".to_string(), SectionConfig::wiki());
    sections.insert("registry".to_string(), SectionConfig::registry());
    sections
}
