//! Query Builder
//!
//! Translates structured filters into document store list queries of the form
//! `<base>/api/<collection>?where[field][operator]=value&sort=..&limit=..&depth=..`.
//! Pure string construction: no network I/O happens here.

use crate::error::NavError;
use reqwest::Url;
use serde_json::Value;

/// Comparison operator inside a `where[field][operator]` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Exists,
    In,
    NotIn,
    /// Any operator the builder does not know; passed through verbatim so the
    /// document store decides whether to accept it.
    Other(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Exists => "exists",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Other(op) => op.as_str(),
        }
    }
}

impl From<&str> for Operator {
    fn from(op: &str) -> Self {
        match op {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "exists" => Operator::Exists,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            other => Operator::Other(other.to_string()),
        }
    }
}

/// Condition attached to one field of the `where` map
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// Bare scalar, interpreted as an equality condition
    Equals(Value),
    /// Explicit `{operator: value}` pairs, emitted in insertion order
    Conditions(Vec<(Operator, Value)>),
}

/// Structured parameters for a list query.
///
/// Insertion order is preserved so generated URLs are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    where_clauses: Vec<(String, WhereClause)>,
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality condition from a bare scalar
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.where_clauses
            .push((field.to_string(), WhereClause::Equals(value.into())));
        self
    }

    /// Operator condition; several operators on the same field accumulate
    pub fn where_op(mut self, field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        let value = value.into();
        let position = self
            .where_clauses
            .iter()
            .position(|(name, clause)| name == field && matches!(clause, WhereClause::Conditions(_)));
        match position {
            Some(index) => {
                if let WhereClause::Conditions(conditions) = &mut self.where_clauses[index].1 {
                    conditions.push((operator, value));
                }
            }
            None => self.where_clauses.push((
                field.to_string(),
                WhereClause::Conditions(vec![(operator, value)]),
            )),
        }
        self
    }

    /// Plain `key=value` parameter outside the `where` map
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn sort(self, field: &str) -> Self {
        self.param("sort", field)
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    /// Relation population depth: 0 = ids only, 1 = one level populated
    pub fn depth(self, depth: u8) -> Self {
        self.param("depth", depth)
    }

    /// True when no `where` condition is present (fetch-everything semantics)
    pub fn is_unfiltered(&self) -> bool {
        self.where_clauses.is_empty()
    }

    pub fn where_clauses(&self) -> &[(String, WhereClause)] {
        &self.where_clauses
    }
}

/// `<base>/api/<collection>`, tolerating a base URL that already ends in `/api`
pub fn collection_endpoint(base_url: &str, collection: &str) -> Result<Url, NavError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let root = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    let raw = format!("{}/api/{}", root, collection.trim_matches('/'));
    Url::parse(&raw).map_err(|e| NavError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// Build a list query URL for `collection`.
///
/// Every value is URL-encoded. An empty `where` map produces no `where[...]`
/// parameters at all.
pub fn build_query(base_url: &str, collection: &str, params: &QueryParams) -> Result<Url, NavError> {
    let mut url = collection_endpoint(base_url, collection)?;
    {
        let mut pairs = url.query_pairs_mut();
        for (field, clause) in &params.where_clauses {
            match clause {
                WhereClause::Equals(value) => {
                    pairs.append_pair(&format!("where[{}][equals]", field), &encode_value(value));
                }
                WhereClause::Conditions(conditions) => {
                    for (operator, value) in conditions {
                        pairs.append_pair(
                            &format!("where[{}][{}]", field, operator.as_str()),
                            &encode_value(value),
                        );
                    }
                }
            }
        }
        for (key, value) in &params.params {
            pairs.append_pair(key, value);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url)
}

/// Resolve a possibly relative endpoint (`/api/wiki-nav`) against a site root
pub fn resolve_endpoint(site_url: &str, endpoint: &str) -> Result<Url, NavError> {
    let invalid = |reason: String| NavError::InvalidUrl {
        url: endpoint.to_string(),
        reason,
    };
    if let Ok(absolute) = Url::parse(endpoint) {
        return Ok(absolute);
    }
    let base = Url::parse(site_url).map_err(|e| invalid(format!("bad site url {}: {}", site_url, e)))?;
    base.join(endpoint).map_err(|e| invalid(e.to_string()))
}

/// Render a JSON value the way the document store's query parser expects it.
/// Arrays become comma-separated lists (`in`/`not_in` membership).
fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(encode_value).collect::<Vec<_>>().join(","),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
