use crate::integration::support::{client, doc, Reply, ScriptedTransport};
use navsync::resolver::ChildExistenceResolver;
use navsync::types::NodeId;
use navsync::NavError;
use serde_json::json;
use std::collections::HashSet;

fn ids(raw: &[&str]) -> HashSet<NodeId> {
    raw.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn whole_level_resolved_with_one_query() {
    let transport = ScriptedTransport::new();
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][in]", "a,b,c,d,e")],
        Reply::docs(json!([
            doc("a1", Some("a"), None, 0.0),
            doc("a2", Some("a"), None, 1.0),
            doc("d1", Some("d"), None, 0.0),
        ])),
    );
    let resolver = ChildExistenceResolver::new(client(transport.clone()), "wiki-pages");

    let flags = resolver
        .resolve_has_children(&ids(&["e", "c", "a", "d", "b"]))
        .await
        .unwrap();

    assert_eq!(transport.requests().len(), 1);
    assert_eq!(flags.len(), 5);
    assert!(flags["a"]);
    assert!(flags["d"]);
    assert!(!flags["b"]);
    assert!(!flags["c"]);
    assert!(!flags["e"]);

    let request = &transport.requests()[0];
    let pairs: Vec<(String, String)> = request
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let expect = |k: &str, v: &str| (k.to_string(), v.to_string());
    assert!(pairs.contains(&expect("where[status][equals]", "published")));
    assert!(pairs.contains(&expect("where[isSectionHomepage][not_equals]", "true")));
    assert!(pairs.contains(&expect("limit", "1000")));
    assert!(pairs.contains(&expect("depth", "0")));
}

#[tokio::test]
async fn empty_level_makes_no_request() {
    let transport = ScriptedTransport::new();
    let resolver = ChildExistenceResolver::new(client(transport.clone()), "wiki-pages");

    let flags = resolver.resolve_has_children(&HashSet::new()).await.unwrap();

    assert!(flags.is_empty());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn populated_parent_relations_are_understood() {
    let transport = ScriptedTransport::new();
    transport.on_query(
        "/api/registry-pages",
        &[("where[parent][in]", "x,y")],
        Reply::docs(json!([{ "id": "y1", "parent": { "id": "y", "title": "Y" } }])),
    );
    let resolver = ChildExistenceResolver::new(client(transport.clone()), "registry-pages");

    let flags = resolver.resolve_has_children(&ids(&["x", "y"])).await.unwrap();

    assert!(!flags["x"]);
    assert!(flags["y"]);
}

#[tokio::test]
async fn lookup_failure_is_reported() {
    let transport = ScriptedTransport::new();
    transport.on_query("/api/wiki-pages", &[], Reply::Status(401));
    let resolver = ChildExistenceResolver::new(client(transport.clone()), "wiki-pages");

    let err = resolver.resolve_has_children(&ids(&["a"])).await.unwrap_err();

    assert!(matches!(err, NavError::HttpStatus { status: 401, .. }));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn scan_limit_is_applied() {
    let transport = ScriptedTransport::new();
    transport.on_query("/api/wiki-pages", &[("limit", "25")], Reply::docs(json!([])));
    let resolver =
        ChildExistenceResolver::new(client(transport.clone()), "wiki-pages").with_scan_limit(25);

    let flags = resolver.resolve_has_children(&ids(&["a"])).await.unwrap();

    assert!(!flags["a"]);
    assert_eq!(transport.count_query("/api/wiki-pages", &[("limit", "25")]), 1);
}
