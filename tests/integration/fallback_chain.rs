use crate::integration::support::{
    category, chain, children_path, doc, endpoints_only, page, Reply, ScriptedTransport,
};
use navsync::config::SectionConfig;
use navsync::Tier;
use serde_json::json;
use std::io::Write;

const TOP_LEVEL_DIRECT: &[(&str, &str)] = &[("where[parent][exists]", "false")];
const SNAPSHOT_PATH: &str = "/wiki-navigation.json";

#[tokio::test]
async fn top_level_from_hierarchical_endpoint() {
    let transport = ScriptedTransport::new();
    transport.on_exact(
        "/api/wiki-nav",
        Reply::Json(json!([
            category("cat1", "Rooms", vec![page("p1", false)]),
            category("cat2", "Dining", vec![page("p2", true)]),
        ])),
    );

    let outcome = chain(transport.clone(), SectionConfig::wiki())
        .fetch_level_traced(None)
        .await;

    assert_eq!(outcome.tier, Some(Tier::Hierarchical));
    assert_eq!(outcome.attempted, vec![Tier::Hierarchical]);
    assert_eq!(outcome.nodes.len(), 2);
    for node in &outcome.nodes {
        assert!(node.is_category());
        assert!(node.is_expanded());
        assert_eq!(node.children().len(), 1);
    }
    assert!(outcome.nodes[1].children()[0].has_children());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn child_timeout_without_fallback_resolves_empty() {
    let transport = ScriptedTransport::new();
    transport.on_exact(&children_path("cat1"), Reply::Hang);

    let chain = chain(transport.clone(), endpoints_only());
    let outcome = chain.fetch_level_traced(Some("cat1")).await;

    assert!(outcome.nodes.is_empty());
    assert_eq!(outcome.tier, None);
    assert_eq!(outcome.attempted, vec![Tier::Hierarchical]);
    // Default policy: two attempts, each bounded by the timeout
    assert_eq!(transport.count_exact(&children_path("cat1")), 2);
}

#[tokio::test]
async fn empty_tier_one_falls_to_direct_collection_before_snapshot() {
    let transport = ScriptedTransport::new();
    transport.on_exact("/api/wiki-nav", Reply::Json(json!([])));
    transport.on_query(
        "/api/wiki-pages",
        TOP_LEVEL_DIRECT,
        Reply::docs(json!([doc("a", None, None, 2.0), doc("b", None, None, 1.0)])),
    );
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][in]", "a,b")],
        Reply::docs(json!([doc("a1", Some("a"), None, 0.0)])),
    );
    transport.on_exact(SNAPSHOT_PATH, Reply::Json(json!([page("from-snapshot", false)])));

    let outcome = chain(transport.clone(), SectionConfig::wiki())
        .fetch_level_traced(None)
        .await;

    assert_eq!(outcome.tier, Some(Tier::DirectCollection));
    assert_eq!(
        outcome.attempted,
        vec![Tier::Hierarchical, Tier::DirectCollection]
    );
    let ids: Vec<&str> = outcome.nodes.iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!(outcome.nodes.iter().all(|n| !n.is_category()));
    assert!(outcome.nodes[1].has_children());
    assert!(!outcome.nodes[0].has_children());

    let requests = transport.requests();
    assert_eq!(requests[0].path(), "/api/wiki-nav");
    assert_eq!(requests[1].path(), "/api/wiki-pages");
    assert_eq!(transport.count_path(SNAPSHOT_PATH), 0);
}

#[tokio::test]
async fn failing_tiers_fall_through_to_remote_snapshot() {
    let transport = ScriptedTransport::new();
    transport.on_exact("/api/wiki-nav", Reply::Status(400));
    transport.on_query("/api/wiki-pages", TOP_LEVEL_DIRECT, Reply::docs(json!([])));
    transport.on_exact(
        SNAPSHOT_PATH,
        Reply::Json(json!([category("cat1", "Rooms", vec![page("p1", false)])])),
    );

    let outcome = chain(transport.clone(), SectionConfig::wiki())
        .fetch_level_traced(None)
        .await;

    assert_eq!(outcome.tier, Some(Tier::StaticSnapshot));
    assert_eq!(
        outcome.attempted,
        vec![Tier::Hierarchical, Tier::DirectCollection, Tier::StaticSnapshot]
    );
    assert_eq!(outcome.nodes.len(), 1);
    assert_eq!(outcome.nodes[0].children()[0].id(), "p1");
    let snapshot_request = transport.requests().last().cloned().unwrap();
    assert_eq!(snapshot_request.as_str(), "http://site.local/wiki-navigation.json");
}

#[tokio::test]
async fn snapshot_file_backs_the_top_level() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!([category("cat1", "Rooms", vec![page("p1", true), page("p2", false)])])
    )
    .unwrap();

    let transport = ScriptedTransport::new();
    let section = SectionConfig {
        direct_fallback: None,
        static_snapshot: Some(file.path().display().to_string()),
        ..SectionConfig::wiki()
    };
    let outcome = chain(transport.clone(), section)
        .fetch_level_traced(None)
        .await;

    assert_eq!(outcome.tier, Some(Tier::StaticSnapshot));
    assert_eq!(outcome.nodes[0].children().len(), 2);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn error_body_is_not_retried_and_falls_back() {
    let transport = ScriptedTransport::new();
    transport.on_exact(
        &children_path("p1"),
        Reply::Json(json!({ "errors": [{ "message": "Something went wrong" }] })),
    );
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][equals]", "p1")],
        Reply::docs(json!([doc("p1a", Some("p1"), None, 0.0)])),
    );

    let outcome = chain(transport.clone(), SectionConfig::wiki())
        .fetch_level_traced(Some("p1"))
        .await;

    assert_eq!(transport.count_exact(&children_path("p1")), 1);
    assert_eq!(outcome.tier, Some(Tier::DirectCollection));
    assert_eq!(outcome.nodes[0].id(), "p1a");
    assert!(!outcome.nodes[0].has_children());
    assert_eq!(transport.count_path(SNAPSHOT_PATH), 0);
}

#[tokio::test]
async fn child_existence_failure_keeps_fallback_items() {
    let transport = ScriptedTransport::new();
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][equals]", "p1")],
        Reply::docs(json!([doc("x", Some("p1"), None, 0.0), doc("y", Some("p1"), None, 1.0)])),
    );
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][in]", "x,y")],
        Reply::Status(400),
    );

    let nodes = chain(transport.clone(), SectionConfig::wiki())
        .fetch_level(Some("p1"))
        .await;

    assert_eq!(nodes.len(), 2);
    assert!(nodes.iter().all(|n| !n.has_children()));
}

#[tokio::test]
async fn children_never_consult_the_snapshot() {
    let transport = ScriptedTransport::new();
    transport.on_exact(SNAPSHOT_PATH, Reply::Json(json!([page("p9", false)])));

    let outcome = chain(transport.clone(), SectionConfig::wiki())
        .fetch_level_traced(Some("cat1"))
        .await;

    assert!(outcome.nodes.is_empty());
    assert!(!outcome.attempted.contains(&Tier::StaticSnapshot));
    assert_eq!(transport.count_path(SNAPSHOT_PATH), 0);
}
