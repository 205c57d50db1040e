use crate::integration::support::{chain, client, doc, Reply, ScriptedTransport};
use navsync::config::SectionConfig;
use navsync::service::{NavigationService, OTHER_GROUP_NAME};
use navsync::tree::flatten::UNCATEGORIZED_ID;
use navsync::{NavItem, NavigationStore, Tier};
use serde_json::{json, Value};
use std::sync::Arc;

const PAGES: &str = "/api/wiki-pages";
const CATEGORIES: &str = "/api/categories";

fn categories() -> Reply {
    Reply::docs(json!([
        { "id": "c2", "name": "Rooms", "sort": 1 },
        { "id": "c1", "name": "Dining", "sort": 2 },
        { "id": "c3", "name": "Empty", "sort": 3 },
    ]))
}

fn titles(items: &[NavItem]) -> Vec<&str> {
    items.iter().map(|item| item.title.as_str()).collect()
}

fn ids(items: &[NavItem]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

fn service(transport: Arc<ScriptedTransport>) -> NavigationService {
    NavigationService::new(client(transport), SectionConfig::wiki())
}

fn top_level_pages() -> Value {
    json!([
        doc("r1", None, Some("c2"), 1.0),
        doc("r2", None, Some("c2"), 0.0),
        doc("d1", None, Some("c1"), 0.0),
        doc("o1", None, None, 0.0),
        doc("o2", None, Some("deleted"), 1.0),
    ])
}

#[tokio::test]
async fn top_level_groups_pages_under_categories() {
    let transport = ScriptedTransport::new();
    transport.on_query(CATEGORIES, &[], categories());
    transport.on_query(PAGES, &[("where[parent][exists]", "false")], Reply::docs(top_level_pages()));
    transport.on_query(
        PAGES,
        &[("where[parent][in]", "d1,o1,o2,r1,r2")],
        Reply::docs(json!([doc("r1a", Some("r1"), None, 0.0)])),
    );

    let tree = service(transport.clone()).top_level_tree().await.unwrap();

    assert_eq!(titles(&tree), vec!["Rooms", "Dining", OTHER_GROUP_NAME]);
    assert!(tree.iter().all(|group| group.is_category));

    let rooms = tree[0].children.as_deref().unwrap();
    assert_eq!(ids(rooms), vec!["r2", "r1"]);
    assert!(rooms[1].has_children);
    assert!(!rooms[0].has_children);

    let other = &tree[2];
    assert_eq!(other.id, UNCATEGORIZED_ID);
    assert_eq!(other.sort, Some(4.0));
    assert_eq!(ids(other.children.as_deref().unwrap()), vec!["o1", "o2"]);

    assert_eq!(transport.requests().len(), 3);
    assert_eq!(
        transport.count_query(
            PAGES,
            &[
                ("where[status][equals]", "published"),
                ("where[isSectionHomepage][not_equals]", "true"),
                ("limit", "1000"),
                ("depth", "0"),
            ]
        ),
        2
    );
    assert_eq!(
        transport.count_query(CATEGORIES, &[("sort", "sort"), ("limit", "50")]),
        1
    );
}

#[tokio::test]
async fn top_level_without_uncategorized_pages_has_no_other_group() {
    let transport = ScriptedTransport::new();
    transport.on_query(CATEGORIES, &[], categories());
    transport.on_query(
        PAGES,
        &[("where[parent][exists]", "false")],
        Reply::docs(json!([doc("d1", None, Some("c1"), 0.0)])),
    );
    transport.on_query(PAGES, &[("where[parent][in]", "d1")], Reply::docs(json!([])));

    let tree = service(transport).top_level_tree().await.unwrap();

    assert_eq!(titles(&tree), vec!["Dining"]);
}

#[tokio::test]
async fn children_of_queries_one_level() {
    let transport = ScriptedTransport::new();
    transport.on_query(
        PAGES,
        &[("where[parent][equals]", "p1")],
        Reply::docs(json!([doc("b", Some("p1"), None, 5.0), doc("a", Some("p1"), None, 1.0)])),
    );
    transport.on_query(
        PAGES,
        &[("where[parent][in]", "a,b")],
        Reply::docs(json!([doc("b1", Some("b"), None, 0.0)])),
    );

    let items = service(transport.clone()).children_of("p1").await.unwrap();

    assert_eq!(ids(&items), vec!["a", "b"]);
    assert!(!items[0].has_children);
    assert!(items[1].has_children);
    assert!(items.iter().all(|item| !item.is_category));
    assert_eq!(
        transport.count_query(
            PAGES,
            &[
                ("where[parent][equals]", "p1"),
                ("where[status][equals]", "published"),
                ("where[isSectionHomepage][not_equals]", "true"),
                ("sort", "sort"),
                ("limit", "100"),
                ("depth", "0"),
            ]
        ),
        1
    );
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn full_tree_nests_every_visible_page() {
    let transport = ScriptedTransport::new();
    transport.on_query(CATEGORIES, &[], categories());
    transport.on_query(
        PAGES,
        &[],
        Reply::docs(json!([
            doc("a1x", Some("a1"), None, 0.0),
            doc("a", None, Some("c1"), 0.0),
            doc("a1", Some("a"), None, 0.0),
            doc("b", None, None, 0.0),
            doc("stray", Some("hidden"), None, 0.0),
        ])),
    );

    let tree = service(transport.clone()).full_tree().await.unwrap();

    assert_eq!(titles(&tree), vec!["Dining", OTHER_GROUP_NAME]);
    let a = &tree[0].children.as_deref().unwrap()[0];
    assert_eq!(a.id, "a");
    assert!(a.has_children);
    let a1 = &a.children.as_deref().unwrap()[0];
    assert_eq!(a1.id, "a1");
    assert_eq!(ids(a1.children.as_deref().unwrap()), vec!["a1x"]);
    assert_eq!(ids(tree[1].children.as_deref().unwrap()), vec!["b"]);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn in_process_tier_one_skips_the_http_endpoint() {
    let transport = ScriptedTransport::new();
    transport.on_query(CATEGORIES, &[], categories());
    transport.on_query(PAGES, &[("where[parent][exists]", "false")], Reply::docs(top_level_pages()));
    transport.on_query(
        PAGES,
        &[("where[parent][in]", "d1,o1,o2,r1,r2")],
        Reply::docs(json!([doc("r1a", Some("r1"), None, 0.0)])),
    );
    transport.on_query(
        PAGES,
        &[("where[parent][equals]", "r1")],
        Reply::docs(json!([doc("r1a", Some("r1"), None, 0.0)])),
    );
    transport.on_query(PAGES, &[("where[parent][in]", "r1a")], Reply::docs(json!([])));

    let chain = chain(transport.clone(), SectionConfig::wiki())
        .with_primary(Arc::new(service(transport.clone())));
    let outcome = chain.fetch_level_traced(None).await;
    assert_eq!(outcome.tier, Some(Tier::Hierarchical));
    assert_eq!(outcome.nodes.len(), 3);

    let store = NavigationStore::new(chain);
    store.ensure_initialized().await;
    store.toggle_expand("r1").await;

    let r1 = store.find_by_id("r1").unwrap();
    assert!(r1.is_expanded());
    assert_eq!(r1.children()[0].id(), "r1a");
    assert_eq!(transport.count_path("/api/wiki-nav"), 0);
}

#[tokio::test]
async fn registry_top_level_is_a_flat_page_list() {
    let transport = ScriptedTransport::new();
    transport.on_query(
        "/api/registry-pages",
        &[("where[parent][exists]", "false")],
        Reply::docs(json!([doc("g2", None, None, 2.0), doc("g1", None, Some("c1"), 1.0)])),
    );
    transport.on_query(
        "/api/registry-pages",
        &[("where[parent][in]", "g1,g2")],
        Reply::docs(json!([doc("g1a", Some("g1"), None, 0.0)])),
    );

    let registry = NavigationService::new(client(transport.clone()), SectionConfig::registry());
    let tree = registry.top_level_tree().await.unwrap();

    assert_eq!(ids(&tree), vec!["g1", "g2"]);
    assert!(tree.iter().all(|item| !item.is_category));
    assert!(tree[0].has_children);
    assert_eq!(transport.count_path(CATEGORIES), 0);
    assert_eq!(transport.requests().len(), 2);
}
