use crate::integration::support::{chain, doc, nav_config, Reply, ScriptedTransport};
use navsync::config::SectionConfig;
use navsync::snapshot::read_snapshot;
use navsync::store::PrimarySource;
use navsync::tooling::{CliContext, Commands};
use navsync::Tier;
use serde_json::json;

fn generate(transport: std::sync::Arc<ScriptedTransport>, output: &std::path::Path) -> String {
    let ctx = CliContext::with_transport(nav_config(), transport, PrimarySource::Endpoint).unwrap();
    ctx.execute(&Commands::Snapshot {
        section: "wiki".to_string(),
        output: output.to_path_buf(),
    })
    .unwrap()
}

#[test]
fn generated_snapshot_serves_as_last_resort() {
    let transport = ScriptedTransport::new();
    transport.on_query(
        "/api/categories",
        &[],
        Reply::docs(json!([{ "id": "c1", "name": "Rooms", "sort": 1 }])),
    );
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][exists]", "false")],
        Reply::docs(json!([doc("p1", None, Some("c1"), 0.0), doc("p2", None, None, 0.0)])),
    );
    transport.on_query(
        "/api/wiki-pages",
        &[("where[parent][in]", "p1,p2")],
        Reply::docs(json!([doc("p1a", Some("p1"), None, 0.0)])),
    );
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("public").join("wiki-navigation.json");

    let message = generate(transport, &output);

    assert!(message.starts_with("Wrote 2 top-level items"));
    assert!(!output.with_extension("json.tmp").exists());
    let written = read_snapshot(&std::fs::read(&output).unwrap(), "test").unwrap();
    assert_eq!(written.len(), 2);
    assert!(written[0].children.as_deref().unwrap()[0].has_children);

    // Tier 1 and tier 2 unavailable: the file is all that is left
    let offline = ScriptedTransport::new();
    let section = SectionConfig {
        direct_fallback: None,
        static_snapshot: Some(output.display().to_string()),
        ..SectionConfig::wiki()
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let outcome = runtime.block_on(chain(offline, section).fetch_level_traced(None));

    assert_eq!(outcome.tier, Some(Tier::StaticSnapshot));
    assert_eq!(outcome.nodes.len(), 2);
    assert!(outcome.nodes[0].is_category());
    assert!(outcome.nodes[0].is_expanded());
    assert!(outcome.nodes[0].children()[0].has_children());
}

#[test]
fn empty_tree_writes_empty_array() {
    let transport = ScriptedTransport::new();
    transport.on_query("/api/categories", &[], Reply::docs(json!([])));
    transport.on_query("/api/wiki-pages", &[], Reply::docs(json!([])));
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("wiki-navigation.json");

    let message = generate(transport.clone(), &output);

    assert!(message.starts_with("Wrote 0 top-level items"));
    let raw = std::fs::read_to_string(&output).unwrap();
    assert_eq!(raw.trim(), "[]");
    // No ids to resolve, so only categories and pages were queried
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn snapshot_generation_fails_without_document_store() {
    let transport = ScriptedTransport::new();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("wiki-navigation.json");

    let ctx = CliContext::with_transport(nav_config(), transport, PrimarySource::Endpoint).unwrap();
    let result = ctx.execute(&Commands::Snapshot {
        section: "wiki".to_string(),
        output: output.clone(),
    });

    assert!(result.is_err());
    assert!(!output.exists());
}
