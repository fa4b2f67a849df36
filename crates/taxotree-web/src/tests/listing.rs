use axum::http::StatusCode;
use serde_json::{Value, json};

use super::harness::{TestHarness, decode_json};

#[tokio::test]
async fn tree_endpoint_returns_eager_hierarchy() {
    let harness = TestHarness::setup();
    let response = harness.get("/api/tree").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = decode_json(response).await;
    assert_eq!(body["name"], "Animal");
    assert_eq!(body["size"], 50);
    assert_eq!(body["children"][0]["name"], "Dog");
    assert_eq!(body["children"][0]["children"][0]["name"], "Puppy");
    assert_eq!(body["children"][1]["name"], "Cat");
    assert_eq!(body["children"][1]["children"], json!([]));
}

#[tokio::test]
async fn missing_path_lists_top_level_nodes() {
    let harness = TestHarness::setup();
    for uri in ["/api/node-children", "/api/node-children?path="] {
        let response = harness.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = decode_json(response).await;
        let names = body["children"]
            .as_array()
            .expect("children array")
            .iter()
            .map(|child| child["name"].as_str().expect("name").to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Animal", "Plant"]);
        assert_eq!(body["children"][0]["hasChildren"], true);
    }
}

#[tokio::test]
async fn node_children_uses_lazy_view_field_names() {
    let harness = TestHarness::setup();
    let response = harness
        .get("/api/node-children?path=Animal&search=puppy")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = decode_json(response).await;
    assert_eq!(
        body,
        json!({
            "children": [
                {
                    "name": "Dog",
                    "size": 10,
                    "hasChildren": true,
                    "matchesSearch": false,
                    "hasSearchMatchInChildren": true
                },
                {
                    "name": "Cat",
                    "size": 5,
                    "hasChildren": false,
                    "matchesSearch": false,
                    "hasSearchMatchInChildren": false
                }
            ]
        })
    );
}

#[tokio::test]
async fn path_with_delimiter_is_accepted_url_encoded() {
    let harness = TestHarness::setup();
    let response = harness
        .get("/api/node-children?path=Animal%20%3E%20Dog")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body["children"][0]["name"], "Puppy");
    assert_eq!(body["children"][0]["hasChildren"], false);
}

#[tokio::test]
async fn short_search_terms_are_ignored() {
    let harness = TestHarness::setup();
    let plain: Value = decode_json(harness.get("/api/node-children?path=Animal").await).await;
    let short: Value =
        decode_json(harness.get("/api/node-children?path=Animal&search=do").await).await;
    assert_eq!(plain, short);
}

#[tokio::test]
async fn unknown_path_yields_empty_listing() {
    let harness = TestHarness::setup();
    let response = harness.get("/api/node-children?path=Fungus").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({ "children": [] }));
}

#[tokio::test]
async fn global_search_returns_top_level_rollups() {
    let harness = TestHarness::setup();
    let response = harness.get("/api/node-children?search=dog").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({ "children": [{ "name": "Animal", "size": 11 }] }));
}

#[tokio::test]
async fn listings_are_cached_until_invalidated() {
    let harness = TestHarness::setup();
    assert!(harness.state.cache.is_empty());

    let _ = harness.get("/api/node-children?path=Animal").await;
    let _ = harness.get("/api/node-children?path=Animal&search=puppy").await;
    let _ = harness.get("/api/node-children").await;
    assert_eq!(harness.state.cache.len(), 2);

    let response = harness.post("/api/cache/invalidate").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({ "status": "ok", "evicted": 2 }));
    assert!(harness.state.cache.is_empty());
}

#[tokio::test]
async fn healthz_reports_record_count() {
    let harness = TestHarness::setup();
    let response = harness.get("/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({ "status": "ok", "records": 6 }));
}
