use axum::http::StatusCode;
use serde_json::Value;

use super::harness::{TestHarness, decode_json};

#[tokio::test]
async fn empty_store_tree_is_not_found() {
    let harness = TestHarness::with_records(&[]);
    let response = harness.get("/api/tree").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = decode_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["operation"], "tree.load");
    assert!(body["trace_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn store_failure_surfaces_as_server_error() {
    let harness = TestHarness::setup();
    let conn = rusqlite::Connection::open(&harness.db_path).expect("open side connection");
    conn.execute_batch("DROP TABLE taxonomy_nodes;")
        .expect("drop table");

    let response = harness.get("/api/node-children?path=Animal").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = decode_json(response).await;
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert_eq!(body["operation"], "node_children.load");
    assert_eq!(body["path"], "Animal");
    assert!(harness.state.cache.is_empty());
}
