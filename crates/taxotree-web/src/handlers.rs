use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use taxotree_core::{Result, TaxoError};

use crate::WebState;
use crate::dto::{
    CacheInvalidateResponse, HealthResponse, NodeChildrenQuery, NodeChildrenResponse,
};
use crate::error::taxo_error_response;

/// Store work is synchronous; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .unwrap_or_else(|err| Err(TaxoError::Internal(format!("blocking task failed: {err}"))))
}

pub async fn healthz(State(state): State<WebState>) -> Response {
    let app = state.app.clone();
    match run_blocking(move || app.record_count()).await {
        Ok(records) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                records,
            }),
        )
            .into_response(),
        Err(err) => taxo_error_response(err, "healthz", None),
    }
}

pub async fn load_tree(State(state): State<WebState>) -> Response {
    let app = state.app.clone();
    match run_blocking(move || app.tree()).await {
        Ok(tree) => (StatusCode::OK, Json(tree)).into_response(),
        Err(err) => taxo_error_response(err, "tree.load", None),
    }
}

pub async fn node_children(
    State(state): State<WebState>,
    Query(query): Query<NodeChildrenQuery>,
) -> Response {
    let path = query.path.unwrap_or_default();
    let search = query.search.filter(|term| !term.is_empty());

    if let Some(children) = state.cache.get(&path, search.as_deref()) {
        return (StatusCode::OK, Json(NodeChildrenResponse { children })).into_response();
    }

    let app = state.app.clone();
    let (request_path, request_search) = (path.clone(), search.clone());
    let result = run_blocking(move || {
        app.node_children(Some(request_path.as_str()), request_search.as_deref())
    })
    .await;

    match result {
        Ok(children) => {
            state.cache.put(&path, search.as_deref(), &children);
            (StatusCode::OK, Json(NodeChildrenResponse { children })).into_response()
        }
        Err(err) => taxo_error_response(err, "node_children.load", Some(path)),
    }
}

pub async fn invalidate_cache(State(state): State<WebState>) -> Response {
    let evicted = state.cache.invalidate();
    (
        StatusCode::OK,
        Json(CacheInvalidateResponse {
            status: "ok",
            evicted,
        }),
    )
        .into_response()
}
