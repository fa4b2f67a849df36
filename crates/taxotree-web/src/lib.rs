use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tracing::info;

use taxotree_core::Taxotree;
use taxotree_core::config::CacheConfig;

mod cache;
mod dto;
mod error;
mod handlers;
mod security;

#[cfg(test)]
mod tests;

pub use cache::ListingCache;

#[derive(Clone)]
pub(crate) struct WebState {
    pub(crate) app: Taxotree,
    pub(crate) cache: Arc<ListingCache>,
}

impl WebState {
    fn new(app: Taxotree, cache: CacheConfig) -> Self {
        Self {
            app,
            cache: Arc::new(ListingCache::new(cache)),
        }
    }
}

/// Start the taxonomy web server and block until shutdown.
///
/// # Errors
/// Returns an error when the store cannot be read at startup, the runtime cannot
/// be created, the socket cannot be bound, or the server exits with a failure.
pub fn serve_web(app: Taxotree, host: &str, port: u16, cache: CacheConfig) -> Result<()> {
    let records = app
        .record_count()
        .context("startup check failed; refusing to serve an unreadable store")?;
    let state = WebState::new(app, cache);
    let bind_addr = format!("{host}:{port}");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build web runtime")?;

    info!(
        records,
        cache_ttl_secs = cache.ttl.as_secs(),
        "taxonomy store ready"
    );

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind web server at {bind_addr}"))?;
        info!("taxonomy api listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app_router(state))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("web server failed")
    })
}

pub(crate) fn app_router(state: WebState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/tree", get(handlers::load_tree))
        .route("/api/node-children", get(handlers::node_children))
        .route("/api/cache/invalidate", post(handlers::invalidate_cache))
        .layer(middleware::from_fn(security::api_headers_middleware))
        .with_state(state)
}
