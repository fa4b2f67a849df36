use anyhow::Result;

use taxotree_core::Taxotree;
use taxotree_core::config::CacheConfig;

pub(super) fn serve(app: &Taxotree, host: &str, port: u16, cache: CacheConfig) -> Result<()> {
    taxotree_web::serve_web(app.clone(), host, port, cache)
}
