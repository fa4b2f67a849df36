use serde::{Deserialize, Serialize};

use taxotree_core::models::ChildListing;

#[derive(Debug, Deserialize)]
pub struct NodeChildrenQuery {
    pub path: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeChildrenResponse {
    pub children: ChildListing,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheInvalidateResponse {
    pub status: &'static str,
    pub evicted: usize,
}
