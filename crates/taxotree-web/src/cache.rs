//! Listing cache at the HTTP boundary.
//!
//! Entries are keyed by `(path, effective search term)` and expire after the
//! configured TTL. Top-level listings are never cached so the first screen is
//! always fresh. The store is read-only while serving, so invalidation is only
//! needed after an offline re-import.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use taxotree_core::SearchTerm;
use taxotree_core::config::CacheConfig;
use taxotree_core::models::ChildListing;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: String,
    search: Option<SearchTerm>,
}

#[derive(Debug)]
struct CacheEntry {
    listing: ChildListing,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct ListingCache {
    config: CacheConfig,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ListingCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(path: &str, search: Option<&str>) -> Option<CacheKey> {
        if path.is_empty() {
            return None;
        }
        Some(CacheKey {
            path: path.to_string(),
            search: SearchTerm::activate(search),
        })
    }

    pub fn get(&self, path: &str, search: Option<&str>) -> Option<ChildListing> {
        if !self.config.enabled() {
            return None;
        }
        let key = Self::key(path, search)?;
        let mut entries = self.entries.lock().ok()?;
        let hit = entries.get(&key).map(|entry| {
            (entry.stored_at.elapsed() < self.config.ttl).then(|| entry.listing.clone())
        });
        match hit {
            Some(Some(listing)) => Some(listing),
            Some(None) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, path: &str, search: Option<&str>, listing: &ChildListing) {
        if !self.config.enabled() {
            return;
        }
        let Some(key) = Self::key(path, search) else {
            return;
        };
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() >= self.config.max_entries && !entries.contains_key(&key) {
            let ttl = self.config.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            if entries.len() >= self.config.max_entries
                && let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                listing: listing.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry; returns how many were held.
    pub fn invalidate(&self) -> usize {
        self.entries
            .lock()
            .map(|mut entries| {
                let evicted = entries.len();
                entries.clear();
                evicted
            })
            .unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use taxotree_core::models::LazyNodeView;

    use super::*;

    fn listing(name: &str) -> ChildListing {
        ChildListing::Nodes(vec![LazyNodeView {
            name: name.to_string(),
            size: 1,
            has_children: false,
            matches_search: false,
            has_search_match_in_children: false,
        }])
    }

    fn cache(ttl: Duration, max_entries: usize) -> ListingCache {
        ListingCache::new(CacheConfig { ttl, max_entries })
    }

    #[test]
    fn short_terms_share_the_unsearched_entry() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.put("Animal", Some("do"), &listing("Dog"));
        assert_eq!(cache.get("Animal", None), Some(listing("Dog")));
        assert_eq!(cache.get("Animal", Some("d")), Some(listing("Dog")));
        assert_eq!(cache.get("Animal", Some("dog")), None);
    }

    #[test]
    fn top_level_listings_are_not_cached() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.put("", None, &listing("Animal"));
        assert!(cache.is_empty());
        assert_eq!(cache.get("", None), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = cache(Duration::from_millis(5), 8);
        cache.put("Animal", None, &listing("Dog"));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("Animal", None), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = cache(Duration::ZERO, 8);
        cache.put("Animal", None, &listing("Dog"));
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_evicts_oldest_entry() {
        let cache = cache(Duration::from_secs(60), 2);
        cache.put("A", None, &listing("a"));
        std::thread::sleep(Duration::from_millis(2));
        cache.put("B", None, &listing("b"));
        std::thread::sleep(Duration::from_millis(2));
        cache.put("C", None, &listing("c"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A", None), None);
        assert_eq!(cache.get("C", None), Some(listing("c")));
    }

    #[test]
    fn invalidate_reports_evicted_count() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.put("A", None, &listing("a"));
        cache.put("B", Some("term"), &listing("b"));
        assert_eq!(cache.invalidate(), 2);
        assert!(cache.is_empty());
    }
}
