// Airport auto-complete with a TTL cache in front of the API. The search
// form fires a lookup per keystroke and users retype the same prefixes, so
// identical queries within the TTL are served from memory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::client::{clean_query, FlightApi};
use crate::error::ApiError;
use crate::model::Airport;

const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone)]
pub struct AirportCacheConfig {
    pub ttl: Duration,
}

impl Default for AirportCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AirportCacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

struct CacheEntry {
    airports: Vec<Airport>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// Auto-complete airport search backed by any `FlightApi`, with per-query
/// result caching.
pub struct AirportSearcher {
    api: Arc<dyn FlightApi>,
    cache: DashMap<String, CacheEntry>,
    config: AirportCacheConfig,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl AirportSearcher {
    pub fn new(api: Arc<dyn FlightApi>, config: AirportCacheConfig) -> Self {
        Self {
            api,
            cache: DashMap::new(),
            config,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Look up airports for a free-text query. Queries shorter than two
    /// characters return empty without touching the network or the cache.
    pub async fn search(&self, query: &str) -> Result<Vec<Airport>, ApiError> {
        let key = clean_query(query).to_lowercase();
        if key.len() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        if let Some(entry) = self.cache.get(&key) {
            if !entry.is_expired(self.config.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "airport cache hit");
                return Ok(entry.airports.clone());
            }
        }
        // Expired entries are replaced on the way through, not swept.
        self.cache.remove(&key);

        self.misses.fetch_add(1, Ordering::Relaxed);
        let airports = self.api.autocomplete_airports(query).await?;
        self.cache.insert(
            key,
            CacheEntry {
                airports: airports.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(airports)
    }

    /// Remove cached results: a specific query, or everything when `None`.
    /// Returns how many entries were dropped.
    pub fn invalidate(&self, query: Option<&str>) -> usize {
        match query {
            Some(query) => {
                let key = clean_query(query).to_lowercase();
                usize::from(self.cache.remove(&key).is_some())
            }
            None => {
                let count = self.cache.len();
                self.cache.clear();
                count
            }
        }
    }

    pub fn stats(&self) -> AirportCacheStats {
        AirportCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }
}
