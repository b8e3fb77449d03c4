//! In-process response cache for the distribution front.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use bytes::Bytes;

/// TTL policy applied to cached responses.
///
/// The effective TTL honors the origin's `Cache-Control: max-age`
/// directive, clamped to the `[min_ttl, max_ttl]` bounds; responses
/// without a directive get `default_ttl`.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Lower TTL bound. Zero allows immediate invalidation.
    pub min_ttl: Duration,
    /// TTL applied when the origin does not signal one.
    pub default_ttl: Duration,
    /// Upper TTL bound.
    pub max_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            min_ttl: Duration::ZERO,
            default_ttl: Duration::from_secs(3600),
            max_ttl: Duration::from_secs(36000),
        }
    }
}

impl CachePolicy {
    /// Compute the TTL for a response given its `Cache-Control` header.
    pub fn ttl_for(&self, cache_control: Option<&str>) -> Duration {
        let Some(cache_control) = cache_control else {
            return self.default_ttl;
        };

        let mut ttl = self.default_ttl;
        for directive in cache_control.split(',') {
            let directive = directive.trim();
            if directive.eq_ignore_ascii_case("no-store")
                || directive.eq_ignore_ascii_case("no-cache")
            {
                return Duration::ZERO;
            }
            if let Some(value) = directive
                .strip_prefix("max-age=")
                .or_else(|| directive.strip_prefix("s-maxage="))
            {
                if let Ok(secs) = value.parse::<u64>() {
                    ttl = Duration::from_secs(secs);
                }
            }
        }
        ttl.clamp(self.min_ttl, self.max_ttl)
    }
}

/// A response body held in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    /// Origin status code.
    pub status: StatusCode,
    /// Origin content type, if any.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// Response cache keyed by path plus full query string.
///
/// No header or cookie variance: two requests with identical path and
/// query share one cache slot. Stale entries are dropped on lookup and
/// swept on every insert, so the map never holds more than one stale
/// generation.
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ResponseCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fresh entry for the key.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        self.get_at(key, Instant::now())
    }

    /// Store a response under the key for the given TTL.
    pub fn put(&self, key: &str, response: CachedResponse, ttl: Duration) {
        self.put_at(key, response, ttl, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<CachedResponse> {
        {
            let entries = self.entries.read().expect("cache poisoned");
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.response.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Entry is stale, drop it.
        let mut entries = self.entries.write().expect("cache poisoned");
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        None
    }

    pub(crate) fn put_at(&self, key: &str, response: CachedResponse, ttl: Duration, now: Instant) {
        if ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.write().expect("cache poisoned");
        // Signed queries make most keys unique, so stale entries would
        // accumulate if reclamation only happened on same-key lookups.
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                response,
                expires_at: now + ttl,
            },
        );
    }

    /// Number of live and stale entries currently held.
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache poisoned").len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
