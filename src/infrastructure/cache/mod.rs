//! In-process TTL cache for read-heavy aggregates (dashboards, rating
//! summaries, recommendations).
//!
//! Values are stored as JSON so any serialisable DTO can be cached.
//! Patterns passed to [`CacheService::delete_pattern`] use glob syntax, e.g.
//! `dashboard:*:{user_id}`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::shared::errors::InfraResult;
use crate::shared::shutdown::ShutdownSignal;

/// TTL tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    Short,
    Medium,
    Long,
}

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct CacheService {
    entries: DashMap<String, CacheEntry>,
    short: Duration,
    medium: Duration,
    long: Duration,
}

impl CacheService {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            short: Duration::from_secs(config.short_ttl_secs),
            medium: Duration::from_secs(config.medium_ttl_secs),
            long: Duration::from_secs(config.long_ttl_secs),
        }
    }

    pub fn ttl(&self, tier: CacheTtl) -> Duration {
        match tier {
            CacheTtl::Short => self.short,
            CacheTtl::Medium => self.medium,
            CacheTtl::Long => self.long,
        }
    }

    /// Fetch a live entry. Expired or undecodable entries read as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let hit = {
            let entry = self.entries.get(key)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        };
        match hit {
            Some(value) => {
                metrics::counter!("cache_requests_total", "result" => "hit").increment(1);
                serde_json::from_value(value).ok()
            }
            None => {
                self.entries.remove_if(key, |_, e| e.is_expired(now));
                metrics::counter!("cache_requests_total", "result" => "miss").increment(1);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, tier: CacheTtl) -> InfraResult<()> {
        let value = serde_json::to_value(value)?;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl(tier),
            },
        );
        Ok(())
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove every key matching a glob pattern. Returns the number removed.
    pub fn delete_pattern(&self, pattern: &str) -> usize {
        let matcher = match glob::Pattern::new(pattern) {
            Ok(p) => p,
            Err(e) => {
                warn!(pattern, error = %e, "Invalid cache key pattern");
                return 0;
            }
        };
        let before = self.entries.len();
        self.entries.retain(|k, _| !matcher.matches(k));
        before.saturating_sub(self.entries.len())
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Periodically drop expired entries until shutdown.
    pub fn spawn_cleanup(
        self: Arc<Self>,
        interval: Duration,
        shutdown: ShutdownSignal,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.purge_expired();
                        if removed > 0 {
                            debug!(removed, "Purged expired cache entries");
                        }
                    }
                    _ = shutdown.wait() => {
                        debug!("Cache cleanup task received shutdown signal");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> CacheService {
        CacheService::new(&CacheConfig::default())
    }

    #[test]
    fn set_then_get() {
        let c = cache();
        c.set("k", &vec![1, 2, 3], CacheTtl::Short).unwrap();
        assert_eq!(c.get::<Vec<i32>>("k"), Some(vec![1, 2, 3]));
        assert!(c.delete("k"));
        assert_eq!(c.get::<Vec<i32>>("k"), None);
    }

    #[test]
    fn expired_entries_miss() {
        let c = CacheService::new(&CacheConfig {
            short_ttl_secs: 0,
            ..CacheConfig::default()
        });
        c.set("k", &1, CacheTtl::Short).unwrap();
        assert_eq!(c.get::<i32>("k"), None);
        assert!(c.is_empty());
    }

    #[test]
    fn pattern_delete() {
        let c = cache();
        c.set("dashboard:STUDENT:u1", &1, CacheTtl::Short).unwrap();
        c.set("dashboard:TEACHER:u1", &2, CacheTtl::Short).unwrap();
        c.set("dashboard:STUDENT:u2", &3, CacheTtl::Short).unwrap();
        assert_eq!(c.delete_pattern("dashboard:*:u1"), 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.delete_pattern("[invalid"), 0);
    }

    #[tokio::test]
    async fn cleanup_task_stops_on_shutdown() {
        let c = Arc::new(cache());
        let shutdown = ShutdownSignal::new();
        let handle = c.clone().spawn_cleanup(Duration::from_millis(10), shutdown.clone());
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
