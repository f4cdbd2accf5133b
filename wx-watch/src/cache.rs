//! TTL cache for station reports.
//!
//! One entry per station, so cardinality is bounded by the registry size.
//! The aggregator owns the cache; a forced refresh invalidates it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::IcaoCode;
use crate::source::StationReport;

/// Default time-to-live for reports and the published snapshot.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

/// Cache of successfully fetched station reports.
///
/// Failed fetches are never cached, so an unavailable station is retried on
/// the next cycle.
#[derive(Clone)]
pub struct ReportCache {
    reports: MokaCache<IcaoCode, Arc<StationReport>>,
    ttl: Duration,
}

impl ReportCache {
    pub fn new(config: &CacheConfig) -> Self {
        let reports = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            reports,
            ttl: config.ttl,
        }
    }

    pub async fn get(&self, code: &IcaoCode) -> Option<Arc<StationReport>> {
        self.reports.get(code).await
    }

    pub async fn insert(&self, code: IcaoCode, report: Arc<StationReport>) {
        self.reports.insert(code, report).await;
    }

    pub async fn invalidate(&self, code: &IcaoCode) {
        self.reports.invalidate(code).await;
    }

    pub fn invalidate_all(&self) {
        self.reports.invalidate_all();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
