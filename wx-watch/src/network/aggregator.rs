//! Concurrent, cached polling of the station network.
//!
//! A cycle fetches every station in parallel, classifies each result and
//! publishes one [`NetworkSnapshot`]. Stations are isolated from each other:
//! a failed, slow or panicking fetch only makes that station unavailable.
//!
//! Each cycle runs on its own task. A forced refresh aborts the stale cycle,
//! which drops its `JoinSet` and with it every in-flight fetch. A generation
//! counter guards publication so an outdated cycle can never replace a newer
//! snapshot. Fetched reports reach the cache only when their cycle publishes,
//! under the same check, so a fetch that outlives its cycle is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, ReportCache};
use crate::classify::{LookAhead, Policy};
use crate::diversion::{DiversionRecommendation, PreferredAlternates, recommend};
use crate::domain::{Fleet, IcaoCode, RiskTier, Station};
use crate::source::{SourceError, StationReport, WeatherSource};

use super::registry::{RegistryError, StationRegistry, resolve_adhoc};
use super::snapshot::{NetworkSnapshot, assess_station};

/// Default number of concurrent station fetches.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default deadline for one station fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times a caller follows a superseded cycle before giving up.
const MAX_CYCLE_ATTEMPTS: usize = 3;

/// Polling configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_concurrent: usize,
    pub fetch_timeout: Duration,
    pub look_ahead: LookAhead,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            look_ahead: LookAhead::Full,
        }
    }
}

impl PollConfig {
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_look_ahead(mut self, look_ahead: LookAhead) -> Self {
        self.look_ahead = look_ahead;
        self
    }
}

/// A refresh cycle that did not produce a snapshot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CycleError {
    /// A newer cycle or a registry change replaced this one.
    #[error("refresh cycle superseded")]
    Superseded,

    #[error("refresh cycle failed: {0}")]
    Failed(String),
}

/// Errors from aggregator operations.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Diversion advice for one station, taken from a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiversionAdvice {
    pub station: IcaoCode,
    /// The station's tier in the snapshot the advice was computed from.
    pub tier: RiskTier,
    /// Generation of that snapshot.
    pub generation: u64,
    pub recommendation: DiversionRecommendation,
}

type CycleResult = Result<Arc<NetworkSnapshot>, CycleError>;
type SharedCycle = Shared<BoxFuture<'static, CycleResult>>;

struct RunningCycle {
    abort: AbortHandle,
    result: SharedCycle,
}

struct Inner<S> {
    source: S,
    cache: ReportCache,
    registry: RwLock<StationRegistry>,
    alternates: PreferredAlternates,
    policy: Policy,
    poll: PollConfig,
    published: RwLock<Option<Arc<NetworkSnapshot>>>,
    cycle: Mutex<Option<RunningCycle>>,
    generation: AtomicU64,
}

/// Owner of the registry, policy, report cache and published snapshot.
pub struct NetworkAggregator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for NetworkAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: WeatherSource> NetworkAggregator<S> {
    pub fn new(
        source: S,
        registry: StationRegistry,
        alternates: PreferredAlternates,
        policy: Policy,
        cache: &CacheConfig,
        poll: PollConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache: ReportCache::new(cache),
                registry: RwLock::new(registry),
                alternates,
                policy,
                poll,
                published: RwLock::new(None),
                cycle: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The current snapshot.
    ///
    /// Returns the published snapshot while it is younger than the TTL,
    /// otherwise joins the in-flight cycle or starts a new one.
    pub async fn snapshot(&self) -> CycleResult {
        let mut last_error = CycleError::Superseded;

        for _ in 0..MAX_CYCLE_ATTEMPTS {
            if let Some(snapshot) = self.fresh_snapshot(self.inner.cache.ttl()).await {
                return Ok(snapshot);
            }

            let cycle = {
                let mut slot = self.inner.cycle.lock().await;
                let in_flight = match &*slot {
                    Some(running) if running.result.peek().is_none() => Some(running.result.clone()),
                    _ => None,
                };
                match in_flight {
                    Some(cycle) => cycle,
                    None => self.start_cycle(&mut slot),
                }
            };

            match cycle.await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    debug!(error = %e, "cycle did not publish, retrying");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Cancel any in-flight cycle, drop cached reports and poll again.
    pub async fn force_refresh(&self) -> CycleResult {
        let cycle = {
            let mut slot = self.inner.cycle.lock().await;
            if let Some(stale) = slot.take() {
                stale.abort.abort();
            }
            // a cycle past its publication check has cached its reports by
            // now; any later one sees the retired generation
            self.retire_generation().await;
            self.inner.cache.invalidate_all();
            self.start_cycle(&mut slot)
        };

        match cycle.await {
            // a later forced refresh replaced ours; follow it
            Err(CycleError::Superseded) => self.snapshot().await,
            other => other,
        }
    }

    /// Force a refresh when the published snapshot is older than `max_age`.
    ///
    /// Used by the warm-up task so the snapshot is renewed from freshly
    /// fetched reports before request callers would find it stale.
    pub async fn refresh_stale(&self, max_age: Duration) -> CycleResult {
        match self.fresh_snapshot(max_age).await {
            Some(snapshot) => Ok(snapshot),
            None => self.force_refresh().await,
        }
    }

    /// The last published snapshot, however old.
    pub async fn published(&self) -> Option<Arc<NetworkSnapshot>> {
        self.inner.published.read().await.clone()
    }

    /// Recommend an alternate for a station using the current snapshot.
    pub async fn recommend_diversion(
        &self,
        code: &IcaoCode,
    ) -> Result<DiversionAdvice, NetworkError> {
        let snapshot = self.snapshot().await?;
        let distressed = snapshot.status(code).ok_or(RegistryError::Unknown(*code))?;

        let recommendation = recommend(
            &distressed.station,
            &snapshot.green_set(),
            snapshot.stations.iter().map(|s| &s.station),
            self.inner.alternates.get(code),
        );

        Ok(DiversionAdvice {
            station: *code,
            tier: distressed.classification.tier,
            generation: snapshot.generation,
            recommendation,
        })
    }

    /// Plain-text handover log for the current snapshot.
    pub async fn handover_log(&self) -> Result<String, CycleError> {
        Ok(self.snapshot().await?.handover_log())
    }

    /// Stations in registry order.
    pub async fn stations(&self) -> Vec<Station> {
        self.inner.registry.read().await.stations().cloned().collect()
    }

    /// Add a station at runtime, resolving it through the source's lookup.
    pub async fn add_station(&self, code: IcaoCode, fleet: Fleet) -> Result<Station, NetworkError> {
        if self.inner.registry.read().await.contains(&code) {
            return Err(RegistryError::Duplicate(code).into());
        }

        let station = resolve_adhoc(&self.inner.source, code, fleet).await?;
        self.inner
            .registry
            .write()
            .await
            .insert_adhoc(station.clone())?;
        self.invalidate_published().await;

        info!(station = %code, fleet = %station.fleet, "added ad-hoc station");
        Ok(station)
    }

    /// Remove a configured or ad-hoc station.
    pub async fn remove_station(&self, code: &IcaoCode) -> Result<Station, NetworkError> {
        let removed = self.inner.registry.write().await.remove(code)?;
        self.invalidate_published().await;
        self.inner.cache.invalidate(code).await;

        info!(station = %code, "removed station");
        Ok(removed)
    }

    async fn fresh_snapshot(&self, max_age: Duration) -> Option<Arc<NetworkSnapshot>> {
        self.published().await.filter(|s| s.age() < max_age)
    }

    /// Stop every cycle started so far from publishing or caching.
    async fn retire_generation(&self) {
        let _published = self.inner.published.write().await;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Withdraw the published snapshot after a registry change.
    ///
    /// Bumping the generation under the publication lock stops any cycle
    /// that started before the change from publishing.
    async fn invalidate_published(&self) {
        let mut published = self.inner.published.write().await;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        *published = None;
    }

    fn start_cycle(&self, slot: &mut Option<RunningCycle>) -> SharedCycle {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = tokio::spawn(run_cycle(Arc::clone(&self.inner), generation));
        let abort = handle.abort_handle();

        let result = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(CycleError::Superseded),
                Err(e) => Err(CycleError::Failed(e.to_string())),
            }
        }
        .boxed()
        .shared();

        *slot = Some(RunningCycle {
            abort,
            result: result.clone(),
        });
        result
    }
}

async fn run_cycle<S: WeatherSource>(inner: Arc<Inner<S>>, generation: u64) -> CycleResult {
    let stations: Vec<Station> = inner.registry.read().await.stations().cloned().collect();
    debug!(generation, stations = stations.len(), "starting refresh cycle");

    let semaphore = Arc::new(Semaphore::new(inner.poll.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, station) in stations.iter().enumerate() {
        let inner = Arc::clone(&inner);
        let semaphore = Arc::clone(&semaphore);
        let code = station.code;
        tasks.spawn(async move { (idx, fetch_report(&inner, code, &semaphore).await) });
    }

    let mut outcomes: Vec<Option<Result<Fetched, String>>> = vec![None; stations.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, outcome)) => outcomes[idx] = Some(outcome),
            Err(e) => warn!(error = %e, "station task failed"),
        }
    }

    let now = Utc::now();
    let mut to_cache = Vec::new();
    let mut statuses = Vec::with_capacity(stations.len());
    for (station, outcome) in stations.into_iter().zip(outcomes) {
        let outcome = match outcome {
            Some(Ok(fetched)) => {
                if !fetched.cached {
                    to_cache.push((station.code, Arc::clone(&fetched.report)));
                }
                Ok(fetched.report)
            }
            Some(Err(detail)) => Err(detail),
            None => Err("fetch task failed".to_string()),
        };
        statuses.push(assess_station(
            station,
            outcome,
            &inner.policy,
            inner.poll.look_ahead,
            now,
        ));
    }

    let snapshot = Arc::new(NetworkSnapshot::assemble(generation, now, statuses));

    let mut published = inner.published.write().await;
    if inner.generation.load(Ordering::SeqCst) != generation {
        debug!(generation, "discarding superseded cycle");
        return Err(CycleError::Superseded);
    }
    let fetched = to_cache.len();
    for (code, report) in to_cache {
        inner.cache.insert(code, report).await;
    }
    *published = Some(Arc::clone(&snapshot));

    info!(
        generation,
        stations = snapshot.stations.len(),
        fetched,
        alerts = snapshot.alerts.len(),
        green = snapshot.green.len(),
        "published snapshot"
    );
    Ok(snapshot)
}

#[derive(Clone)]
struct Fetched {
    report: Arc<StationReport>,
    cached: bool,
}

/// Fetch one station's report, from cache when fresh.
///
/// Failures are returned as the detail shown on the unavailable status.
/// Nothing is cached here; the cycle caches its new reports when it
/// publishes.
async fn fetch_report<S: WeatherSource>(
    inner: &Inner<S>,
    code: IcaoCode,
    semaphore: &Semaphore,
) -> Result<Fetched, String> {
    if let Some(report) = inner.cache.get(&code).await {
        return Ok(Fetched {
            report,
            cached: true,
        });
    }

    let _permit = semaphore
        .acquire()
        .await
        .map_err(|_| "fetch pool closed".to_string())?;

    let timeout = inner.poll.fetch_timeout;
    let fetched = match tokio::time::timeout(timeout, inner.source.fetch_report(&code)).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout)),
    };

    match fetched {
        Ok(report) => Ok(Fetched {
            report: Arc::new(report),
            cached: false,
        }),
        Err(e) => {
            warn!(station = %code, error = %e, "fetch failed");
            Err(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
