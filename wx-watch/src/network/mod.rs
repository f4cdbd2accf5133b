//! Network aggregation.
//!
//! Polls every station of the registry concurrently, classifies current and
//! forecast weather per station and publishes an immutable snapshot with
//! per-fleet counts, the alert registries and the green list.

mod aggregator;
mod registry;
mod snapshot;

pub use aggregator::{
    CycleError, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT, DiversionAdvice, NetworkAggregator,
    NetworkError, PollConfig,
};
pub use registry::{RegistryError, StationRegistry, default_stations, resolve_adhoc};
pub use snapshot::{NetworkSnapshot, StationStatus, TierCounts, assess_station};
