//! Service configuration.
//!
//! Loaded from a TOML file; every section is optional and falls back to the
//! built-in Cityflyer/Euroflyer network and default policy.
//!
//! ```toml
//! [poll]
//! ttl_secs = 900
//! max_concurrent = 8
//! fetch_timeout_secs = 10
//!
//! [policy]
//! critical_crosswind_kt = 25
//! marginal_crosswind_kt = 18
//!
//! [policy.disqualifying_hazards]
//! cityflyer = ["freezing_rain", "freezing_drizzle"]
//!
//! [[stations]]
//! code = "EGLC"
//! alt_code = "LCY"
//! name = "London City"
//! lat = 51.505
//! lon = 0.055
//! runway_heading = 270
//! fleet = "cityflyer"
//! special_category = true
//!
//! [alternates]
//! EGLC = ["EGSS", "EGKK"]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::CacheConfig;
use crate::classify::{
    DEFAULT_CRITICAL_CROSSWIND_KT, HazardRules, LookAhead, Policy, default_hazard_rules,
};
use crate::diversion::{PreferredAlternates, default_alternates};
use crate::domain::{Fleet, HazardCode, IcaoCode, Station};
use crate::network::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT, PollConfig, default_stations};

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    poll: PollSection,
    policy: PolicySection,
    stations: Vec<Station>,
    alternates: Option<BTreeMap<IcaoCode, Vec<IcaoCode>>>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PollSection {
    ttl_secs: u64,
    max_concurrent: usize,
    fetch_timeout_secs: u64,
    max_cached_reports: u64,
    /// Forecast horizon; the whole timeline when unset.
    look_ahead_hours: Option<u32>,
}

impl Default for PollSection {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            ttl_secs: cache.ttl.as_secs(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            max_cached_reports: cache.max_capacity,
            look_ahead_hours: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PolicySection {
    critical_crosswind_kt: u32,
    marginal_crosswind_kt: Option<u32>,
    forecast_degrades_current: bool,
    incomplete_data_is_amber: bool,
    disqualifying_hazards: Option<BTreeMap<Fleet, Vec<HazardCode>>>,
    crosswind_reference_kt: Option<BTreeMap<Fleet, u32>>,
}

impl Default for PolicySection {
    fn default() -> Self {
        let policy = Policy::default();
        Self {
            critical_crosswind_kt: DEFAULT_CRITICAL_CROSSWIND_KT,
            marginal_crosswind_kt: None,
            forecast_degrades_current: policy.forecast_degrades_current,
            incomplete_data_is_amber: policy.incomplete_data_is_amber,
            disqualifying_hazards: None,
            crosswind_reference_kt: None,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub poll: PollConfig,
    pub policy: Policy,
    pub stations: Vec<Station>,
    pub alternates: PreferredAlternates,
}

impl Default for AppConfig {
    /// The built-in network with default policy.
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            poll: PollConfig::default(),
            policy: Policy::default(),
            stations: default_stations(),
            alternates: default_alternates(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            stations = config.stations.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::resolve(file)
    }

    fn resolve(file: ConfigFile) -> Result<Self, ConfigError> {
        let ConfigFile {
            poll,
            policy,
            stations,
            alternates,
        } = file;

        if poll.ttl_secs == 0 {
            return Err(ConfigError::Invalid("poll.ttl_secs must be positive".into()));
        }
        if poll.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "poll.max_concurrent must be positive".into(),
            ));
        }
        if poll.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll.fetch_timeout_secs must be positive".into(),
            ));
        }
        if policy.critical_crosswind_kt == 0 {
            return Err(ConfigError::Invalid(
                "policy.critical_crosswind_kt must be positive".into(),
            ));
        }
        if let Some(marginal) = policy.marginal_crosswind_kt {
            if marginal >= policy.critical_crosswind_kt {
                return Err(ConfigError::Invalid(format!(
                    "policy.marginal_crosswind_kt ({marginal}) must be below critical ({})",
                    policy.critical_crosswind_kt
                )));
            }
        }

        let cache = CacheConfig::default()
            .with_ttl(Duration::from_secs(poll.ttl_secs))
            .with_max_capacity(poll.max_cached_reports);

        let mut poll_config = PollConfig::default()
            .with_max_concurrent(poll.max_concurrent)
            .with_fetch_timeout(Duration::from_secs(poll.fetch_timeout_secs));
        if let Some(hours) = poll.look_ahead_hours {
            poll_config =
                poll_config.with_look_ahead(LookAhead::Within(chrono::Duration::hours(hours.into())));
        }

        let hazard_rules = match policy.disqualifying_hazards {
            Some(table) => table
                .into_iter()
                .fold(HazardRules::new(), |rules, (fleet, hazards)| {
                    rules.with_rule(fleet, &hazards)
                }),
            None => default_hazard_rules(),
        };

        let mut resolved_policy = Policy::default()
            .with_critical_crosswind(policy.critical_crosswind_kt)
            .with_hazard_rules(hazard_rules)
            .with_forecast_degrades_current(policy.forecast_degrades_current)
            .with_incomplete_data_is_amber(policy.incomplete_data_is_amber);
        if let Some(marginal) = policy.marginal_crosswind_kt {
            resolved_policy = resolved_policy.with_marginal_crosswind(marginal);
        }
        if let Some(reference) = policy.crosswind_reference_kt {
            resolved_policy.crosswind_reference_kt = reference;
        }

        let builtin = stations.is_empty();
        let stations = if builtin { default_stations() } else { stations };

        let alternates = match alternates {
            Some(table) => {
                let mut resolved = PreferredAlternates::new();
                for (station, list) in table {
                    resolved.set(station, list);
                }
                resolved
            }
            None if builtin => default_alternates(),
            None => PreferredAlternates::new(),
        };

        let config = Self {
            cache,
            poll: poll_config,
            policy: resolved_policy,
            stations,
            alternates,
        };
        config.warn_inconsistencies();
        Ok(config)
    }

    /// Log configuration problems that do not prevent classification.
    fn warn_inconsistencies(&self) {
        let known: HashSet<IcaoCode> = self.stations.iter().map(|s| s.code).collect();

        for station in &self.stations {
            if !station.fleet.is_unassigned() && !self.policy.hazard_rules.knows_fleet(&station.fleet)
            {
                warn!(
                    station = %station.code,
                    fleet = %station.fleet,
                    "fleet has no hazard rules, all hazards are cautionary"
                );
            }
        }

        for (station, alternates) in self.alternates.iter() {
            if !known.contains(station) {
                warn!(station = %station, "preferred alternates for a station not in the network");
            }
            for alternate in alternates.iter().filter(|a| !known.contains(*a)) {
                warn!(
                    station = %station,
                    alternate = %alternate,
                    "preferred alternate not in the network, it will never be green"
                );
            }
        }
    }
}
