//! Immutable per-cycle network snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::{LookAhead, Minima, Policy, classify_observation, scan_forecast};
use crate::domain::{
    Fleet, ForecastRisk, IcaoCode, RiskClassification, RiskTier, Station,
};
use crate::source::StationReport;

/// Everything known about one station in one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct StationStatus {
    pub station: Station,
    pub classification: RiskClassification,
    pub forecast: ForecastRisk,
    /// The fleet's aircraft crosswind limit, for operator reference only.
    pub crosswind_reference_kt: Option<u32>,
    pub raw_metar: Option<String>,
    pub raw_taf: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Classify one station's fetch outcome.
///
/// `Err` carries the reason the fetch failed and yields an unavailable
/// status. The forecast is scanned even when the observation is unavailable,
/// since a TAF may still have been published.
pub fn assess_station(
    station: Station,
    outcome: Result<Arc<StationReport>, String>,
    policy: &Policy,
    look_ahead: LookAhead,
    now: DateTime<Utc>,
) -> StationStatus {
    let crosswind_reference_kt = policy.crosswind_reference_kt.get(&station.fleet).copied();
    let report = match outcome {
        Ok(report) => report,
        Err(detail) => {
            return StationStatus {
                station,
                classification: RiskClassification::unavailable(detail),
                forecast: ForecastRisk::clear(),
                crosswind_reference_kt,
                raw_metar: None,
                raw_taf: None,
                observed_at: None,
            };
        }
    };

    let minima = Minima::for_station(&station);
    let forecast = scan_forecast(&station, &minima, &report.forecast, look_ahead, now, policy);

    let mut classification = classify_observation(&station, &report.observation, policy);
    if policy.forecast_degrades_current {
        classification = classification.with_forecast_trend(&forecast);
    }

    StationStatus {
        station,
        classification,
        forecast,
        crosswind_reference_kt,
        raw_metar: report.observation.raw.clone(),
        raw_taf: report.raw_taf.clone(),
        observed_at: report.observation.observed_at,
    }
}

/// Number of stations per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub green: usize,
    pub amber: usize,
    pub red: usize,
    pub unavailable: usize,
}

impl TierCounts {
    pub fn record(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Green => self.green += 1,
            RiskTier::Amber => self.amber += 1,
            RiskTier::Red => self.red += 1,
            RiskTier::Unavailable => self.unavailable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.green + self.amber + self.red + self.unavailable
    }
}

/// The result of one refresh cycle.
///
/// Built completely before publication and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSnapshot {
    pub generation: u64,
    pub generated_at: DateTime<Utc>,
    /// Per-station status in registry order.
    pub stations: Vec<StationStatus>,
    pub fleet_counts: BTreeMap<Fleet, TierCounts>,
    /// Stations currently red or amber.
    pub alerts: BTreeMap<IcaoCode, RiskClassification>,
    /// Stations whose forecast shows risk.
    pub forecast_alerts: BTreeMap<IcaoCode, ForecastRisk>,
    /// Green stations in registry order.
    pub green: Vec<IcaoCode>,
    #[serde(skip)]
    built_at: Instant,
}

impl NetworkSnapshot {
    pub fn assemble(
        generation: u64,
        generated_at: DateTime<Utc>,
        stations: Vec<StationStatus>,
    ) -> Self {
        let mut fleet_counts: BTreeMap<Fleet, TierCounts> = BTreeMap::new();
        let mut alerts = BTreeMap::new();
        let mut forecast_alerts = BTreeMap::new();
        let mut green = Vec::new();

        for status in &stations {
            let code = status.station.code;
            let tier = status.classification.tier;

            fleet_counts
                .entry(status.station.fleet.clone())
                .or_default()
                .record(tier);

            if status.classification.is_alert() {
                alerts.insert(code, status.classification.clone());
            }
            if !status.forecast.is_clear() {
                forecast_alerts.insert(code, status.forecast.clone());
            }
            if tier == RiskTier::Green {
                green.push(code);
            }
        }

        Self {
            generation,
            generated_at,
            stations,
            fleet_counts,
            alerts,
            forecast_alerts,
            green,
            built_at: Instant::now(),
        }
    }

    pub fn status(&self, code: &IcaoCode) -> Option<&StationStatus> {
        self.stations.iter().find(|s| &s.station.code == code)
    }

    /// Time since this snapshot was assembled.
    pub fn age(&self) -> Duration {
        self.built_at.elapsed()
    }

    pub fn green_set(&self) -> BTreeSet<IcaoCode> {
        self.green.iter().copied().collect()
    }

    /// A view restricted to one fleet's stations.
    pub fn for_fleet(&self, fleet: &Fleet) -> Self {
        let stations = self
            .stations
            .iter()
            .filter(|s| &s.station.fleet == fleet)
            .cloned()
            .collect();
        Self {
            built_at: self.built_at,
            ..Self::assemble(self.generation, self.generated_at, stations)
        }
    }

    /// Plain-text handover log.
    ///
    /// One line per station carrying a forecast risk, in registry order:
    /// `CODE: reason (window)`.
    pub fn handover_log(&self) -> String {
        let mut log = String::new();
        for status in self.stations.iter().filter(|s| !s.forecast.is_clear()) {
            log.push_str(status.station.code.as_str());
            log.push_str(": ");
            log.push_str(&status.forecast.summary());
            if let Some(window) = status.forecast.window {
                log.push_str(&format!(" ({window})"));
            }
            log.push('\n');
        }
        log
    }
}
