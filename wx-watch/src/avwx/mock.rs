//! Mock weather source for testing without API access.
//!
//! Loads decoded AVWX responses from JSON fixtures and serves them as if
//! they were live. Failures and slow responses can be injected per station.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::IcaoCode;
use crate::source::{SourceError, StationInfo, StationReport, WeatherSource};

use super::convert::{convert_forecast, convert_observation, convert_station};
use super::types::{MetarResponse, StationResponse, TafResponse};

/// On-disk fixture: `{ICAO}.json` holding any of the three decoded responses.
#[derive(Debug, Deserialize)]
struct Fixture {
    metar: Option<MetarResponse>,
    taf: Option<TafResponse>,
    station: Option<StationResponse>,
}

#[derive(Default)]
struct MockData {
    reports: HashMap<IcaoCode, StationReport>,
    stations: HashMap<IcaoCode, StationInfo>,
    failing: HashSet<IcaoCode>,
    delays: HashMap<IcaoCode, Duration>,
}

/// Weather source that serves canned data.
#[derive(Clone, Default)]
pub struct MockWeatherSource {
    data: Arc<RwLock<MockData>>,
    fetches: Arc<AtomicUsize>,
}

impl MockWeatherSource {
    /// An empty source: every station is not found.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixtures from a directory.
    ///
    /// Expects files named `{ICAO}.json` (e.g. `EGLC.json`).
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let data_dir = data_dir.as_ref();
        let mut data = MockData::default();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            SourceError::Fixture(format!("failed to read {}: {e}", data_dir.display()))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| SourceError::Fixture(format!("failed to read directory entry: {e}")))?
                .path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| SourceError::Fixture(format!("invalid filename: {}", path.display())))?;
            let code = IcaoCode::parse(stem)
                .map_err(|e| SourceError::Fixture(format!("{}: {e}", path.display())))?;

            let json = std::fs::read_to_string(&path)
                .map_err(|e| SourceError::Fixture(format!("failed to read {}: {e}", path.display())))?;
            let fixture: Fixture = serde_json::from_str(&json).map_err(|e| SourceError::Json {
                message: format!("{}: {e}", path.display()),
                body: None,
            })?;

            if let Some(metar) = &fixture.metar {
                let mut report = StationReport::new(convert_observation(metar));
                if let Some(taf) = &fixture.taf {
                    report = report.with_forecast(convert_forecast(taf), taf.raw.clone());
                }
                data.reports.insert(code, report);
            }
            if let Some(station) = &fixture.station {
                data.stations.insert(code, convert_station(station, code)?);
            }
        }

        if data.reports.is_empty() && data.stations.is_empty() {
            return Err(SourceError::Fixture(format!(
                "no fixture files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            fetches: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub async fn insert_report(&self, code: IcaoCode, report: StationReport) {
        self.data.write().await.reports.insert(code, report);
    }

    pub async fn insert_station(&self, info: StationInfo) {
        self.data.write().await.stations.insert(info.code, info);
    }

    /// Make every fetch for `code` fail until [`MockWeatherSource::recover`].
    pub async fn fail(&self, code: IcaoCode) {
        self.data.write().await.failing.insert(code);
    }

    pub async fn recover(&self, code: IcaoCode) {
        self.data.write().await.failing.remove(&code);
    }

    /// Delay every fetch for `code`.
    pub async fn delay(&self, code: IcaoCode, delay: Duration) {
        self.data.write().await.delays.insert(code, delay);
    }

    /// Number of report fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Stations with a report loaded.
    pub async fn available_stations(&self) -> Vec<IcaoCode> {
        let mut codes: Vec<IcaoCode> = self.data.read().await.reports.keys().copied().collect();
        codes.sort();
        codes
    }
}

impl WeatherSource for MockWeatherSource {
    async fn fetch_report(&self, code: &IcaoCode) -> Result<StationReport, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let delay = self.data.read().await.delays.get(code).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let data = self.data.read().await;
        if data.failing.contains(code) {
            return Err(SourceError::Api {
                status: 503,
                message: format!("injected failure for {code}"),
            });
        }
        data.reports
            .get(code)
            .cloned()
            .ok_or(SourceError::NotFound(*code))
    }

    async fn lookup_station(&self, code: &IcaoCode) -> Result<StationInfo, SourceError> {
        self.data
            .read()
            .await
            .stations
            .get(code)
            .cloned()
            .ok_or(SourceError::NotFound(*code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conditions, Observation};

    const FIXTURES: &str = "data/mock_reports";

    fn icao(s: &str) -> IcaoCode {
        IcaoCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn load_fixtures() {
        let source = MockWeatherSource::from_dir(FIXTURES).unwrap();
        let stations = source.available_stations().await;
        assert!(stations.contains(&icao("EGLC")));
        assert!(stations.contains(&icao("EGKK")));
    }

    #[tokio::test]
    async fn fixture_report_is_converted() {
        let source = MockWeatherSource::from_dir(FIXTURES).unwrap();
        let report = source.fetch_report(&icao("EGLC")).await.unwrap();

        assert!(report.observation.is_available());
        assert!(report.observation.raw.is_some());
        assert!(!report.forecast.is_empty());
        assert!(report.raw_taf.is_some());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn fixture_station_lookup() {
        let source = MockWeatherSource::from_dir(FIXTURES).unwrap();
        let info = source.lookup_station(&icao("EHAM")).await.unwrap();
        assert_eq!(info.iata.as_deref(), Some("AMS"));
        assert!(info.runway_heading.is_some());
    }

    #[tokio::test]
    async fn unknown_station_is_not_found() {
        let source = MockWeatherSource::new();
        let err = source.fetch_report(&icao("ZZZZ")).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(code) if code == icao("ZZZZ")));
    }

    #[tokio::test]
    async fn injected_failure_and_recovery() {
        let source = MockWeatherSource::new();
        let code = icao("EGSS");
        source
            .insert_report(code, StationReport::new(Observation::new(Conditions::unrestricted())))
            .await;

        source.fail(code).await;
        assert!(source.fetch_report(&code).await.is_err());

        source.recover(code).await;
        assert!(source.fetch_report(&code).await.is_ok());
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            MockWeatherSource::from_dir(&missing),
            Err(SourceError::Fixture(_))
        ));
        assert!(matches!(
            MockWeatherSource::from_dir(dir.path()),
            Err(SourceError::Fixture(_))
        ));
    }

    #[tokio::test]
    async fn fixture_from_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("LFMN.json"),
            r#"{"metar": {"raw": "LFMN 160600Z 05005KT 0500 FG",
                          "visibility": {"value": 500},
                          "wind_direction": {"value": 50}, "wind_speed": {"value": 5},
                          "wx_codes": [{"repr": "FG"}]}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let source = MockWeatherSource::from_dir(dir.path()).unwrap();
        let report = source.fetch_report(&icao("LFMN")).await.unwrap();
        assert_eq!(report.observation.conditions.visibility_m, 500);
        assert!(report.forecast.is_empty());
    }
}
