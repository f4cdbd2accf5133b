//! The decoder collaborator seam.
//!
//! The engine never decodes METAR/TAF text itself. A [`WeatherSource`]
//! returns already-decoded observations, forecast timelines and station
//! reference data. Production uses the AVWX REST API; tests and offline
//! development use JSON fixtures.

use std::future::Future;
use std::time::Duration;

use crate::avwx::{AvwxClient, ConversionError, MockWeatherSource};
use crate::domain::{Fleet, ForecastLine, IcaoCode, Observation, Position, Station};

/// Errors from a weather source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (network error, connect timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be deserialized
    #[error("JSON parse error: {message}{}", body.as_deref().map(|b| format!(" (body: {b})")).unwrap_or_default())]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Source returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// No report or station data for this code
    #[error("no data for station {0}")]
    NotFound(IcaoCode),

    #[error("rate limited by weather source")]
    RateLimited,

    #[error("unauthorized (invalid or missing token)")]
    Unauthorized,

    /// Decoded data could not be mapped to domain values
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// The fetch did not complete within its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Fixture data could not be loaded
    #[error("fixture error: {0}")]
    Fixture(String),
}

/// Everything fetched for one station in one cycle.
#[derive(Debug, Clone)]
pub struct StationReport {
    pub observation: Observation,
    /// Forecast timeline in issue order. Empty when no TAF is published.
    pub forecast: Vec<ForecastLine>,
    pub raw_taf: Option<String>,
}

impl StationReport {
    pub fn new(observation: Observation) -> Self {
        Self {
            observation,
            forecast: Vec::new(),
            raw_taf: None,
        }
    }

    pub fn with_forecast(mut self, forecast: Vec<ForecastLine>, raw_taf: Option<String>) -> Self {
        self.forecast = forecast;
        self.raw_taf = raw_taf;
        self
    }
}

/// Station reference data from the decoder's lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub code: IcaoCode,
    pub iata: Option<String>,
    pub name: String,
    pub position: Position,
    pub runway_heading: Option<u16>,
}

impl StationInfo {
    /// Build an ad-hoc station. Ad-hoc stations use standard minima.
    pub fn into_station(self, fleet: Fleet) -> Station {
        let mut station = Station::new(self.code, self.position)
            .with_name(self.name)
            .with_fleet(fleet);
        if let Some(iata) = self.iata {
            station = station.with_alt_code(iata);
        }
        if let Some(heading) = self.runway_heading {
            station = station.with_runway_heading(heading);
        }
        station
    }
}

/// A provider of decoded weather for stations.
///
/// Futures must be `Send` so fetches can run on spawned tasks.
pub trait WeatherSource: Send + Sync + 'static {
    /// Fetch the current observation and forecast timeline for a station.
    fn fetch_report(
        &self,
        code: &IcaoCode,
    ) -> impl Future<Output = Result<StationReport, SourceError>> + Send;

    /// Look up coordinates, names and runway bearing for a station.
    fn lookup_station(
        &self,
        code: &IcaoCode,
    ) -> impl Future<Output = Result<StationInfo, SourceError>> + Send;
}

/// The source selected at startup.
#[derive(Clone)]
pub enum AnySource {
    Avwx(AvwxClient),
    Mock(MockWeatherSource),
}

impl WeatherSource for AnySource {
    async fn fetch_report(&self, code: &IcaoCode) -> Result<StationReport, SourceError> {
        match self {
            AnySource::Avwx(client) => client.fetch_report(code).await,
            AnySource::Mock(mock) => mock.fetch_report(code).await,
        }
    }

    async fn lookup_station(&self, code: &IcaoCode) -> Result<StationInfo, SourceError> {
        match self {
            AnySource::Avwx(client) => client.lookup_station(code).await,
            AnySource::Mock(mock) => mock.lookup_station(code).await,
        }
    }
}
