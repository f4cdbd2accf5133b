//! AVWX REST API client.
//!
//! Fetches decoded METAR, TAF and station data and converts them to domain
//! types. Authentication is a bearer token; a semaphore bounds the number of
//! requests in flight against the API's rate limits.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::IcaoCode;
use crate::source::{SourceError, StationInfo, StationReport, WeatherSource};

use super::convert::{convert_forecast, convert_observation, convert_station};
use super::types::{MetarResponse, StationResponse, TafResponse};

/// Default base URL for the AVWX API.
const DEFAULT_BASE_URL: &str = "https://avwx.rest/api";

/// Requests made for one station report (METAR and TAF).
pub const REQUESTS_PER_STATION: usize = 2;

/// Default maximum concurrent requests: enough for the aggregator's default
/// number of concurrent station fetches.
const DEFAULT_MAX_CONCURRENT: usize =
    crate::network::DEFAULT_MAX_CONCURRENT * REQUESTS_PER_STATION;

/// Configuration for the AVWX client.
#[derive(Debug, Clone)]
pub struct AvwxConfig {
    /// API token
    pub token: String,
    /// Base URL for the API (defaults to production AVWX)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AvwxConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing or a self-hosted instance).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Allow every request of `stations` concurrent station fetches, so a
    /// fetch never waits on another station's requests.
    pub fn with_station_concurrency(self, stations: usize) -> Self {
        self.with_max_concurrent(stations * REQUESTS_PER_STATION)
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// AVWX API client.
#[derive(Debug, Clone)]
pub struct AvwxClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl AvwxClient {
    pub fn new(config: AvwxConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();

        let token = HeaderValue::from_str(&format!("BEARER {}", config.token)).map_err(|_| {
            SourceError::Api {
                status: 0,
                message: "Invalid token format".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Get the decoded METAR for a station.
    pub async fn get_metar(&self, code: &IcaoCode) -> Result<MetarResponse, SourceError> {
        self.get_json("metar", code).await
    }

    /// Get the decoded TAF for a station.
    pub async fn get_taf(&self, code: &IcaoCode) -> Result<TafResponse, SourceError> {
        self.get_json("taf", code).await
    }

    /// Get station reference data.
    pub async fn get_station(&self, code: &IcaoCode) -> Result<StationResponse, SourceError> {
        self.get_json("station", code).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        code: &IcaoCode,
    ) -> Result<T, SourceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SourceError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}/{}", self.base_url, endpoint, code.as_str());
        debug!(%url, "requesting");

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("onfail", "error")])
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        // AVWX answers 204 when a station has no current report
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Err(SourceError::NotFound(*code));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        if body.is_empty() || body == "null" {
            return Err(SourceError::NotFound(*code));
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl WeatherSource for AvwxClient {
    /// The METAR is required; a missing TAF yields an empty timeline.
    async fn fetch_report(&self, code: &IcaoCode) -> Result<StationReport, SourceError> {
        let (metar, taf) = futures::join!(self.get_metar(code), self.get_taf(code));

        let observation = convert_observation(&metar?);

        let report = match taf {
            Ok(taf) => StationReport::new(observation)
                .with_forecast(convert_forecast(&taf), taf.raw.clone()),
            Err(SourceError::NotFound(_)) => StationReport::new(observation),
            Err(e) => {
                debug!(station = %code, error = %e, "TAF unavailable");
                StationReport::new(observation)
            }
        };

        Ok(report)
    }

    async fn lookup_station(&self, code: &IcaoCode) -> Result<StationInfo, SourceError> {
        let station = self.get_station(code).await?;
        Ok(convert_station(&station, *code)?)
    }
}
