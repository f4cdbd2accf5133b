//! AVWX decoder adapters.
//!
//! AVWX (<https://avwx.rest>) decodes METAR and TAF reports into JSON. This
//! module provides the live HTTP client, the DTOs for its responses, their
//! conversion to domain types, and a fixture-backed mock.

mod client;
mod convert;
mod mock;
mod types;

pub use client::{AvwxClient, AvwxConfig, REQUESTS_PER_STATION};
pub use convert::{
    ConversionError, convert_forecast, convert_observation, convert_station, hazards_from_codes,
};
pub use mock::MockWeatherSource;
pub use types::{
    Cloud, MetarResponse, Number, Runway, StationResponse, TafLine, TafResponse, Timestamp, Units,
    WxCode,
};
