//! Domain types for the weather watch.
//!
//! This module contains the station reference data, the decoded weather
//! facts consumed from the decoder collaborator, and the classification
//! records produced by the engine. Codes enforce their invariants at
//! construction time.

mod risk;
mod station;
mod weather;

pub use risk::{ForecastRisk, Reason, RiskClassification, RiskTier};
pub use station::{Fleet, IcaoCode, InvalidIcao, Position, Station};
pub use weather::{
    Conditions, FetchStatus, ForecastLine, HazardCode, MissingField, Observation,
    UNRESTRICTED_CEILING_FT, UNRESTRICTED_VISIBILITY_M, ValidityWindow, Wind,
};
